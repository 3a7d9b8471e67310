//! Error types for form operations.
//!
//! Only malformed calls are errors. Invalid user input is reported through
//! [`ValidationResult`](crate::ValidationResult) values and events instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormError {
    /// A field operation named a field absent from the configuration.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// Two field configurations share the same name.
    #[error("duplicate field: {0}")]
    DuplicateField(String),

    /// The operation is not enabled for this form instance.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("invalid options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FormError>;
