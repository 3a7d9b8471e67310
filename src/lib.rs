//! # form-state
//!
//! Form state management for UI layers.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for the
//! reactive validity handle.
//!
//! ## Architecture
//!
//! A [`FormManager`] owns the values, flags and validation results of one
//! logical form. It never keeps subscriber lists itself: every change is
//! published through an injected, per-form [`EventChannel`].
//!
//! ```text
//! caller → FormManager mutation → validation pipeline → EventChannel::emit → subscribers
//! ```
//!
//! Validation is first-failure-wins: a run reports at most one invalid field,
//! the earliest in configuration order. Fields with a validator are required,
//! and stay invalid until a caller writes their value.
//!
//! ## Modules
//!
//! - [`channel`] - Event channel contract, `LocalChannel`, topic names
//! - [`form`] - Field types, validation pipeline, `FormManager`
//! - [`options`] - Per-form configuration
//! - [`error`] - `FormError`

pub mod channel;
pub mod error;
pub mod form;
pub mod options;

pub use channel::{topics, EventChannel, Handler, LocalChannel, Unsubscribe};

pub use error::{FormError, Result};

pub use form::{
    // Configuration
    FieldConfig, Validator, FieldValue,
    // State
    FieldFlags, FieldState, FormData,
    // Validation
    ValidationResult, FormValidationResult,
    // Events
    FormEvent,
    // Manager
    FormChannel, FormManager, JsonFormManager,
};

pub use options::{FormOptions, DEFAULT_REQUIRED_MESSAGE};
