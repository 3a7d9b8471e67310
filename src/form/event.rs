//! Form Events - Payloads broadcast over the event channel.

use serde::{Deserialize, Serialize};

use super::types::{FieldState, FormData, FormValidationResult, ValidationResult};

/// One payload type per channel topic family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum FormEvent<V> {
    /// `form:data:changed`
    DataChanged(FormData<V>),
    /// `<field>:changed`
    FieldChanged(FieldState<V>),
    /// `<field>:validation`
    FieldValidation(ValidationResult),
    /// `form:validation`
    FormValidation(FormValidationResult<V>),
}
