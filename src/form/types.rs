//! Form Types - Configuration, runtime state and validation snapshots.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

// =============================================================================
// Field Values
// =============================================================================

/// Bounds every field value type satisfies.
///
/// `Default` is the value a cleared field takes.
pub trait FieldValue: Clone + PartialEq + fmt::Debug + Default + 'static {}

impl<T> FieldValue for T where T: Clone + PartialEq + fmt::Debug + Default + 'static {}

/// Field name to value. Also used for partial updates.
pub type FormData<V> = BTreeMap<String, V>;

// =============================================================================
// Validation Results
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            message: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: Some(message.into()),
        }
    }
}

/// Outcome of a form-level validation run.
///
/// Carries at most one invalid field: the first failure found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormValidationResult<V> {
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub invalid_fields: Vec<FieldState<V>>,
}

impl<V> FormValidationResult<V> {
    /// State before the first validation run.
    pub fn unvalidated() -> Self {
        Self {
            is_valid: false,
            message: None,
            invalid_fields: Vec::new(),
        }
    }

    pub fn valid() -> Self {
        Self {
            is_valid: true,
            message: None,
            invalid_fields: Vec::new(),
        }
    }

    /// Failure reported for a single field.
    pub fn failed(result: &ValidationResult, field: FieldState<V>) -> Self {
        Self {
            is_valid: false,
            message: result.message.clone(),
            invalid_fields: vec![field],
        }
    }
}

impl<V> Default for FormValidationResult<V> {
    fn default() -> Self {
        Self::unvalidated()
    }
}

// =============================================================================
// Field State
// =============================================================================

/// Snapshot of one field's runtime state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldState<V> {
    pub name: String,
    pub value: V,
    pub hidden: bool,
    pub disabled: bool,
    pub is_touched: bool,
    pub validation: ValidationResult,
}

bitflags::bitflags! {
    /// Runtime flags stored per field.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FieldFlags: u8 {
        const NONE = 0;
        const HIDDEN = 1 << 0;
        const DISABLED = 1 << 1;
        /// Set by the first explicit value write; never cleared.
        const TOUCHED = 1 << 2;
    }
}

// =============================================================================
// Field Configuration
// =============================================================================

/// Validation function. Its presence makes a field required.
pub type Validator<V> = Rc<dyn Fn(&V) -> ValidationResult>;

/// Static configuration for one field.
///
/// ```ignore
/// let email = FieldConfig::new("email", String::new())
///     .validator(|v: &String| {
///         if v.is_empty() { ValidationResult::invalid("empty") } else { ValidationResult::valid() }
///     });
/// ```
#[derive(Clone)]
pub struct FieldConfig<V> {
    pub name: String,
    pub default_value: V,
    pub validate: Option<Validator<V>>,
    pub hidden: bool,
    pub disabled: bool,
}

impl<V> FieldConfig<V> {
    pub fn new(name: impl Into<String>, default_value: V) -> Self {
        Self {
            name: name.into(),
            default_value,
            validate: None,
            hidden: false,
            disabled: false,
        }
    }

    pub fn validator<F>(mut self, validate: F) -> Self
    where
        F: Fn(&V) -> ValidationResult + 'static,
    {
        self.validate = Some(Rc::new(validate));
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn is_required(&self) -> bool {
        self.validate.is_some()
    }

    /// Initial runtime flags.
    pub(crate) fn flags(&self) -> FieldFlags {
        let mut flags = FieldFlags::NONE;
        flags.set(FieldFlags::HIDDEN, self.hidden);
        flags.set(FieldFlags::DISABLED, self.disabled);
        flags
    }
}

impl<V: fmt::Debug> fmt::Debug for FieldConfig<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldConfig")
            .field("name", &self.name)
            .field("default_value", &self.default_value)
            .field("required", &self.is_required())
            .field("hidden", &self.hidden)
            .field("disabled", &self.disabled)
            .finish()
    }
}
