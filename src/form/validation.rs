//! Validation Pipeline - First-failure-wins form validation.
//!
//! Runs over the field table in configuration order:
//!
//! 1. Required fields (those with a validator) are checked first. An
//!    untouched required field fails with the required message without
//!    running its validator. A pending injected error fails next. Otherwise
//!    the validator's result is stored.
//! 2. If every required field passed, a second pass reports the first field
//!    whose stored validation is invalid (covers injected errors on fields
//!    without a validator).
//!
//! The first failure stops the run. The pipeline only mutates slots; the
//! caller publishes the returned results in order.

use super::fields::FieldTable;
use super::types::{FieldValue, FormValidationResult, ValidationResult};

/// Everything a run produced, in emission order.
#[derive(Debug)]
pub(crate) struct PipelineRun<V> {
    /// Per-field results from the required-field pass.
    pub field_results: Vec<(String, ValidationResult)>,
    /// Set when the run failed.
    pub failure: Option<FormValidationResult<V>>,
}

impl<V> PipelineRun<V> {
    pub fn is_valid(&self) -> bool {
        self.failure.is_none()
    }
}

pub(crate) fn run<V: FieldValue>(fields: &mut FieldTable<V>, required_message: &str) -> PipelineRun<V> {
    let mut field_results = Vec::new();

    for slot in fields.iter_mut() {
        let Some(validate) = slot.config.validate.clone() else {
            continue;
        };

        let result = if !slot.is_touched() {
            ValidationResult::invalid(required_message)
        } else if let Some(message) = &slot.injected {
            ValidationResult::invalid(message.clone())
        } else {
            validate(&slot.value)
        };

        slot.validation = result.clone();
        field_results.push((slot.name().to_string(), result.clone()));

        if !result.is_valid {
            tracing::debug!(field = slot.name(), message = ?result.message, "required field failed");
            let failure = FormValidationResult::failed(&result, slot.state());
            return PipelineRun {
                field_results,
                failure: Some(failure),
            };
        }
    }

    if let Some(slot) = fields.iter().find(|slot| !slot.validation.is_valid) {
        tracing::debug!(field = slot.name(), "stored field error");
        let failure = FormValidationResult::failed(&slot.validation, slot.state());
        return PipelineRun {
            field_results,
            failure: Some(failure),
        };
    }

    PipelineRun {
        field_results,
        failure: None,
    }
}
