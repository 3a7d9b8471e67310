//! Field Table - Arena of field slots indexed by name.
//!
//! Slots are stored in configuration order (the validation priority order)
//! with a name -> index map for lookup. Field values live only here; form
//! data is assembled from the slots, so the two can never diverge.

use std::collections::HashMap;

use crate::error::{FormError, Result};
use super::types::{FieldConfig, FieldFlags, FieldState, FieldValue, FormData, ValidationResult};

// =============================================================================
// Field Slot
// =============================================================================

/// Runtime state owned for one configured field.
pub(crate) struct FieldSlot<V> {
    pub config: FieldConfig<V>,
    pub value: V,
    pub flags: FieldFlags,
    pub validation: ValidationResult,
    /// Message set through `set_error`, pending until the next value write.
    pub injected: Option<String>,
}

impl<V: FieldValue> FieldSlot<V> {
    fn new(config: FieldConfig<V>) -> Self {
        let validation = if config.is_required() {
            ValidationResult {
                is_valid: false,
                message: None,
            }
        } else {
            ValidationResult::valid()
        };

        Self {
            value: config.default_value.clone(),
            flags: config.flags(),
            validation,
            injected: None,
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn is_touched(&self) -> bool {
        self.flags.contains(FieldFlags::TOUCHED)
    }

    /// Caller-driven value write: marks touched and drops an injected error on
    /// fields the pipeline can recompute.
    pub fn write(&mut self, value: V) {
        self.value = value;
        self.flags.insert(FieldFlags::TOUCHED);
        self.release_injected();
    }

    /// Drop the injected error if the field has a validator to replace it.
    /// Fields without one keep it until it is withdrawn explicitly.
    pub fn release_injected(&mut self) {
        if self.config.is_required() {
            self.clear_injected();
        }
    }

    pub fn inject_error(&mut self, message: String) {
        self.validation = ValidationResult::invalid(message.clone());
        self.injected = Some(message);
    }

    pub fn clear_injected(&mut self) {
        if self.injected.take().is_some() {
            // Non-required fields have nothing to recompute them.
            self.validation = if self.config.is_required() {
                ValidationResult {
                    is_valid: false,
                    message: None,
                }
            } else {
                ValidationResult::valid()
            };
        }
    }

    pub fn state(&self) -> FieldState<V> {
        FieldState {
            name: self.config.name.clone(),
            value: self.value.clone(),
            hidden: self.flags.contains(FieldFlags::HIDDEN),
            disabled: self.flags.contains(FieldFlags::DISABLED),
            is_touched: self.is_touched(),
            validation: self.validation.clone(),
        }
    }
}

// =============================================================================
// Field Table
// =============================================================================

pub(crate) struct FieldTable<V> {
    slots: Vec<FieldSlot<V>>,
    index: HashMap<String, usize>,
}

impl<V: FieldValue> FieldTable<V> {
    pub fn new(configs: Vec<FieldConfig<V>>) -> Result<Self> {
        let mut slots = Vec::with_capacity(configs.len());
        let mut index = HashMap::with_capacity(configs.len());

        for config in configs {
            if index.contains_key(&config.name) {
                return Err(FormError::DuplicateField(config.name));
            }
            index.insert(config.name.clone(), slots.len());
            slots.push(FieldSlot::new(config));
        }

        Ok(Self { slots, index })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| FormError::UnknownField(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Result<&FieldSlot<V>> {
        let index = self.index_of(name)?;
        Ok(&self.slots[index])
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut FieldSlot<V>> {
        let index = self.index_of(name)?;
        Ok(&mut self.slots[index])
    }

    /// Fail with the first key of `data` that is not a configured field.
    pub fn check_known(&self, data: &FormData<V>) -> Result<()> {
        match data.keys().find(|name| !self.index.contains_key(name.as_str())) {
            Some(name) => Err(FormError::UnknownField(name.clone())),
            None => Ok(()),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldSlot<V>> {
        self.slots.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut FieldSlot<V>> {
        self.slots.iter_mut()
    }

    /// Assemble form data from the slots.
    pub fn data(&self) -> FormData<V> {
        self.slots
            .iter()
            .map(|slot| (slot.config.name.clone(), slot.value.clone()))
            .collect()
    }

    /// Overwrite values without touching flags or validation.
    pub fn restore(&mut self, data: &FormData<V>) {
        for slot in &mut self.slots {
            if let Some(value) = data.get(&slot.config.name) {
                slot.value = value.clone();
            }
        }
    }

    /// Default values from configuration.
    pub fn defaults(&self) -> FormData<V> {
        self.slots
            .iter()
            .map(|slot| (slot.config.name.clone(), slot.config.default_value.clone()))
            .collect()
    }
}
