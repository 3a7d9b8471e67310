//! Form Manager - Field values, validation and change notifications.
//!
//! Owns the field table, the reset baseline and the last validation result
//! for one logical form. Every mutation runs to completion (state change,
//! validation pipeline, event emission) before returning.
//!
//! # API
//!
//! - `get_data` / `set_data` / `reset_data` - whole-form data
//! - `set_field_value` / `clear_field_value` - single field values (mark touched)
//! - `hide_field` / `show_field` / `disable_field` / `enable_field` - flags
//! - `set_error` - inject an externally detected error
//! - `validate` / `is_valid` / `validity` - validation state
//! - `on_*` - subscriptions through the injected channel
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use form_state::{FieldConfig, FormManager, FormEvent, LocalChannel, ValidationResult};
//!
//! let channel = Rc::new(LocalChannel::<FormEvent<String>>::new());
//! let mut form = FormManager::new(
//!     vec![FieldConfig::new("email", String::new()).validator(|v: &String| {
//!         if v.contains('@') { ValidationResult::valid() } else { ValidationResult::invalid("bad email") }
//!     })],
//!     channel,
//! )?;
//!
//! let sub = form.on_validation_changed(|result| println!("{:?}", result.message));
//! form.set_field_value("email", "a@b.com".to_string())?;
//! assert!(form.validate());
//! sub.unsubscribe();
//! ```

use std::rc::Rc;

use spark_signals::{signal, Signal};

use crate::channel::{topics, EventChannel, Unsubscribe};
use crate::error::{FormError, Result};
use crate::options::FormOptions;
use super::event::FormEvent;
use super::fields::{FieldSlot, FieldTable};
use super::history::History;
use super::types::{FieldConfig, FieldFlags, FieldState, FieldValue, FormData, FormValidationResult, ValidationResult};
use super::validation;

/// Channel type a form publishes on.
pub type FormChannel<V> = Rc<dyn EventChannel<FormEvent<V>>>;

pub struct FormManager<V: FieldValue> {
    fields: FieldTable<V>,
    default_data: FormData<V>,
    validation: FormValidationResult<V>,
    validity: Signal<bool>,
    history: Option<History<V>>,
    options: FormOptions,
    channel: FormChannel<V>,
}

/// Form over dynamically typed JSON values.
pub type JsonFormManager = FormManager<serde_json::Value>;

impl<V: FieldValue> FormManager<V> {
    pub fn new(fields: Vec<FieldConfig<V>>, channel: FormChannel<V>) -> Result<Self> {
        Self::with_options(fields, channel, FormOptions::default())
    }

    pub fn with_options(fields: Vec<FieldConfig<V>>, channel: FormChannel<V>, options: FormOptions) -> Result<Self> {
        let fields = FieldTable::new(fields)?;
        let default_data = fields.defaults();
        let history = options.history_limit.map(History::new);

        tracing::debug!(fields = fields.len(), history_limit = ?options.history_limit, "form created");

        Ok(Self {
            fields,
            default_data,
            validation: FormValidationResult::unvalidated(),
            validity: signal(false),
            history,
            options,
            channel,
        })
    }

    // =========================================================================
    // Data
    // =========================================================================

    /// Current form data. The returned map is a copy.
    pub fn get_data(&self) -> FormData<V> {
        self.fields.data()
    }

    /// Merge `partial` into the current data and re-validate.
    ///
    /// Does not mark fields touched. Fails without changing anything if
    /// `partial` names an unknown field.
    pub fn set_data(&mut self, partial: FormData<V>) -> Result<()> {
        self.fields.check_known(&partial).inspect_err(|err| tracing::warn!(%err, op = "set_data", "rejected"))?;

        let before = self.snapshot_for_history();
        let keys = partial.len();
        for (name, value) in partial {
            let slot = self.fields.get_mut(&name)?;
            slot.value = value;
            slot.release_injected();
        }
        self.commit(before);

        tracing::debug!(keys, "data set");
        self.validate();
        self.publish_data();
        Ok(())
    }

    /// Merge `partial` into the reset baseline and re-validate.
    pub fn set_default_data(&mut self, partial: FormData<V>) -> Result<()> {
        self.fields
            .check_known(&partial)
            .inspect_err(|err| tracing::warn!(%err, op = "set_default_data", "rejected"))?;

        self.default_data.extend(partial);
        tracing::debug!("default data set");
        self.validate();
        Ok(())
    }

    pub fn get_default_data(&self) -> FormData<V> {
        self.default_data.clone()
    }

    /// Replace current values with the baseline.
    ///
    /// Touched flags and validation results are left as they are and the
    /// pipeline does not run.
    pub fn reset_data(&mut self) {
        let before = self.snapshot_for_history();
        self.fields.restore(&self.default_data);
        self.commit(before);

        tracing::debug!("data reset");
        self.publish_data();
    }

    pub fn on_data_changed<F>(&self, handler: F) -> Unsubscribe
    where
        F: Fn(&FormData<V>) + 'static,
    {
        self.channel.subscribe(
            topics::DATA_CHANGED,
            Box::new(move |event: &FormEvent<V>| {
                if let FormEvent::DataChanged(data) = event {
                    handler(data);
                }
            }),
        )
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Run the validation pipeline and publish its results.
    pub fn validate(&mut self) -> bool {
        let run = validation::run(&mut self.fields, &self.options.required_message);
        let valid = run.is_valid();

        self.validation = match &run.failure {
            Some(failure) => failure.clone(),
            None => FormValidationResult::valid(),
        };
        self.validity.set(valid);
        tracing::debug!(valid, evaluated = run.field_results.len(), "validated");

        for (name, result) in run.field_results {
            self.channel
                .emit(&topics::field_validation(&name), &FormEvent::FieldValidation(result));
        }
        if let Some(failure) = run.failure {
            self.channel.emit(topics::FORM_VALIDATION, &FormEvent::FormValidation(failure));
        }

        valid
    }

    /// Outcome of the last validation run. False before the first run.
    pub fn is_valid(&self) -> bool {
        self.validation.is_valid
    }

    /// Result of the last validation run.
    pub fn validation(&self) -> &FormValidationResult<V> {
        &self.validation
    }

    /// Reactive handle on the last validation outcome.
    pub fn validity(&self) -> Signal<bool> {
        self.validity.clone()
    }

    /// Subscribe to form-level validation failures.
    pub fn on_validation_changed<F>(&self, handler: F) -> Unsubscribe
    where
        F: Fn(&FormValidationResult<V>) + 'static,
    {
        self.channel.subscribe(
            topics::FORM_VALIDATION,
            Box::new(move |event: &FormEvent<V>| {
                if let FormEvent::FormValidation(result) = event {
                    handler(result);
                }
            }),
        )
    }

    // =========================================================================
    // Fields
    // =========================================================================

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(FieldSlot::name)
    }

    pub fn field_state(&self, name: &str) -> Result<FieldState<V>> {
        self.fields
            .get(name)
            .map(FieldSlot::state)
            .inspect_err(|_| tracing::warn!(field = name, op = "field_state", "unknown field"))
    }

    /// All field states in configuration order.
    pub fn field_states(&self) -> Vec<FieldState<V>> {
        self.fields.iter().map(FieldSlot::state).collect()
    }

    /// Set a field's value and mark it touched.
    pub fn set_field_value(&mut self, name: &str, value: V) -> Result<()> {
        self.write_field(name, "set_field_value", value)
    }

    /// Set a field's value to `V::default()` and mark it touched.
    pub fn clear_field_value(&mut self, name: &str) -> Result<()> {
        self.write_field(name, "clear_field_value", V::default())
    }

    pub fn hide_field(&mut self, name: &str) -> Result<()> {
        self.update_field(name, "hide_field", |slot| slot.flags.insert(FieldFlags::HIDDEN))
    }

    pub fn show_field(&mut self, name: &str) -> Result<()> {
        self.update_field(name, "show_field", |slot| slot.flags.remove(FieldFlags::HIDDEN))
    }

    pub fn disable_field(&mut self, name: &str) -> Result<()> {
        self.update_field(name, "disable_field", |slot| slot.flags.insert(FieldFlags::DISABLED))
    }

    pub fn enable_field(&mut self, name: &str) -> Result<()> {
        self.update_field(name, "enable_field", |slot| slot.flags.remove(FieldFlags::DISABLED))
    }

    /// Inject (`error = true`) or withdraw an externally detected error.
    ///
    /// An injected error stays until withdrawn. On a field with a validator it
    /// is also dropped by the next caller value write.
    pub fn set_error(&mut self, name: &str, error: bool, message: impl Into<String>) -> Result<()> {
        let message = message.into();
        self.update_field(name, "set_error", |slot| {
            if error {
                slot.inject_error(message);
            } else {
                slot.clear_injected();
            }
        })
    }

    /// Subscribe to state changes of one field.
    pub fn on_field_changed<F>(&self, name: &str, handler: F) -> Result<Unsubscribe>
    where
        F: Fn(&FieldState<V>) + 'static,
    {
        self.require_field(name, "on_field_changed")?;
        Ok(self.channel.subscribe(
            &topics::field_changed(name),
            Box::new(move |event: &FormEvent<V>| {
                if let FormEvent::FieldChanged(state) = event {
                    handler(state);
                }
            }),
        ))
    }

    /// Subscribe to validation results of one field.
    pub fn on_field_validation<F>(&self, name: &str, handler: F) -> Result<Unsubscribe>
    where
        F: Fn(&ValidationResult) + 'static,
    {
        self.require_field(name, "on_field_validation")?;
        Ok(self.channel.subscribe(
            &topics::field_validation(name),
            Box::new(move |event: &FormEvent<V>| {
                if let FormEvent::FieldValidation(result) = event {
                    handler(result);
                }
            }),
        ))
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Restore the data as it was before the last committed change.
    ///
    /// Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> Result<bool> {
        let current = self.fields.data();
        let history = self.history.as_mut().ok_or(FormError::NotImplemented("undo"))?;
        let Some(previous) = history.undo(current) else {
            return Ok(false);
        };

        tracing::debug!("undo");
        self.apply_snapshot(&previous);
        Ok(true)
    }

    /// Re-apply the last undone change.
    ///
    /// Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> Result<bool> {
        let current = self.fields.data();
        let history = self.history.as_mut().ok_or(FormError::NotImplemented("redo"))?;
        let Some(next) = history.redo(current) else {
            return Ok(false);
        };

        tracing::debug!("redo");
        self.apply_snapshot(&next);
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        self.history.as_ref().is_some_and(History::can_undo)
    }

    pub fn can_redo(&self) -> bool {
        self.history.as_ref().is_some_and(History::can_redo)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn require_field(&self, name: &str, op: &'static str) -> Result<()> {
        self.fields
            .index_of(name)
            .map(|_| ())
            .inspect_err(|_| tracing::warn!(field = name, op, "unknown field"))
    }

    fn write_field(&mut self, name: &str, op: &'static str, value: V) -> Result<()> {
        self.require_field(name, op)?;

        let before = self.snapshot_for_history();
        self.fields.get_mut(name)?.write(value);
        self.commit(before);

        tracing::debug!(field = name, op, "field value written");
        self.after_field_change(name, true)
    }

    fn update_field<F>(&mut self, name: &str, op: &'static str, apply: F) -> Result<()>
    where
        F: FnOnce(&mut FieldSlot<V>),
    {
        self.require_field(name, op)?;
        apply(self.fields.get_mut(name)?);

        tracing::debug!(field = name, op, "field updated");
        self.after_field_change(name, false)
    }

    fn after_field_change(&mut self, name: &str, value_changed: bool) -> Result<()> {
        self.validate();

        let state = self.fields.get(name)?.state();
        self.channel
            .emit(&topics::field_changed(name), &FormEvent::FieldChanged(state));
        if value_changed {
            self.publish_data();
        }
        Ok(())
    }

    fn publish_data(&self) {
        self.channel
            .emit(topics::DATA_CHANGED, &FormEvent::DataChanged(self.fields.data()));
    }

    fn apply_snapshot(&mut self, snapshot: &FormData<V>) {
        self.fields.restore(snapshot);
        self.validate();
        self.publish_data();
    }

    fn snapshot_for_history(&self) -> Option<FormData<V>> {
        self.history.as_ref().map(|_| self.fields.data())
    }

    /// Record `before` if the mutation actually changed the data.
    fn commit(&mut self, before: Option<FormData<V>>) {
        let Some(before) = before else {
            return;
        };
        let changed = before != self.fields.data();
        if let Some(history) = self.history.as_mut() {
            if changed {
                history.record(before);
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::LocalChannel;
    use std::cell::{Cell, RefCell};

    fn not_empty(value: &String) -> ValidationResult {
        if value.is_empty() {
            ValidationResult::invalid("must not be empty")
        } else {
            ValidationResult::valid()
        }
    }

    fn form_with(options: FormOptions) -> (FormManager<String>, Rc<LocalChannel<FormEvent<String>>>) {
        let channel = Rc::new(LocalChannel::<FormEvent<String>>::new());
        let form = FormManager::with_options(
            vec![
                FieldConfig::new("name", String::new()).validator(not_empty),
                FieldConfig::new("nickname", "anon".to_string()),
            ],
            channel.clone(),
            options,
        )
        .unwrap();
        (form, channel)
    }

    fn form() -> (FormManager<String>, Rc<LocalChannel<FormEvent<String>>>) {
        form_with(FormOptions::default())
    }

    #[test]
    fn test_initial_state() {
        let (form, _) = form();

        assert!(!form.is_valid());
        assert!(form.validation().invalid_fields.is_empty());
        assert_eq!(form.get_data(), form.get_default_data());
        assert_eq!(form.field_names().collect::<Vec<_>>(), vec!["name", "nickname"]);

        let nickname = form.field_state("nickname").unwrap();
        assert_eq!(nickname.value, "anon");
        assert!(!nickname.is_touched);
        assert!(nickname.validation.is_valid);
    }

    #[test]
    fn test_set_field_value_touches_and_mirrors() {
        let (mut form, _) = form();

        form.set_field_value("name", "Ada".to_string()).unwrap();

        let state = form.field_state("name").unwrap();
        assert!(state.is_touched);
        assert_eq!(state.value, "Ada");
        assert_eq!(form.get_data().get("name").map(String::as_str), Some("Ada"));
        assert!(form.is_valid());
    }

    #[test]
    fn test_set_data_does_not_touch() {
        let (mut form, _) = form();

        form.set_data(FormData::from([("name".to_string(), "Ada".to_string())]))
            .unwrap();

        let state = form.field_state("name").unwrap();
        assert_eq!(state.value, "Ada");
        assert!(!state.is_touched);
        // Untouched required field stays invalid regardless of value.
        assert_eq!(state.validation, ValidationResult::invalid("Field is required"));
        assert!(!form.is_valid());
    }

    #[test]
    fn test_set_data_unknown_key_changes_nothing() {
        let (mut form, _) = form();
        let before = form.get_data();

        let err = form
            .set_data(FormData::from([
                ("name".to_string(), "Ada".to_string()),
                ("zzz".to_string(), "x".to_string()),
            ]))
            .unwrap_err();

        assert!(matches!(err, FormError::UnknownField(name) if name == "zzz"));
        assert_eq!(form.get_data(), before);
    }

    #[test]
    fn test_unknown_field_operations() {
        let (mut form, _) = form();

        assert!(matches!(form.set_field_value("zzz", String::new()), Err(FormError::UnknownField(_))));
        assert!(matches!(form.clear_field_value("zzz"), Err(FormError::UnknownField(_))));
        assert!(matches!(form.hide_field("zzz"), Err(FormError::UnknownField(_))));
        assert!(matches!(form.show_field("zzz"), Err(FormError::UnknownField(_))));
        assert!(matches!(form.disable_field("zzz"), Err(FormError::UnknownField(_))));
        assert!(matches!(form.enable_field("zzz"), Err(FormError::UnknownField(_))));
        assert!(matches!(form.set_error("zzz", true, "x"), Err(FormError::UnknownField(_))));
        assert!(matches!(form.field_state("zzz"), Err(FormError::UnknownField(_))));
        assert!(matches!(form.on_field_changed("zzz", |_| {}), Err(FormError::UnknownField(_))));
        assert!(matches!(form.on_field_validation("zzz", |_| {}), Err(FormError::UnknownField(_))));
    }

    #[test]
    fn test_flags() {
        let (mut form, _) = form();

        form.hide_field("nickname").unwrap();
        form.disable_field("nickname").unwrap();
        let state = form.field_state("nickname").unwrap();
        assert!(state.hidden && state.disabled);
        assert!(!state.is_touched);

        form.show_field("nickname").unwrap();
        form.enable_field("nickname").unwrap();
        let state = form.field_state("nickname").unwrap();
        assert!(!state.hidden && !state.disabled);
    }

    #[test]
    fn test_clear_field_value() {
        let (mut form, _) = form();

        form.clear_field_value("nickname").unwrap();

        let state = form.field_state("nickname").unwrap();
        assert_eq!(state.value, "");
        assert!(state.is_touched);
    }

    #[test]
    fn test_field_changed_event() {
        let (mut form, _) = form();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();

        let sub = form
            .on_field_changed("nickname", move |state| seen_clone.borrow_mut().push(state.clone()))
            .unwrap();

        form.hide_field("nickname").unwrap();
        form.set_field_value("name", "Ada".to_string()).unwrap();
        sub.unsubscribe();
        form.show_field("nickname").unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].hidden);
        assert_eq!(seen[0].name, "nickname");
    }

    #[test]
    fn test_field_validation_events() {
        let (mut form, _) = form();
        let results = Rc::new(RefCell::new(Vec::new()));
        let results_clone = results.clone();

        let _sub = form
            .on_field_validation("name", move |result| results_clone.borrow_mut().push(result.clone()))
            .unwrap();

        form.validate();
        form.set_field_value("name", String::new()).unwrap();
        form.set_field_value("name", "Ada".to_string()).unwrap();

        assert_eq!(
            *results.borrow(),
            vec![
                ValidationResult::invalid("Field is required"),
                ValidationResult::invalid("must not be empty"),
                ValidationResult::valid(),
            ]
        );
    }

    #[test]
    fn test_validation_changed_only_on_failure() {
        let (mut form, _) = form();
        let failures = Rc::new(Cell::new(0));
        let failures_clone = failures.clone();

        let _sub = form.on_validation_changed(move |result| {
            assert!(!result.is_valid);
            failures_clone.set(failures_clone.get() + 1);
        });

        assert!(!form.validate());
        assert_eq!(failures.get(), 1);

        form.set_field_value("name", "Ada".to_string()).unwrap();
        assert!(form.is_valid());
        assert_eq!(failures.get(), 1);
        assert!(form.validation().is_valid);
    }

    #[test]
    fn test_data_changed_event() {
        let (mut form, _) = form();
        let snapshots = Rc::new(RefCell::new(Vec::new()));
        let snapshots_clone = snapshots.clone();

        let sub = form.on_data_changed(move |data| snapshots_clone.borrow_mut().push(data.clone()));

        form.set_field_value("nickname", "bob".to_string()).unwrap();
        form.hide_field("nickname").unwrap();
        form.reset_data();
        sub.unsubscribe();
        sub.unsubscribe();
        form.set_field_value("nickname", "eve".to_string()).unwrap();

        let snapshots = snapshots.borrow();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].get("nickname").map(String::as_str), Some("bob"));
        assert_eq!(snapshots[1].get("nickname").map(String::as_str), Some("anon"));
    }

    #[test]
    fn test_reset_keeps_touch_and_validation() {
        let (mut form, _) = form();
        form.set_field_value("name", "Ada".to_string()).unwrap();
        let validation = form.field_state("name").unwrap().validation;

        form.reset_data();

        let state = form.field_state("name").unwrap();
        assert_eq!(state.value, "");
        assert!(state.is_touched);
        assert_eq!(state.validation, validation);
    }

    #[test]
    fn test_set_default_data_changes_reset_target() {
        let (mut form, _) = form();

        form.set_default_data(FormData::from([("nickname".to_string(), "ghost".to_string())]))
            .unwrap();
        assert_eq!(form.get_data().get("nickname").map(String::as_str), Some("anon"));

        form.reset_data();
        assert_eq!(form.get_data(), form.get_default_data());
        assert_eq!(form.get_data().get("nickname").map(String::as_str), Some("ghost"));
    }

    #[test]
    fn test_set_error_and_withdraw() {
        let (mut form, _) = form();
        form.set_field_value("name", "Ada".to_string()).unwrap();
        assert!(form.is_valid());

        form.set_error("nickname", true, "taken").unwrap();
        assert!(!form.is_valid());
        assert_eq!(form.validation().message.as_deref(), Some("taken"));
        assert_eq!(form.validation().invalid_fields[0].name, "nickname");

        form.set_error("nickname", false, "").unwrap();
        assert!(form.is_valid());
    }

    #[test]
    fn test_injected_error_cleared_by_value_write() {
        let (mut form, _) = form();
        form.set_field_value("name", "Ada".to_string()).unwrap();
        form.set_error("name", true, "server rejected").unwrap();

        // Validation passes would not clear it.
        assert!(!form.validate());
        assert_eq!(form.field_state("name").unwrap().validation.message.as_deref(), Some("server rejected"));

        form.set_field_value("name", "Grace".to_string()).unwrap();
        assert!(form.is_valid());
    }

    #[test]
    fn test_validity_signal_tracks_outcome() {
        let (mut form, _) = form();
        let validity = form.validity();
        assert!(!validity.get());

        form.set_field_value("name", "Ada".to_string()).unwrap();
        assert!(validity.get());

        form.clear_field_value("name").unwrap();
        assert!(!validity.get());
    }

    #[test]
    fn test_history_disabled_fails_loudly() {
        let (mut form, _) = form();

        assert!(matches!(form.undo(), Err(FormError::NotImplemented("undo"))));
        assert!(matches!(form.redo(), Err(FormError::NotImplemented("redo"))));
        assert!(!form.can_undo());
    }

    #[test]
    fn test_undo_redo() {
        let (mut form, _) = form_with(FormOptions::default().with_history(10));

        assert!(!form.undo().unwrap());

        form.set_field_value("nickname", "bob".to_string()).unwrap();
        form.set_field_value("nickname", "eve".to_string()).unwrap();
        assert!(form.can_undo());

        assert!(form.undo().unwrap());
        assert_eq!(form.get_data().get("nickname").map(String::as_str), Some("bob"));

        assert!(form.undo().unwrap());
        assert_eq!(form.get_data().get("nickname").map(String::as_str), Some("anon"));
        assert!(!form.can_undo());

        assert!(form.redo().unwrap());
        assert_eq!(form.get_data().get("nickname").map(String::as_str), Some("bob"));

        // A new mutation after undo drops redo-ability.
        form.set_field_value("nickname", "zed".to_string()).unwrap();
        assert!(!form.can_redo());
        assert!(!form.redo().unwrap());
    }

    #[test]
    fn test_no_history_for_unchanged_data() {
        let (mut form, _) = form_with(FormOptions::default().with_history(10));

        form.set_field_value("nickname", "anon".to_string()).unwrap();
        form.hide_field("nickname").unwrap();

        assert!(!form.can_undo());
    }

    #[test]
    fn test_custom_required_message() {
        let options = FormOptions {
            required_message: "Please fill in".to_string(),
            ..FormOptions::default()
        };
        let (mut form, _) = form_with(options);

        form.validate();
        assert_eq!(form.validation().message.as_deref(), Some("Please fill in"));
    }

    #[test]
    fn test_duplicate_field_config() {
        let channel: FormChannel<i32> = Rc::new(LocalChannel::<FormEvent<i32>>::new());
        let result = FormManager::new(vec![FieldConfig::new("a", 0), FieldConfig::new("a", 1)], channel);
        assert!(matches!(result, Err(FormError::DuplicateField(_))));
    }
}
