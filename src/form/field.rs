//! Field records bound to a form

use crate::model::{ModelRef, Values};
use serde_json::Value;
use std::cell::RefCell;
use std::fmt;

/// A bound input registered with exactly one form
pub trait FieldRecord {
    /// Whether the field holds a change relative to its last committed value
    fn is_really_dirty(&self) -> bool;

    /// Called by the owning form after a successful submit
    fn form_did_submit(&self);

    /// Called by the owning form after a successful reset
    fn form_did_reset(&self);
}

/// Handle returned by field registration, used to deregister
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldKey(pub(crate) u64);

/// A field tracking one model property against a baseline snapshot
pub struct TrackedField {
    pub name: String,
    pub label: String,
    model: ModelRef,
    baseline: RefCell<Option<Value>>,
}

impl TrackedField {
    /// Bind a field to `name` on `model`, taking the current value as baseline
    pub fn new(model: ModelRef, name: &str, label: &str) -> Self {
        let baseline = model.get(name);
        Self {
            name: name.to_string(),
            label: label.to_string(),
            model,
            baseline: RefCell::new(baseline),
        }
    }

    /// Current value on the model
    pub fn value(&self) -> Option<Value> {
        self.model.get(&self.name)
    }

    pub fn baseline(&self) -> Option<Value> {
        self.baseline.borrow().clone()
    }

    /// Value for rendering
    pub fn display_value(&self) -> String {
        match self.value() {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
        }
    }
}

impl fmt::Debug for TrackedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackedField")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("baseline", &self.baseline.borrow())
            .finish()
    }
}

impl FieldRecord for TrackedField {
    fn is_really_dirty(&self) -> bool {
        self.value() != *self.baseline.borrow()
    }

    fn form_did_submit(&self) {
        *self.baseline.borrow_mut() = self.value();
    }

    /// Restores the baseline value onto the model
    fn form_did_reset(&self) {
        let baseline = self.baseline.borrow().clone();
        let mut values = Values::new();
        values.insert(self.name.clone(), baseline.unwrap_or(Value::Null));
        self.model.set_properties(&values);
    }
}
