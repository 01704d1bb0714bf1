//! In-memory model backed by a JSON object

use super::{Model, Values};
use crate::error::ModelError;
use async_trait::async_trait;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::fmt;

type Validator = Box<dyn Fn(&Values) -> Result<(), String>>;

/// A model whose "persistence" commits the working values in memory
pub struct MemoryModel {
    name: String,
    values: RefCell<Values>,
    committed: RefCell<Values>,
    is_new: Cell<bool>,
    is_deleted: Cell<bool>,
    is_saving: Cell<bool>,
    validator: Option<Validator>,
    errors: RefCell<Vec<String>>,
}

impl MemoryModel {
    /// Create a persisted model with the given committed values
    pub fn new(name: &str, values: Values) -> Self {
        Self {
            name: name.to_string(),
            committed: RefCell::new(values.clone()),
            values: RefCell::new(values),
            is_new: Cell::new(false),
            is_deleted: Cell::new(false),
            is_saving: Cell::new(false),
            validator: None,
            errors: RefCell::new(Vec::new()),
        }
    }

    /// Mark the model as never persisted
    pub fn new_record(self) -> Self {
        self.is_new.set(true);
        self
    }

    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&Values) -> Result<(), String> + 'static,
    {
        self.validator = Some(Box::new(validator));
        self
    }

    /// Working values, including uncommitted edits
    pub fn values(&self) -> Values {
        self.values.borrow().clone()
    }

    /// Values as of the last successful save
    pub fn committed(&self) -> Values {
        self.committed.borrow().clone()
    }

    /// Validation errors from the last `validate` call
    pub fn errors(&self) -> Vec<String> {
        self.errors.borrow().clone()
    }

    /// Discard uncommitted edits
    pub fn rollback(&self) {
        let committed = self.committed.borrow().clone();
        *self.values.borrow_mut() = committed;
    }
}

impl fmt::Debug for MemoryModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryModel")
            .field("name", &self.name)
            .field("values", &self.values.borrow())
            .field("is_new", &self.is_new.get())
            .field("is_deleted", &self.is_deleted.get())
            .finish()
    }
}

#[async_trait(?Send)]
impl Model for MemoryModel {
    fn set_properties(&self, values: &Values) {
        let mut current = self.values.borrow_mut();
        for (key, value) in values {
            current.insert(key.clone(), value.clone());
        }
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.values.borrow().get(key).cloned()
    }

    fn validate(&self, _options: Option<&Value>) -> bool {
        let Some(validator) = &self.validator else {
            return true;
        };
        let result = validator(&self.values.borrow());
        let mut errors = self.errors.borrow_mut();
        errors.clear();
        match result {
            Ok(()) => true,
            Err(message) => {
                errors.push(message);
                false
            }
        }
    }

    fn clear_validations(&self) {
        self.errors.borrow_mut().clear();
    }

    fn is_saving(&self) -> bool {
        self.is_saving.get()
    }

    fn is_new(&self) -> bool {
        self.is_new.get()
    }

    fn is_deleted(&self) -> bool {
        self.is_deleted.get()
    }

    fn has_dirty_attributes(&self) -> bool {
        *self.values.borrow() != *self.committed.borrow()
    }

    fn model_name(&self) -> Option<String> {
        Some(self.name.clone())
    }

    async fn save(&self) -> Result<(), ModelError> {
        if self.is_deleted.get() {
            return Err(ModelError::Rejected(format!("{} was deleted", self.name)));
        }
        self.is_saving.set(true);
        tokio::task::yield_now().await;
        let values = self.values.borrow().clone();
        *self.committed.borrow_mut() = values;
        self.is_new.set(false);
        self.is_saving.set(false);
        tracing::debug!("Saved model {}", self.name);
        Ok(())
    }

    async fn destroy_record(&self) -> Result<(), ModelError> {
        self.is_deleted.set(true);
        tracing::debug!("Destroyed model {}", self.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn values(v: Value) -> Values {
        v.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_set_properties_merges() {
        let model = MemoryModel::new("user", values(json!({"name": "a", "age": 3})));
        model.set_properties(&values(json!({"name": "b"})));
        assert_eq!(model.get("name"), Some(json!("b")));
        assert_eq!(model.get("age"), Some(json!(3)));
        assert!(model.has_dirty_attributes());
    }

    #[test]
    fn test_validator_records_errors() {
        let model = MemoryModel::new("user", values(json!({"name": ""}))).with_validator(|v| {
            match v.get("name").and_then(Value::as_str) {
                Some(name) if !name.is_empty() => Ok(()),
                _ => Err("name is required".to_string()),
            }
        });
        assert!(!model.validate(None));
        assert_eq!(model.errors(), vec!["name is required".to_string()]);

        model.clear_validations();
        assert!(model.errors().is_empty());
    }

    #[test]
    fn test_rollback_restores_committed() {
        let model = MemoryModel::new("user", values(json!({"name": "a"})));
        model.set_properties(&values(json!({"name": "b"})));
        model.rollback();
        assert_eq!(model.get("name"), Some(json!("a")));
        assert!(!model.has_dirty_attributes());
    }

    #[tokio::test]
    async fn test_save_commits_and_clears_new() {
        let model = MemoryModel::new("user", Values::new()).new_record();
        model.set_properties(&values(json!({"name": "a"})));
        model.save().await.unwrap();
        assert!(!model.is_new());
        assert!(!model.has_dirty_attributes());
        assert_eq!(model.committed().get("name"), Some(&json!("a")));
    }

    #[tokio::test]
    async fn test_save_after_destroy_rejects() {
        let model = MemoryModel::new("user", Values::new());
        model.destroy_record().await.unwrap();
        assert!(model.is_deleted());
        assert!(matches!(model.save().await, Err(ModelError::Rejected(_))));
    }
}
