//! Model capability layer
//!
//! The engine never owns domain entities. It talks to them through [`Model`],
//! which bundles the mutation, validation, persistence and deletion
//! primitives a form consumes.

mod memory;

use crate::error::ModelError;
use async_trait::async_trait;
use serde_json::Value;
use std::rc::Rc;

pub use memory::MemoryModel;

/// Named values merged into a model
pub type Values = serde_json::Map<String, Value>;

/// Shared handle to the entity a form edits
pub type ModelRef = Rc<dyn Model>;

/// Primitives a form consumes from the entity it edits
///
/// Every primitive except [`Model::set_properties`] and [`Model::get`] is
/// optional: absent validation always passes, absent persistence is a no-op
/// success.
#[async_trait(?Send)]
pub trait Model {
    /// Merge `values` into the model (object merge semantics)
    fn set_properties(&self, values: &Values);

    /// Read a single named value
    fn get(&self, key: &str) -> Option<Value>;

    /// Run validations, returning whether the model is valid
    fn validate(&self, _options: Option<&Value>) -> bool {
        true
    }

    /// Drop any validation errors currently held by the model
    fn clear_validations(&self) {}

    /// A persistence call is already in flight for this model
    fn is_saving(&self) -> bool {
        false
    }

    fn is_new(&self) -> bool {
        false
    }

    fn is_deleted(&self) -> bool {
        false
    }

    /// External dirty signal, consulted when a form enables model dirty tracking
    fn has_dirty_attributes(&self) -> bool {
        false
    }

    /// Related models tracked outside the form tree that still hold unsaved changes
    fn dirty_child_models(&self) -> usize {
        0
    }

    fn model_name(&self) -> Option<String> {
        None
    }

    async fn save(&self) -> Result<(), ModelError> {
        Ok(())
    }

    async fn destroy_record(&self) -> Result<(), ModelError> {
        Ok(())
    }
}
