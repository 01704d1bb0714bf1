//! Lifecycle hooks (the callback half of a form's policy)

use crate::error::{FormError, ModelError};
use crate::model::{ModelRef, Values};
use async_trait::async_trait;
use serde_json::Value;

/// Policy callbacks consulted by a form during its lifecycle
///
/// Every method has a default, so implementors override only what they need.
/// `will_*` methods are guards: returning `false` vetoes the action before any
/// side effect happens.
#[async_trait(?Send)]
pub trait FormHooks {
    /// Gate for submission; runs model validations by default
    fn will_submit(&self, model: &ModelRef, validation_options: Option<&Value>) -> bool {
        model.validate(validation_options)
    }

    fn did_not_submit(&self, _model: &ModelRef) {}

    /// The persistence call for a submit
    async fn on_submit(&self, model: ModelRef) -> Result<(), ModelError> {
        model.save().await
    }

    fn did_submit(&self, _model: &ModelRef) {}

    fn failed_submit(&self, _reason: &FormError) {}

    /// A descendant form finished submitting
    fn child_did_submit(&self, _originator: &ModelRef) {}

    /// A descendant form failed to submit
    fn child_failed_submit(&self, _originator: &ModelRef) {}

    fn will_reset(&self, _model: &ModelRef) -> bool {
        true
    }

    fn did_not_reset(&self, _model: &ModelRef) {}

    async fn on_reset(&self, _model: ModelRef) -> Result<(), ModelError> {
        Ok(())
    }

    fn did_reset(&self, _model: &ModelRef) {}

    fn failed_reset(&self, _reason: &ModelError) {}

    /// Values were written through the form
    fn on_update_values(&self, _values: &Values) {}

    fn on_marked_dirty(&self, _model: &ModelRef) {}

    fn on_marked_clean(&self, _model: &ModelRef) {}

    /// The aggregate submitting flag of this form was recomputed
    fn on_submitting_changed(&self, _is_submitting: bool) {}

    fn will_destroy_model(&self, _model: &ModelRef) -> bool {
        true
    }

    fn did_destroy_model(&self, _model: &ModelRef) {}

    fn did_not_destroy_model(&self, _model: &ModelRef) {}

    fn failed_destroy_model(&self, _reason: &ModelError) {}
}

/// Hooks with every default behavior
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHooks;

impl FormHooks for DefaultHooks {}
