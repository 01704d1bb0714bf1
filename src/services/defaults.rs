//! Default capability implementations for headless hosts

use super::{ConfirmationSink, DestroyConfirmer, NotificationSink};
use crate::error::ModelError;
use crate::model::ModelRef;
use async_trait::async_trait;
use std::rc::Rc;

/// Routes notifications to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify_success(&self, message: &str) {
        tracing::info!("Success: {message}");
    }

    fn notify_error(&self, message: &str) {
        tracing::warn!("Error: {message}");
    }
}

/// Answers every confirmation with the same decision
#[derive(Debug, Clone, Copy)]
pub struct FixedConfirmation(pub bool);

impl ConfirmationSink for FixedConfirmation {
    fn confirm(&self, message: &str) -> bool {
        tracing::debug!("Confirm '{message}' -> {}", self.0);
        self.0
    }
}

/// Asks the confirmation sink, then destroys through the model
pub struct ConfirmThenDestroy {
    confirmer: Rc<dyn ConfirmationSink>,
}

impl ConfirmThenDestroy {
    pub fn new(confirmer: Rc<dyn ConfirmationSink>) -> Self {
        Self { confirmer }
    }
}

#[async_trait(?Send)]
impl DestroyConfirmer for ConfirmThenDestroy {
    async fn confirm_destroy(&self, model: ModelRef, message: &str) -> Result<bool, ModelError> {
        if !self.confirmer.confirm(message) {
            return Ok(false);
        }
        model.destroy_record().await?;
        Ok(true)
    }
}
