//! Capabilities injected into the form engine
//!
//! Traits here are the seams the host application implements: where messages
//! are shown, how the user confirms, how a record is destroyed and how
//! navigation is intercepted.

mod defaults;
mod navigation;

use crate::error::ModelError;
use crate::model::ModelRef;
use async_trait::async_trait;
use std::rc::Rc;

pub use defaults::{ConfirmThenDestroy, FixedConfirmation, LogNotifier};
pub use navigation::{NavigationGuard, NavigationGuardPort, Transition};

#[cfg(test)]
pub use navigation::MockNavigationGuardPort;

/// Shows success and error messages to the user
#[cfg_attr(test, mockall::automock)]
pub trait NotificationSink {
    fn notify_success(&self, message: &str);
    fn notify_error(&self, message: &str);
}

/// Yields a continue/abort decision from the user
#[cfg_attr(test, mockall::automock)]
pub trait ConfirmationSink {
    fn confirm(&self, message: &str) -> bool;
}

/// Confirms and performs the destruction of a record
#[async_trait(?Send)]
pub trait DestroyConfirmer {
    /// Returns `Ok(true)` once destroyed, `Ok(false)` when the user declined
    async fn confirm_destroy(&self, model: ModelRef, message: &str) -> Result<bool, ModelError>;
}

/// The full set of injected capabilities
#[derive(Clone)]
pub struct Services {
    pub notifier: Rc<dyn NotificationSink>,
    pub confirmer: Rc<dyn ConfirmationSink>,
    pub destroyer: Rc<dyn DestroyConfirmer>,
}

impl Services {
    /// Build services, destroying records through `confirmer` then the model
    pub fn new(notifier: Rc<dyn NotificationSink>, confirmer: Rc<dyn ConfirmationSink>) -> Self {
        let destroyer = Rc::new(ConfirmThenDestroy::new(Rc::clone(&confirmer)));
        Self {
            notifier,
            confirmer,
            destroyer,
        }
    }

    pub fn with_destroyer(mut self, destroyer: Rc<dyn DestroyConfirmer>) -> Self {
        self.destroyer = destroyer;
        self
    }
}

impl Default for Services {
    fn default() -> Self {
        Self::new(Rc::new(LogNotifier), Rc::new(FixedConfirmation(true)))
    }
}
