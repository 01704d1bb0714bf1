//! Navigation interception for dirty forms

use super::ConfirmationSink;
use crate::form::WeakForms;
use std::rc::Rc;

/// An in-flight route change that may be aborted
pub trait Transition {
    fn abort(&mut self);
}

/// Host-side hook point for the navigation guard
///
/// Installed once per process by [`crate::Forms::install_navigation_guard`],
/// uninstalled by [`crate::Forms::shutdown`].
#[cfg_attr(test, mockall::automock)]
pub trait NavigationGuardPort {
    fn install(&self, guard: NavigationGuard);
    fn uninstall(&self);
}

/// Answers navigation attempts from the aggregate dirty state of all forms
#[derive(Clone)]
pub struct NavigationGuard {
    forms: WeakForms,
    confirmer: Rc<dyn ConfirmationSink>,
    message: String,
}

impl NavigationGuard {
    pub(crate) fn new(forms: WeakForms, confirmer: Rc<dyn ConfirmationSink>, message: String) -> Self {
        Self {
            forms,
            confirmer,
            message,
        }
    }

    /// False once the engine has been dropped
    pub fn should_prevent_navigation(&self) -> bool {
        self.forms
            .upgrade()
            .is_some_and(|forms| forms.should_prevent_navigation())
    }

    /// Abort `transition` unless the user confirms leaving unsaved changes
    ///
    /// Returns whether the transition may proceed.
    pub fn route_will_change(&self, transition: &mut dyn Transition) -> bool {
        if self.should_prevent_navigation() && !self.confirmer.confirm(&self.message) {
            tracing::debug!("Aborting navigation away from dirty forms");
            transition.abort();
            return false;
        }
        true
    }

    /// Message for a page-unload prompt, if unloading should be questioned
    pub fn before_unload(&self) -> Option<String> {
        self.should_prevent_navigation().then(|| self.message.clone())
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Debug for NavigationGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationGuard")
            .field("message", &self.message)
            .finish()
    }
}
