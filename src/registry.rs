//! Process-wide set of live forms

use crate::form::FormId;
use std::cell::RefCell;

/// All currently registered forms, in registration order
///
/// Registration is idempotent and deregistration of a non-member is a no-op,
/// so re-entrant calls during teardown are safe.
#[derive(Debug, Default)]
pub struct FormRegistry {
    forms: RefCell<Vec<FormId>>,
}

impl FormRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, id: FormId) {
        let mut forms = self.forms.borrow_mut();
        if !forms.contains(&id) {
            forms.push(id);
        }
    }

    pub fn deregister(&self, id: FormId) {
        self.forms.borrow_mut().retain(|form| *form != id);
    }

    pub fn contains(&self, id: FormId) -> bool {
        self.forms.borrow().contains(&id)
    }

    pub fn len(&self) -> usize {
        self.forms.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.borrow().is_empty()
    }

    /// Snapshot of the registered ids
    pub fn ids(&self) -> Vec<FormId> {
        self.forms.borrow().clone()
    }

    /// True iff some registered form is dirty and prevents navigation
    ///
    /// `blocks` answers that question for a single form. It runs against a
    /// snapshot, so it may itself register or deregister forms.
    pub fn should_prevent_navigation<F>(&self, blocks: F) -> bool
    where
        F: Fn(FormId) -> bool,
    {
        self.ids().into_iter().any(blocks)
    }
}
