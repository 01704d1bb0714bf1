//! The per-form record stored in the arena

use super::field::{FieldKey, FieldRecord};
use super::hooks::FormHooks;
use super::settings::FormSettings;
use super::{FormId, SubmitFuture};
use crate::model::ModelRef;
use std::rc::Rc;

pub(crate) struct FormNode {
    pub model: ModelRef,
    pub parent: Option<FormId>,
    pub children: Vec<FormId>,
    pub fields: Vec<(FieldKey, Rc<dyn FieldRecord>)>,
    pub hooks: Rc<dyn FormHooks>,
    pub settings: Rc<FormSettings>,
    /// Dirtiness as last computed from fields and children
    pub is_model_dirty: bool,
    /// Own submits accepted and not yet settled, queued ones included
    pub submits_in_flight: usize,
    pub is_resetting: bool,
    pub is_destroying_record: bool,
    /// Set while the form itself is being torn down
    pub is_tearing_down: bool,
    pub recompute_pending: bool,
    pub has_failed_last_submit: bool,
    /// Sequence number of the last accepted submit
    pub submit_seq: u64,
    /// The latest submit, until it settles
    pub pending_submit: Option<(u64, SubmitFuture)>,
}

impl FormNode {
    pub fn new(
        model: ModelRef,
        parent: Option<FormId>,
        hooks: Rc<dyn FormHooks>,
        settings: Rc<FormSettings>,
    ) -> Self {
        Self {
            model,
            parent,
            children: Vec::new(),
            fields: Vec::new(),
            hooks,
            settings,
            is_model_dirty: false,
            submits_in_flight: 0,
            is_resetting: false,
            is_destroying_record: false,
            is_tearing_down: false,
            recompute_pending: false,
            has_failed_last_submit: false,
            submit_seq: 0,
            pending_submit: None,
        }
    }

    /// `is_model_dirty` plus the model's own signal when enabled
    pub fn is_dirty(&self) -> bool {
        (self.settings.use_model_dirty_tracking && self.model.has_dirty_attributes())
            || self.is_model_dirty
    }

    pub fn is_submitting(&self) -> bool {
        self.submits_in_flight > 0
    }

    pub fn field_records(&self) -> Vec<Rc<dyn FieldRecord>> {
        self.fields.iter().map(|(_, field)| Rc::clone(field)).collect()
    }
}
