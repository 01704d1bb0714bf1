//! Test fixtures shared across modules

use crate::config::FormForConfig;
use crate::error::{FormError, ModelError};
use crate::form::{FormHooks, FormId, FormOptions, FormSettings, Forms, SubmitFuture, TrackedField};
use crate::model::{MemoryModel, Model, ModelRef, Values};
use crate::services::Services;
use async_trait::async_trait;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;
use tokio::sync::Semaphore;
use tokio::task::LocalSet;

/// Run `fut` on a fresh `LocalSet`
pub(crate) async fn run_local<F: Future>(fut: F) -> F::Output {
    LocalSet::new().run_until(fut).await
}

pub(crate) fn forms() -> Forms {
    Forms::new(FormForConfig::default(), Services::default())
}

pub(crate) fn to_values(json: Value) -> Values {
    match json {
        Value::Object(map) => map,
        _ => Values::new(),
    }
}

pub(crate) fn set_values(forms: &Forms, id: FormId, json: Value) -> Option<SubmitFuture> {
    forms.update_values(id, to_values(json)).unwrap()
}

/// Yield `n` scheduling turns
pub(crate) async fn turns(n: usize) {
    for _ in 0..n {
        tokio::task::yield_now().await;
    }
}

/// Form over a [`MemoryModel`] with one tracked field per key of `json`
pub(crate) fn tracked_form(
    forms: &Forms,
    parent: Option<FormId>,
    json: Value,
) -> (FormId, Rc<MemoryModel>) {
    let values = to_values(json);
    let model = Rc::new(MemoryModel::new("record", values.clone()));
    let mut options = FormOptions::new(model.clone());
    if let Some(parent) = parent {
        options = options.parent(parent);
    }
    let id = forms.create_form(options).unwrap();
    for key in values.keys() {
        forms
            .register_field(id, Rc::new(TrackedField::new(model.clone(), key, key)))
            .unwrap();
    }
    (id, model)
}

/// Ordered log shared between fixtures
#[derive(Debug, Clone, Default)]
pub(crate) struct EventLog(Rc<RefCell<Vec<String>>>);

impl EventLog {
    pub(crate) fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub(crate) fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// Model whose persistence calls can be held open by a semaphore
pub(crate) struct GatedModel {
    pub(crate) name: String,
    pub(crate) log: EventLog,
    pub(crate) values: RefCell<Values>,
    pub(crate) gate: RefCell<Option<Rc<Semaphore>>>,
    pub(crate) fail_with: RefCell<Option<ModelError>>,
    pub(crate) destroy_fail: RefCell<Option<ModelError>>,
    pub(crate) is_new: Cell<bool>,
    pub(crate) is_deleted: Cell<bool>,
    pub(crate) is_saving_flag: Cell<bool>,
    pub(crate) saving: Cell<bool>,
    pub(crate) valid: Cell<bool>,
    pub(crate) saves: Cell<usize>,
    pub(crate) destroys: Cell<usize>,
    pub(crate) validations: Cell<usize>,
    pub(crate) dirty_children: Cell<usize>,
}

impl GatedModel {
    pub(crate) fn new(name: &str) -> Self {
        Self::with_log(name, &EventLog::default())
    }

    pub(crate) fn with_log(name: &str, log: &EventLog) -> Self {
        Self {
            name: name.to_string(),
            log: log.clone(),
            values: RefCell::new(Values::new()),
            gate: RefCell::new(None),
            fail_with: RefCell::new(None),
            destroy_fail: RefCell::new(None),
            is_new: Cell::new(false),
            is_deleted: Cell::new(false),
            is_saving_flag: Cell::new(false),
            saving: Cell::new(false),
            valid: Cell::new(true),
            saves: Cell::new(0),
            destroys: Cell::new(0),
            validations: Cell::new(0),
            dirty_children: Cell::new(0),
        }
    }

    /// Hold every following persistence call until a permit is added
    pub(crate) fn close_gate(&self) -> Rc<Semaphore> {
        let gate = Rc::new(Semaphore::new(0));
        *self.gate.borrow_mut() = Some(Rc::clone(&gate));
        gate
    }

    async fn pass_gate(&self) {
        let gate = self.gate.borrow().clone();
        match gate {
            Some(gate) => {
                if let Ok(permit) = gate.acquire().await {
                    permit.forget();
                }
            }
            None => tokio::task::yield_now().await,
        }
    }
}

#[async_trait(?Send)]
impl Model for GatedModel {
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
        self.validations.set(self.validations.get() + 1);
        self.valid.get()
    }

    fn is_saving(&self) -> bool {
        self.is_saving_flag.get() || self.saving.get()
    }

    fn is_new(&self) -> bool {
        self.is_new.get()
    }

    fn is_deleted(&self) -> bool {
        self.is_deleted.get()
    }

    fn dirty_child_models(&self) -> usize {
        self.dirty_children.get()
    }

    fn model_name(&self) -> Option<String> {
        Some(self.name.clone())
    }

    async fn save(&self) -> Result<(), ModelError> {
        self.saves.set(self.saves.get() + 1);
        self.log.push(format!("start:{}", self.name));
        self.saving.set(true);
        self.pass_gate().await;
        self.saving.set(false);
        self.log.push(format!("end:{}", self.name));
        match self.fail_with.borrow().clone() {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }

    async fn destroy_record(&self) -> Result<(), ModelError> {
        self.pass_gate().await;
        if let Some(reason) = self.destroy_fail.borrow().clone() {
            return Err(reason);
        }
        self.destroys.set(self.destroys.get() + 1);
        self.is_deleted.set(true);
        Ok(())
    }
}

/// Hooks that record every callback and expose guard knobs
pub(crate) struct RecordingHooks {
    pub(crate) name: String,
    pub(crate) allow_submit: Cell<bool>,
    pub(crate) allow_reset: Cell<bool>,
    pub(crate) allow_destroy: Cell<bool>,
    pub(crate) reset_error: RefCell<Option<ModelError>>,
    calls: RefCell<Vec<&'static str>>,
    failures: RefCell<Vec<ModelError>>,
    reset_failures: RefCell<Vec<ModelError>>,
    destroy_failures: RefCell<Vec<ModelError>>,
    submitting: RefCell<Vec<bool>>,
}

impl RecordingHooks {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            allow_submit: Cell::new(true),
            allow_reset: Cell::new(true),
            allow_destroy: Cell::new(true),
            reset_error: RefCell::new(None),
            calls: RefCell::new(Vec::new()),
            failures: RefCell::new(Vec::new()),
            reset_failures: RefCell::new(Vec::new()),
            destroy_failures: RefCell::new(Vec::new()),
            submitting: RefCell::new(Vec::new()),
        }
    }

    fn record(&self, call: &'static str) {
        tracing::trace!("{}: {call}", self.name);
        self.calls.borrow_mut().push(call);
    }

    pub(crate) fn count(&self, call: &str) -> usize {
        self.calls.borrow().iter().filter(|c| **c == call).count()
    }

    /// Model-level reasons passed to `failed_submit`
    pub(crate) fn failures(&self) -> Vec<ModelError> {
        self.failures.borrow().clone()
    }

    pub(crate) fn reset_failures(&self) -> Vec<ModelError> {
        self.reset_failures.borrow().clone()
    }

    pub(crate) fn destroy_failures(&self) -> Vec<ModelError> {
        self.destroy_failures.borrow().clone()
    }

    pub(crate) fn submitting_changes(&self) -> Vec<bool> {
        self.submitting.borrow().clone()
    }
}

#[async_trait(?Send)]
impl FormHooks for RecordingHooks {
    fn will_submit(&self, model: &ModelRef, validation_options: Option<&Value>) -> bool {
        self.allow_submit.get() && model.validate(validation_options)
    }

    fn did_not_submit(&self, _model: &ModelRef) {
        self.record("did_not_submit");
    }

    fn did_submit(&self, _model: &ModelRef) {
        self.record("did_submit");
    }

    fn failed_submit(&self, reason: &FormError) {
        self.record("failed_submit");
        if let Some(reason) = reason.reason() {
            self.failures.borrow_mut().push(reason.clone());
        }
    }

    fn child_did_submit(&self, _originator: &ModelRef) {
        self.record("child_did_submit");
    }

    fn child_failed_submit(&self, _originator: &ModelRef) {
        self.record("child_failed_submit");
    }

    fn will_reset(&self, _model: &ModelRef) -> bool {
        self.allow_reset.get()
    }

    fn did_not_reset(&self, _model: &ModelRef) {
        self.record("did_not_reset");
    }

    async fn on_reset(&self, _model: ModelRef) -> Result<(), ModelError> {
        self.record("on_reset");
        tokio::task::yield_now().await;
        match self.reset_error.borrow().clone() {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }

    fn did_reset(&self, _model: &ModelRef) {
        self.record("did_reset");
    }

    fn failed_reset(&self, reason: &ModelError) {
        self.record("failed_reset");
        self.reset_failures.borrow_mut().push(reason.clone());
    }

    fn on_update_values(&self, _values: &Values) {
        self.record("on_update_values");
    }

    fn on_marked_dirty(&self, _model: &ModelRef) {
        self.record("on_marked_dirty");
    }

    fn on_marked_clean(&self, _model: &ModelRef) {
        self.record("on_marked_clean");
    }

    fn on_submitting_changed(&self, is_submitting: bool) {
        self.submitting.borrow_mut().push(is_submitting);
    }

    fn will_destroy_model(&self, _model: &ModelRef) -> bool {
        self.allow_destroy.get()
    }

    fn did_destroy_model(&self, _model: &ModelRef) {
        self.record("did_destroy_model");
    }

    fn did_not_destroy_model(&self, _model: &ModelRef) {
        self.record("did_not_destroy_model");
    }

    fn failed_destroy_model(&self, reason: &ModelError) {
        self.record("failed_destroy_model");
        self.destroy_failures.borrow_mut().push(reason.clone());
    }
}

/// Form over a [`GatedModel`] with recording hooks and default settings
pub(crate) fn gated_form(
    forms: &Forms,
    log: &EventLog,
    name: &str,
    parent: Option<FormId>,
) -> (FormId, Rc<GatedModel>, Rc<RecordingHooks>) {
    gated_form_with(forms, log, name, parent, FormSettings::default())
}

pub(crate) fn gated_form_with(
    forms: &Forms,
    log: &EventLog,
    name: &str,
    parent: Option<FormId>,
    settings: FormSettings,
) -> (FormId, Rc<GatedModel>, Rc<RecordingHooks>) {
    let model = Rc::new(GatedModel::with_log(name, log));
    let hooks = Rc::new(RecordingHooks::new(name));
    let mut options = FormOptions::new(model.clone())
        .hooks(hooks.clone())
        .settings(settings);
    if let Some(parent) = parent {
        options = options.parent(parent);
    }
    let id = forms.create_form(options).unwrap();
    (id, model, hooks)
}
