//! Nested form coordination
//!
//! [`Forms`] owns every form record in an arena and implements the lifecycle
//! protocols on top of it:
//!
//! - dirty tracking with deferred, upward recomputation (`dirty.rs`)
//! - breadth-first, parent-before-child submission (`submit.rs`)
//! - reset, record destruction and teardown (`lifecycle.rs`)
//!
//! All operations are single-threaded and must run inside a
//! `tokio::task::LocalSet`.

mod arena;
mod dirty;
mod field;
mod hooks;
mod lifecycle;
mod node;
mod settings;
mod submit;

use crate::config::FormForConfig;
use crate::error::{FormError, FormResult};
use crate::model::ModelRef;
use crate::registry::FormRegistry;
use crate::scheduler::Scheduler;
use crate::services::{NavigationGuard, NavigationGuardPort, Services};
use arena::FormArena;
use node::FormNode;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

pub use arena::FormId;
pub use field::{FieldKey, FieldRecord, TrackedField};
pub use hooks::{DefaultHooks, FormHooks};
pub use lifecycle::{DestroyOutcome, ResetOutcome};
pub use settings::{dasherize, FormSettings, QueuedSubmitGuard};
pub use submit::{SubmitFuture, SubmitOutcome};

/// Options for creating a form
pub struct FormOptions {
    model: ModelRef,
    parent: Option<FormId>,
    hooks: Rc<dyn FormHooks>,
    settings: Option<FormSettings>,
}

impl FormOptions {
    pub fn new(model: ModelRef) -> Self {
        Self {
            model,
            parent: None,
            hooks: Rc::new(DefaultHooks),
            settings: None,
        }
    }

    pub fn parent(mut self, parent: FormId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn hooks(mut self, hooks: Rc<dyn FormHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Replace the configured defaults for this form
    pub fn settings(mut self, settings: FormSettings) -> Self {
        self.settings = Some(settings);
        self
    }
}

pub(crate) struct FormsInner {
    arena: RefCell<FormArena>,
    registry: FormRegistry,
    scheduler: Scheduler,
    services: Services,
    config: FormForConfig,
    navigation: RefCell<Option<Rc<dyn NavigationGuardPort>>>,
    next_field: Cell<u64>,
}

/// Handle to the form engine; cheap to clone
#[derive(Clone)]
pub struct Forms {
    inner: Rc<FormsInner>,
}

/// Non-owning handle, held by long-lived host hooks
#[derive(Clone)]
pub struct WeakForms(Weak<FormsInner>);

impl WeakForms {
    pub fn upgrade(&self) -> Option<Forms> {
        self.0.upgrade().map(|inner| Forms { inner })
    }
}

impl Forms {
    pub fn new(config: FormForConfig, services: Services) -> Self {
        Self {
            inner: Rc::new(FormsInner {
                arena: RefCell::new(FormArena::default()),
                registry: FormRegistry::new(),
                scheduler: Scheduler::new(),
                services,
                config,
                navigation: RefCell::new(None),
                next_field: Cell::new(0),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakForms {
        WeakForms(Rc::downgrade(&self.inner))
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.inner.scheduler
    }

    pub fn registry(&self) -> &FormRegistry {
        &self.inner.registry
    }

    pub fn config(&self) -> &FormForConfig {
        &self.inner.config
    }

    /// Wait until every deferred recomputation and in-flight operation is done
    pub async fn settle(&self) {
        self.inner.scheduler.settle().await;
    }

    /// Create a form, registering it with the registry and its parent
    pub fn create_form(&self, options: FormOptions) -> FormResult<FormId> {
        if let Some(parent) = options.parent {
            if !self.contains(parent) {
                return Err(FormError::UnknownForm(parent));
            }
        }
        let settings = options
            .settings
            .unwrap_or_else(|| self.inner.config.form_defaults());
        let node = FormNode::new(options.model, None, options.hooks, Rc::new(settings));
        let id = self.inner.arena.borrow_mut().insert(node);

        self.inner.registry.register(id);
        if let Some(parent) = options.parent {
            self.register_child_form(parent, id)?;
        }
        tracing::debug!("Created {id} ({})", self.model_name(id));
        Ok(id)
    }

    /// Attach `child` to `parent`, detaching it from any previous parent
    pub fn register_child_form(&self, parent: FormId, child: FormId) -> FormResult<()> {
        if !self.contains(parent) {
            return Err(FormError::UnknownForm(parent));
        }
        let previous = self
            .with_node_mut(child, |n| n.parent.replace(parent))
            .ok_or(FormError::UnknownForm(child))?;
        if let Some(previous) = previous.filter(|p| *p != parent) {
            self.with_node_mut(previous, |n| n.children.retain(|c| *c != child));
            self.recompute_dirtiness(previous);
        }
        self.with_node_mut(parent, |n| {
            if !n.children.contains(&child) {
                n.children.push(child);
            }
        });
        Ok(())
    }

    /// Detach `child` from `parent` and recompute the parent's dirtiness
    ///
    /// A no-op when `child` is not a member or `parent` is being torn down.
    pub fn deregister_child_form(&self, parent: FormId, child: FormId) {
        let removed = self
            .with_node_mut(parent, |n| {
                if n.is_tearing_down {
                    return false;
                }
                let before = n.children.len();
                n.children.retain(|c| *c != child);
                n.children.len() != before
            })
            .unwrap_or(false);
        if removed {
            self.with_node_mut(child, |n| {
                if n.parent == Some(parent) {
                    n.parent = None;
                }
            });
            self.recompute_dirtiness(parent);
        }
    }

    /// Register a field with a form
    pub fn register_field(&self, id: FormId, field: Rc<dyn FieldRecord>) -> FormResult<FieldKey> {
        let key = FieldKey(self.inner.next_field.get());
        self.with_node_mut(id, |n| n.fields.push((key, field)))
            .ok_or(FormError::UnknownForm(id))?;
        self.inner.next_field.set(key.0 + 1);
        Ok(key)
    }

    /// Remove a field; a no-op for non-members and during teardown
    pub fn deregister_field(&self, id: FormId, key: FieldKey) {
        let removed = self
            .with_node_mut(id, |n| {
                if n.is_tearing_down {
                    return false;
                }
                let before = n.fields.len();
                n.fields.retain(|(k, _)| *k != key);
                n.fields.len() != before
            })
            .unwrap_or(false);
        if removed {
            self.recompute_dirtiness(id);
        }
    }

    pub fn contains(&self, id: FormId) -> bool {
        self.inner.arena.borrow().contains(id)
    }

    pub fn len(&self) -> usize {
        self.inner.arena.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn model(&self, id: FormId) -> Option<ModelRef> {
        self.with_node(id, |n| Rc::clone(&n.model))
    }

    pub fn parent(&self, id: FormId) -> Option<FormId> {
        self.with_node(id, |n| n.parent).flatten()
    }

    pub fn children(&self, id: FormId) -> Vec<FormId> {
        self.with_node(id, |n| n.children.clone()).unwrap_or_default()
    }

    pub fn field_count(&self, id: FormId) -> usize {
        self.with_node(id, |n| n.fields.len()).unwrap_or(0)
    }

    pub fn settings(&self, id: FormId) -> Option<Rc<FormSettings>> {
        self.with_node(id, |n| Rc::clone(&n.settings))
    }

    pub fn is_dirty(&self, id: FormId) -> bool {
        self.with_node(id, FormNode::is_dirty).unwrap_or(false)
    }

    /// True while this form or any descendant is submitting
    pub fn is_submitting(&self, id: FormId) -> bool {
        let Some((own, children)) = self.with_node(id, |n| (n.is_submitting(), n.children.clone()))
        else {
            return false;
        };
        own || children.into_iter().any(|child| self.is_submitting(child))
    }

    pub fn is_root_form(&self, id: FormId) -> bool {
        self.with_node(id, |n| n.parent.is_none()).unwrap_or(false)
    }

    pub fn is_resetting(&self, id: FormId) -> bool {
        self.with_node(id, |n| n.is_resetting).unwrap_or(false)
    }

    pub fn is_destroying_record(&self, id: FormId) -> bool {
        self.with_node(id, |n| n.is_destroying_record).unwrap_or(false)
    }

    pub fn has_failed_last_submit(&self, id: FormId) -> bool {
        self.with_node(id, |n| n.has_failed_last_submit).unwrap_or(false)
    }

    /// Dasherized model name: explicit setting, the model's own name, or "object"
    pub fn model_name(&self, id: FormId) -> String {
        let name = self
            .with_node(id, |n| {
                n.settings
                    .model_name
                    .clone()
                    .or_else(|| n.model.model_name())
            })
            .flatten();
        dasherize(name.as_deref().unwrap_or("object"))
    }

    /// Run model validations with `options`, or the form's configured options
    pub fn run_validations(&self, id: FormId, options: Option<&Value>) -> FormResult<bool> {
        let (model, settings) = self
            .with_node(id, |n| (Rc::clone(&n.model), Rc::clone(&n.settings)))
            .ok_or(FormError::UnknownForm(id))?;
        Ok(model.validate(options.or(settings.validation_options.as_ref())))
    }

    pub fn clear_validations(&self, id: FormId) -> FormResult<()> {
        let model = self.model(id).ok_or(FormError::UnknownForm(id))?;
        model.clear_validations();
        Ok(())
    }

    /// True iff any registered form is dirty and configured to prevent navigation
    pub fn should_prevent_navigation(&self) -> bool {
        self.inner.registry.should_prevent_navigation(|id| {
            self.with_node(id, |n| n.is_dirty() && n.settings.prevents_navigation)
                .unwrap_or(false)
        })
    }

    /// Hand a navigation guard to the host; allowed once per engine
    pub fn install_navigation_guard(&self, port: Rc<dyn NavigationGuardPort>) -> FormResult<()> {
        let mut installed = self.inner.navigation.borrow_mut();
        if installed.is_some() {
            return Err(FormError::NavigationGuardInstalled);
        }
        let guard = NavigationGuard::new(
            self.downgrade(),
            Rc::clone(&self.inner.services.confirmer),
            self.inner.config.navigation_message().to_string(),
        );
        port.install(guard);
        *installed = Some(port);
        tracing::debug!("Navigation guard installed");
        Ok(())
    }

    /// Uninstall the navigation guard, if any
    pub fn shutdown(&self) {
        let port = self.inner.navigation.borrow_mut().take();
        if let Some(port) = port {
            port.uninstall();
            tracing::debug!("Navigation guard uninstalled");
        }
    }

    fn with_node<R>(&self, id: FormId, f: impl FnOnce(&FormNode) -> R) -> Option<R> {
        self.inner.arena.borrow().get(id).map(f)
    }

    fn with_node_mut<R>(&self, id: FormId, f: impl FnOnce(&mut FormNode) -> R) -> Option<R> {
        self.inner.arena.borrow_mut().get_mut(id).map(f)
    }

    /// Ancestors of `id`, nearest first
    fn ancestors(&self, id: FormId) -> Vec<FormId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(ancestor) = current {
            out.push(ancestor);
            current = self.parent(ancestor);
        }
        out
    }

    fn hooks(&self, id: FormId) -> Option<Rc<dyn FormHooks>> {
        self.with_node(id, |n| Rc::clone(&n.hooks))
    }

    fn notify_success(&self, settings: &FormSettings, message: Option<&str>) {
        if let Some(message) = message.filter(|m| !m.is_empty()) {
            if settings.notify_of_success {
                self.inner.services.notifier.notify_success(message);
            }
        }
    }

    fn notify_error(&self, settings: &FormSettings, message: Option<&str>) {
        if let Some(message) = message.filter(|m| !m.is_empty()) {
            if settings.notify_of_error {
                self.inner.services.notifier.notify_error(message);
            }
        }
    }
}
