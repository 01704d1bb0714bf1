//! Dirty tracking and value updates

use super::{FormId, Forms, SubmitFuture};
use crate::error::{FormError, FormResult};
use crate::model::Values;
use serde_json::Value;
use std::rc::Rc;

impl Forms {
    /// Mark a form dirty; a no-op once the form is gone
    pub fn mark_dirty(&self, id: FormId) {
        let Some((hooks, model)) = self.with_node_mut(id, |n| {
            n.is_model_dirty = true;
            (Rc::clone(&n.hooks), Rc::clone(&n.model))
        }) else {
            return;
        };
        tracing::debug!("Marked {id} dirty");
        hooks.on_marked_dirty(&model);
    }

    /// Mark a form clean; a no-op once the form is gone
    pub fn mark_clean(&self, id: FormId) {
        let Some((hooks, model)) = self.with_node_mut(id, |n| {
            n.is_model_dirty = false;
            (Rc::clone(&n.hooks), Rc::clone(&n.model))
        }) else {
            return;
        };
        tracing::debug!("Marked {id} clean");
        hooks.on_marked_clean(&model);
    }

    /// Schedule a recomputation of this form's dirtiness on the next turn
    ///
    /// Requests made while one is already pending coalesce into it. After
    /// recomputing, the form asks its parent to do the same, so the wave
    /// reaches the root one turn per level.
    pub fn recompute_dirtiness(&self, id: FormId) {
        let schedule = self
            .with_node_mut(id, |n| !std::mem::replace(&mut n.recompute_pending, true))
            .unwrap_or(false);
        if !schedule {
            return;
        }
        let forms = self.clone();
        self.inner
            .scheduler
            .schedule_deferred(move || forms.run_recompute(id));
    }

    fn run_recompute(&self, id: FormId) {
        let Some((fields, children, model, parent)) = self.with_node_mut(id, |n| {
            n.recompute_pending = false;
            (
                n.field_records(),
                n.children.clone(),
                Rc::clone(&n.model),
                n.parent,
            )
        }) else {
            tracing::trace!("Skipping recompute for removed {id}");
            return;
        };

        let clean_fields = fields.iter().all(|field| !field.is_really_dirty());
        let clean_forms = children.iter().all(|child| {
            !self
                .with_node(*child, |n| n.is_model_dirty)
                .unwrap_or(false)
        });
        let no_dirty_child_models = model.dirty_child_models() == 0;

        if clean_fields && clean_forms && no_dirty_child_models {
            self.mark_clean(id);
        } else {
            self.mark_dirty(id);
        }

        if let Some(parent) = parent {
            self.recompute_dirtiness(parent);
        }
    }

    /// Write a single value through the form
    pub fn update_value(
        &self,
        id: FormId,
        key: &str,
        value: Value,
    ) -> FormResult<Option<SubmitFuture>> {
        let mut values = Values::new();
        values.insert(key.to_string(), value);
        self.update_values(id, values)
    }

    /// Write values through the form
    ///
    /// Schedules dirty recomputation, re-runs validations on the next turn if
    /// the last submit was rejected by its guard, and submits when the form
    /// auto-submits (returning that submission).
    pub fn update_values(&self, id: FormId, values: Values) -> FormResult<Option<SubmitFuture>> {
        let (model, hooks, settings, failed) = self
            .with_node(id, |n| {
                (
                    Rc::clone(&n.model),
                    Rc::clone(&n.hooks),
                    Rc::clone(&n.settings),
                    n.has_failed_last_submit,
                )
            })
            .ok_or(FormError::UnknownForm(id))?;

        self.recompute_dirtiness(id);
        model.set_properties(&values);

        if failed {
            let forms = self.clone();
            self.inner.scheduler.schedule_deferred(move || {
                if let Ok(valid) = forms.run_validations(id, None) {
                    tracing::debug!("Revalidated {id} after rejected submit: valid={valid}");
                }
            });
        }

        hooks.on_update_values(&values);

        if settings.auto_submit {
            return Ok(Some(self.submit(id)));
        }
        Ok(None)
    }

    /// Write a single value without revalidation or auto-submit
    pub fn reset_value(&self, id: FormId, key: &str, value: Value) -> FormResult<()> {
        let mut values = Values::new();
        values.insert(key.to_string(), value);
        self.reset_values(id, values)
    }

    /// Write values without revalidation or auto-submit, then recompute dirtiness
    pub fn reset_values(&self, id: FormId, values: Values) -> FormResult<()> {
        let model = self.model(id).ok_or(FormError::UnknownForm(id))?;
        model.set_properties(&values);
        self.recompute_dirtiness(id);
        Ok(())
    }
}
