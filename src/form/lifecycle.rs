//! Reset, record destruction and form teardown
//!
//! Unlike submission, failures here are absorbed: the failure hook and the
//! error notification run, and the returned future resolves with an outcome.

use super::{FormId, Forms};
use crate::model::ModelRef;
use futures::future::{ready, LocalBoxFuture};
use futures::FutureExt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    Reset,
    /// The guard rejected the reset, or the form is gone
    NotReset,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyOutcome {
    Destroyed,
    /// The user declined the confirmation; reported through the success path
    Declined,
    /// The guard rejected the destroy, or the form is gone
    NotDestroyed,
    Failed,
}

impl Forms {
    /// Reset a form through its `on_reset` hook
    ///
    /// Starts immediately; the returned future only reports the outcome.
    pub fn reset(&self, id: FormId) -> LocalBoxFuture<'static, ResetOutcome> {
        let Some((model, hooks, settings, fields)) = self.with_node(id, |n| {
            (
                Rc::clone(&n.model),
                Rc::clone(&n.hooks),
                Rc::clone(&n.settings),
                n.field_records(),
            )
        }) else {
            return ready(ResetOutcome::NotReset).boxed_local();
        };

        if !hooks.will_reset(&model) {
            tracing::warn!("{id} did not reset");
            hooks.did_not_reset(&model);
            self.notify_error(&settings, settings.did_not_reset_message.as_deref());
            return ready(ResetOutcome::NotReset).boxed_local();
        }

        self.with_node_mut(id, |n| n.is_resetting = true);
        let forms = self.clone();
        let handle = self.inner.scheduler.spawn(async move {
            let outcome = match hooks.on_reset(Rc::clone(&model)).await {
                Ok(()) => {
                    forms.notify_success(&settings, settings.successful_reset_message.as_deref());
                    hooks.did_reset(&model);
                    for field in fields {
                        field.form_did_reset();
                    }
                    forms.mark_clean(id);
                    tracing::info!("{id} reset");
                    ResetOutcome::Reset
                }
                Err(reason) => {
                    tracing::warn!("{id} failed to reset: {reason}");
                    forms.notify_error(&settings, settings.failed_reset_message.as_deref());
                    hooks.failed_reset(&reason);
                    ResetOutcome::Failed
                }
            };
            forms.with_node_mut(id, |n| n.is_resetting = false);
            outcome
        });

        async move { handle.await.unwrap_or(ResetOutcome::Failed) }.boxed_local()
    }

    /// Confirm and destroy `model` through the injected destroy capability
    pub fn confirm_destroy(
        &self,
        id: FormId,
        model: ModelRef,
    ) -> LocalBoxFuture<'static, DestroyOutcome> {
        let Some((hooks, settings)) =
            self.with_node(id, |n| (Rc::clone(&n.hooks), Rc::clone(&n.settings)))
        else {
            return ready(DestroyOutcome::NotDestroyed).boxed_local();
        };

        if !hooks.will_destroy_model(&model) {
            tracing::debug!("{id} did not destroy its model");
            hooks.did_not_destroy_model(&model);
            return ready(DestroyOutcome::NotDestroyed).boxed_local();
        }

        self.with_node_mut(id, |n| n.is_destroying_record = true);
        let message = settings
            .confirm_destroy_message
            .clone()
            .unwrap_or_else(|| self.inner.config.confirm_destroy_message().to_string());
        let destroyer = Rc::clone(&self.inner.services.destroyer);
        let forms = self.clone();
        let handle = self.inner.scheduler.spawn(async move {
            let outcome = match destroyer.confirm_destroy(Rc::clone(&model), &message).await {
                Ok(destroyed) => {
                    forms.notify_success(&settings, settings.successful_destroy_message.as_deref());
                    hooks.did_destroy_model(&model);
                    if destroyed {
                        tracing::info!("{id} destroyed its model");
                        DestroyOutcome::Destroyed
                    } else {
                        tracing::debug!("{id} destroy declined");
                        DestroyOutcome::Declined
                    }
                }
                Err(reason) => {
                    tracing::warn!("{id} failed to destroy its model: {reason}");
                    forms.notify_error(&settings, settings.failed_destroy_message.as_deref());
                    hooks.failed_destroy_model(&reason);
                    DestroyOutcome::Failed
                }
            };
            // a torn-down form has no flag left to clear
            forms.with_node_mut(id, |n| n.is_destroying_record = false);
            outcome
        });

        async move { handle.await.unwrap_or(DestroyOutcome::Failed) }.boxed_local()
    }

    /// Tear down a form and its subtree, parent first
    ///
    /// A dirty form issues a best-effort reset before it deregisters from its
    /// parent and the registry. Deregistration calls aimed at a form that is
    /// itself tearing down are no-ops.
    pub fn destroy_form(&self, id: FormId) {
        let Some((parent, children)) = self.with_node_mut(id, |n| {
            n.is_tearing_down = true;
            (n.parent, n.children.clone())
        }) else {
            return;
        };

        if self.is_dirty(id) {
            tracing::debug!("{id} is dirty at teardown, resetting");
            drop(self.reset(id));
        }

        for child in children {
            self.destroy_form(child);
        }

        if let Some(parent) = parent {
            self.deregister_child_form(parent, id);
        }
        self.inner.registry.deregister(id);
        self.inner.arena.borrow_mut().remove(id);
        tracing::debug!("Destroyed {id}");
    }
}
