//! Submission protocol
//!
//! A submit passes the `will_submit` guard, marks the form submitting, then
//! runs the persistence call as a local task. When queuing is enabled the
//! call is chained behind the previous submit of the same form, so at most
//! one persistence call per form is in flight. A root form, once its own call
//! resolves, submits its subtree level by level: every dirty, new or deleted
//! child at one depth concurrently, and the next depth only after that whole
//! batch has settled.

use super::{FormHooks, FormId, FormSettings, Forms, QueuedSubmitGuard};
use crate::error::{FormError, FormResult};
use crate::model::ModelRef;
use futures::future::{join_all, ready, LocalBoxFuture, Shared};
use futures::FutureExt;
use std::rc::Rc;

/// How a submit resolved when it did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted,
    /// The guard rejected the submit; nothing was persisted
    NotSubmitted,
}

/// A submit in flight; clones observe the same result
pub type SubmitFuture = Shared<LocalBoxFuture<'static, FormResult<SubmitOutcome>>>;

struct SubmitContext {
    model: ModelRef,
    hooks: Rc<dyn FormHooks>,
    settings: Rc<FormSettings>,
    previous: Option<SubmitFuture>,
}

fn resolved(result: FormResult<SubmitOutcome>) -> SubmitFuture {
    ready(result).boxed_local().shared()
}

impl Forms {
    /// Submit a form
    ///
    /// Guard rejection resolves with [`SubmitOutcome::NotSubmitted`].
    /// Persistence failures, including those of descendants submitted by a
    /// root form, resolve with an error after the failure hooks have run.
    pub fn submit(&self, id: FormId) -> SubmitFuture {
        let Some(ctx) = self.with_node(id, |n| SubmitContext {
            model: Rc::clone(&n.model),
            hooks: Rc::clone(&n.hooks),
            settings: Rc::clone(&n.settings),
            previous: n.pending_submit.as_ref().map(|(_, submit)| submit.clone()),
        }) else {
            return resolved(Err(FormError::UnknownForm(id)));
        };

        if !passes_submit_guard(&ctx) {
            self.with_node_mut(id, |n| n.has_failed_last_submit = true);
            tracing::warn!("{id} did not submit");
            ctx.hooks.did_not_submit(&ctx.model);
            self.notify_error(&ctx.settings, ctx.settings.did_not_submit_message.as_deref());
            return resolved(Ok(SubmitOutcome::NotSubmitted));
        }

        let seq = self
            .with_node_mut(id, |n| {
                n.submit_seq += 1;
                n.submit_seq
            })
            .unwrap_or_default();
        self.set_submitting(id, true);

        let previous = if ctx.settings.allow_submit_queue {
            ctx.previous.clone()
        } else {
            None
        };
        let forms = self.clone();
        let handle = self.inner.scheduler.spawn(async move {
            if let Some(previous) = previous {
                tracing::debug!("{id} waiting for queued submit");
                let _ = previous.await;
            }
            forms.run_submit(id, seq, ctx).await
        });

        let submit = async move {
            handle
                .await
                .unwrap_or_else(|e| Err(FormError::TaskAborted(e.to_string())))
        }
        .boxed_local()
        .shared();
        self.with_node_mut(id, |n| n.pending_submit = Some((seq, submit.clone())));
        submit
    }

    async fn run_submit(
        &self,
        id: FormId,
        seq: u64,
        ctx: SubmitContext,
    ) -> FormResult<SubmitOutcome> {
        tracing::debug!("Submitting {id}");
        let mut result = ctx
            .hooks
            .on_submit(Rc::clone(&ctx.model))
            .await
            .map_err(|source| FormError::Persistence { form: id, source });

        if result.is_ok() && self.is_root_form(id) {
            result = self.submit_child_forms(id).await;
        }

        match &result {
            Ok(()) => self.finish_submit(id, &ctx),
            Err(err) => self.fail_submit(id, &ctx, err),
        }

        self.set_submitting(id, false);
        self.with_node_mut(id, |n| {
            if n.pending_submit.as_ref().is_some_and(|(latest, _)| *latest == seq) {
                n.pending_submit = None;
            }
        });
        result.map(|()| SubmitOutcome::Submitted)
    }

    fn finish_submit(&self, id: FormId, ctx: &SubmitContext) {
        let fields = self
            .with_node_mut(id, |n| {
                n.has_failed_last_submit = false;
                n.field_records()
            })
            .unwrap_or_default();
        self.notify_success(&ctx.settings, ctx.settings.successful_submit_message.as_deref());
        ctx.hooks.did_submit(&ctx.model);
        for field in fields {
            field.form_did_submit();
        }
        self.mark_clean(id);
        for ancestor in self.ancestors(id) {
            if let Some(hooks) = self.hooks(ancestor) {
                hooks.child_did_submit(&ctx.model);
            }
        }
        tracing::info!("{id} submitted");
    }

    fn fail_submit(&self, id: FormId, ctx: &SubmitContext, err: &FormError) {
        tracing::warn!("{id} failed to submit: {err}");
        // the descendant that failed has already notified
        let from_descendant = matches!(err, FormError::Persistence { form, .. } if *form != id);
        if !from_descendant {
            self.notify_error(&ctx.settings, ctx.settings.failed_submit_message.as_deref());
        }
        ctx.hooks.failed_submit(err);
        for ancestor in self.ancestors(id) {
            if let Some(hooks) = self.hooks(ancestor) {
                hooks.child_failed_submit(&ctx.model);
            }
        }
    }

    /// Breadth-first submission of the subtree below `root`
    ///
    /// Children whose submit fails or is rejected are not descended into.
    /// The first failure is returned once no further level can be dispatched.
    async fn submit_child_forms(&self, root: FormId) -> FormResult<()> {
        let mut frontier = vec![root];
        let mut first_error = None;
        let mut depth = 0usize;

        loop {
            let batch: Vec<FormId> = frontier
                .iter()
                .flat_map(|parent| self.children_needing_submit(*parent))
                .collect();
            if batch.is_empty() {
                break;
            }
            tracing::debug!("Submitting {} child forms at depth {depth}", batch.len());

            let results = join_all(batch.iter().map(|child| self.submit(*child))).await;

            frontier.clear();
            for (child, result) in batch.into_iter().zip(results) {
                match result {
                    Ok(SubmitOutcome::Submitted) => frontier.push(child),
                    Ok(SubmitOutcome::NotSubmitted) => {}
                    Err(err) => {
                        first_error.get_or_insert(err);
                    }
                }
            }
            depth += 1;
        }

        first_error.map_or(Ok(()), Err)
    }

    fn children_needing_submit(&self, parent: FormId) -> Vec<FormId> {
        self.children(parent)
            .into_iter()
            .filter(|child| {
                self.with_node(*child, |n| {
                    n.is_dirty() || n.model.is_new() || n.model.is_deleted()
                })
                .unwrap_or(false)
            })
            .collect()
    }

    /// Count a submit of this form in or out
    ///
    /// The aggregate is recomputed upward only when the form starts or stops
    /// having submits in flight.
    fn set_submitting(&self, id: FormId, submitting: bool) {
        let changed = self
            .with_node_mut(id, |n| {
                let was = n.is_submitting();
                n.submits_in_flight = if submitting {
                    n.submits_in_flight + 1
                } else {
                    n.submits_in_flight.saturating_sub(1)
                };
                was != n.is_submitting()
            })
            .unwrap_or(false);
        if !changed {
            return;
        }
        tracing::debug!("{id} submitting={submitting}");
        for form in std::iter::once(id).chain(self.ancestors(id)) {
            if let Some(hooks) = self.hooks(form) {
                hooks.on_submitting_changed(self.is_submitting(form));
            }
        }
    }
}

/// `(!saving && will_submit) || allow_queue`, or with `SkipSavingCheck`,
/// `will_submit` alone for queued forms
fn passes_submit_guard(ctx: &SubmitContext) -> bool {
    let settings = &ctx.settings;
    let will_submit = || {
        ctx.hooks
            .will_submit(&ctx.model, settings.validation_options.as_ref())
    };
    match (settings.allow_submit_queue, settings.queued_submit_guard) {
        (true, QueuedSubmitGuard::SkipSavingCheck) => will_submit(),
        (queue, _) => (!ctx.model.is_saving() && will_submit()) || queue,
    }
}
