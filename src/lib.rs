//! form-for - nested form state coordination
//!
//! Forms edit models, nest into trees, track whether they hold unsaved
//! changes, and submit root-first then breadth-first through their subtree.
//! A process-wide registry answers whether navigation away from dirty forms
//! should be prevented.
//!
//! Everything runs on a single thread inside a `tokio::task::LocalSet`.

pub mod config;
pub mod error;
pub mod form;
pub mod model;
pub mod registry;
pub mod scheduler;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;

pub use config::FormForConfig;
pub use error::{FormError, FormResult, ModelError};
pub use form::{
    DefaultHooks, DestroyOutcome, FieldKey, FieldRecord, FormHooks, FormId, FormOptions,
    FormSettings, Forms, QueuedSubmitGuard, ResetOutcome, SubmitFuture, SubmitOutcome,
    TrackedField, WeakForms,
};
pub use model::{MemoryModel, Model, ModelRef, Values};
pub use registry::FormRegistry;
pub use scheduler::Scheduler;
pub use services::{
    ConfirmThenDestroy, ConfirmationSink, DestroyConfirmer, FixedConfirmation, LogNotifier,
    NavigationGuard, NavigationGuardPort, NotificationSink, Services, Transition,
};
