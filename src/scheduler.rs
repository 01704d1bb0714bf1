//! Cooperative single-threaded scheduling
//!
//! Every deferred unit and every in-flight form operation runs as a local task
//! on the current `tokio::task::LocalSet`. Units run to completion; the only
//! suspension points are persistence calls and the one-turn deferral.

use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;
use tokio::task::JoinHandle;

/// Counts outstanding work so callers can wait for the tree to settle
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    in_flight: Rc<Cell<usize>>,
}

/// Decrements the in-flight counter when the owning task finishes or is dropped
struct InFlight(Rc<Cell<usize>>);

impl InFlight {
    fn enter(counter: &Rc<Cell<usize>>) -> Self {
        counter.set(counter.get() + 1);
        Self(Rc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` on the next scheduling turn
    ///
    /// Must be called from within a `LocalSet`.
    pub fn schedule_deferred<F>(&self, f: F)
    where
        F: FnOnce() + 'static,
    {
        let guard = InFlight::enter(&self.in_flight);
        tokio::task::spawn_local(async move {
            let _guard = guard;
            tokio::task::yield_now().await;
            f();
        });
    }

    /// Start `fut` eagerly as a local task tracked by [`Scheduler::settle`]
    pub fn spawn<F>(&self, fut: F) -> JoinHandle<F::Output>
    where
        F: Future + 'static,
        F::Output: 'static,
    {
        let guard = InFlight::enter(&self.in_flight);
        tokio::task::spawn_local(async move {
            let _guard = guard;
            fut.await
        })
    }

    /// Number of deferred units and operations not yet finished
    pub fn in_flight(&self) -> usize {
        self.in_flight.get()
    }

    /// Yield until no deferred or spawned work remains
    ///
    /// Never returns while an operation is parked on a persistence call that
    /// nothing will complete.
    pub async fn settle(&self) {
        while self.in_flight.get() > 0 {
            tokio::task::yield_now().await;
        }
    }
}
