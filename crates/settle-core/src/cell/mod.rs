//! Settlement cell: the eventual outcome of an asynchronous operation.
//!
//! A cell starts `Pending` and settles exactly once, either `Fulfilled(T)` or
//! `Rejected(E)`. Callers never block on it; they register observers instead.
//!
//! # Delivery rules
//! - observers are always run through the injected [`Scheduler`], never inside
//!   the registering or settling call
//! - within one settlement, success/failure observers run before terminal
//!   observers, each category in registration order
//! - an observer registered after settlement is still dispatched (as its own job);
//!   one registered for the other outcome can never fire and is dropped
//!
//! Observers and jobs that will never run are dropped only after the lock is
//! released, so their captures may read the cell from `Drop`.
//!
//! State transition and the three observer sequences share one lock, and the
//! settlement job is scheduled while that lock is held. Registration and
//! settlement are therefore each one critical section.

mod observers;
mod trigger;

use std::sync::Arc;

use parking_lot::Mutex;

use self::observers::{Observers, fulfillment_job, invoke, rejection_job};
use crate::domain::{CellStatus, SettleState, StateKind};
use crate::ports::{Job, Scheduler};

pub use self::trigger::{Fulfiller, Rejecter};

fn discard<D: Send + 'static>(value: D) -> Box<dyn Send> {
    Box::new(value)
}

struct Slot<T, E> {
    state: SettleState<T, E>,
    observers: Observers<T, E>,
}

struct Inner<T, E> {
    scheduler: Arc<dyn Scheduler>,
    slot: Mutex<Slot<T, E>>,
}

/// Handle on a settlement cell.
///
/// Cloning is cheap and every clone refers to the same cell.
pub struct SettleCell<T, E> {
    inner: Arc<Inner<T, E>>,
}

impl<T, E> Clone for SettleCell<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, E> SettleCell<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Create a cell and run `initializer` immediately.
    ///
    /// The initializer receives the two triggers for this cell. It may settle
    /// the cell right away or hand the triggers to something that settles it
    /// later. Returning `Err(e)` rejects the cell with `e`, unless the
    /// initializer already settled it. A panic in the initializer is not
    /// caught and propagates to the caller.
    ///
    /// # 使用例
    /// ```ignore
    /// let cell = SettleCell::new(scheduler, |fulfill, _reject| {
    ///     fulfill.fulfill(42);
    ///     Ok(())
    /// });
    /// cell.on_success(|v| println!("got {v}"))
    ///     .on_settle(|| println!("done"));
    /// ```
    pub fn new<F>(scheduler: Arc<dyn Scheduler>, initializer: F) -> Self
    where
        F: FnOnce(Fulfiller<T, E>, Rejecter<T, E>) -> Result<(), E>,
    {
        let cell = Self::pending(scheduler);
        let result = initializer(Fulfiller::new(cell.clone()), Rejecter::new(cell.clone()));
        if let Err(error) = result
            && cell.reject(error)
        {
            tracing::debug!("initializer failed; cell rejected");
        }
        cell
    }

    /// A pending cell plus its triggers, without an initializer.
    pub fn deferred(scheduler: Arc<dyn Scheduler>) -> (Self, Fulfiller<T, E>, Rejecter<T, E>) {
        let cell = Self::pending(scheduler);
        let fulfiller = Fulfiller::new(cell.clone());
        let rejecter = Rejecter::new(cell.clone());
        (cell, fulfiller, rejecter)
    }

    /// A cell that is already fulfilled with `value`.
    pub fn fulfilled(scheduler: Arc<dyn Scheduler>, value: T) -> Self {
        let cell = Self::pending(scheduler);
        cell.fulfill(value);
        cell
    }

    /// A cell that is already rejected with `error`.
    pub fn rejected(scheduler: Arc<dyn Scheduler>, error: E) -> Self {
        let cell = Self::pending(scheduler);
        cell.reject(error);
        cell
    }

    fn pending(scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            inner: Arc::new(Inner {
                scheduler,
                slot: Mutex::new(Slot {
                    state: SettleState::Pending,
                    observers: Observers::default(),
                }),
            }),
        }
    }

    /// Run `handler` with the value once the cell is fulfilled.
    ///
    /// Never fires on rejection: on an already rejected cell the handler is
    /// dropped right away. Returns this same cell so registrations can be
    /// written in sequence.
    pub fn on_success<F>(&self, handler: F) -> &Self
    where
        F: FnOnce(T) + Send + 'static,
    {
        let _discarded = self.locked(|slot| {
            if let SettleState::Fulfilled(value) = &slot.state {
                let value = value.clone();
                let job: Job = Box::new(move || invoke("on_success", move || handler(value)));
                return self.dispatch("on_success", job).map(discard);
            }
            if slot.state.is_rejected() {
                tracing::trace!("success observer discarded; cell rejected");
                return Some(discard(handler));
            }
            slot.observers.success.push(Box::new(handler));
            tracing::trace!(
                queued = slot.observers.success.len(),
                "success observer queued"
            );
            None
        });
        self
    }

    /// Run `handler` with the error once the cell is rejected.
    ///
    /// Never fires on fulfillment: on an already fulfilled cell the handler
    /// is dropped right away. Returns this same cell.
    pub fn on_failure<F>(&self, handler: F) -> &Self
    where
        F: FnOnce(E) + Send + 'static,
    {
        let _discarded = self.locked(|slot| {
            if let SettleState::Rejected(error) = &slot.state {
                let error = error.clone();
                let job: Job = Box::new(move || invoke("on_failure", move || handler(error)));
                return self.dispatch("on_failure", job).map(discard);
            }
            if slot.state.is_fulfilled() {
                tracing::trace!("failure observer discarded; cell fulfilled");
                return Some(discard(handler));
            }
            slot.observers.failure.push(Box::new(handler));
            tracing::trace!(
                queued = slot.observers.failure.len(),
                "failure observer queued"
            );
            None
        });
        self
    }

    /// Run `handler` once the cell settles, whichever way.
    ///
    /// Terminal observers run after the success/failure observers registered
    /// before settlement. Returns this same cell.
    pub fn on_settle<F>(&self, handler: F) -> &Self
    where
        F: FnOnce() + Send + 'static,
    {
        let _discarded = self.locked(|slot| {
            if slot.state.is_settled() {
                let job: Job = Box::new(move || invoke("on_settle", handler));
                return self.dispatch("on_settle", job);
            }
            slot.observers.terminal.push(Box::new(handler));
            tracing::trace!(
                queued = slot.observers.terminal.len(),
                "terminal observer queued"
            );
            None
        });
        self
    }

    pub(crate) fn fulfill(&self, value: T) -> bool {
        // failure observers and any refused job are dropped after the lock
        let outcome = self.locked(|slot| {
            if slot.state.is_settled() {
                tracing::trace!(state = %slot.state, "fulfill ignored; already settled");
                return Err(value);
            }

            slot.state = SettleState::Fulfilled(value.clone());
            let Observers {
                success,
                failure,
                terminal,
            } = std::mem::take(&mut slot.observers);
            tracing::debug!(
                success = success.len(),
                terminal = terminal.len(),
                "cell fulfilled"
            );
            let unsent = self.dispatch("fulfill", fulfillment_job(success, terminal, value));
            Ok((failure, unsent))
        });
        outcome.is_ok()
    }

    pub(crate) fn reject(&self, error: E) -> bool {
        // success observers and any refused job are dropped after the lock
        let outcome = self.locked(|slot| {
            if slot.state.is_settled() {
                tracing::trace!(state = %slot.state, "reject ignored; already settled");
                return Err(error);
            }

            slot.state = SettleState::Rejected(error.clone());
            let Observers {
                success,
                failure,
                terminal,
            } = std::mem::take(&mut slot.observers);
            tracing::debug!(
                failure = failure.len(),
                terminal = terminal.len(),
                "cell rejected"
            );
            let unsent = self.dispatch("reject", rejection_job(failure, terminal, error));
            Ok((success, unsent))
        });
        outcome.is_ok()
    }

    /// Run `f` under the cell lock and hand its result back after unlocking.
    ///
    /// Observers and jobs that will never run travel out through `R`, so their
    /// captures are dropped with the lock released and may touch this cell.
    fn locked<R>(&self, f: impl FnOnce(&mut Slot<T, E>) -> R) -> R {
        let mut slot = self.inner.slot.lock();
        f(&mut slot)
    }

    /// Hand `job` to the scheduler. A refused job is returned, not dropped.
    fn dispatch(&self, category: &'static str, job: Job) -> Option<Job> {
        match self.inner.scheduler.schedule(job) {
            Ok(()) => None,
            Err(rejected) => {
                tracing::warn!(category, error = %rejected, "notification dropped");
                Some(rejected.into_job())
            }
        }
    }

    pub fn kind(&self) -> StateKind {
        self.inner.slot.lock().state.kind()
    }

    pub fn is_settled(&self) -> bool {
        self.kind().is_terminal()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SettleState<T, E> {
        self.inner.slot.lock().state.clone()
    }

    pub fn value(&self) -> Option<T> {
        self.inner.slot.lock().state.value().cloned()
    }

    pub fn error(&self) -> Option<E> {
        self.inner.slot.lock().state.error().cloned()
    }

    pub fn status(&self) -> CellStatus {
        let slot = self.inner.slot.lock();
        CellStatus {
            state: slot.state.kind(),
            queued_success: slot.observers.success.len(),
            queued_failure: slot.observers.failure.len(),
            queued_terminal: slot.observers.terminal.len(),
        }
    }
}

impl<T, E> std::fmt::Debug for SettleCell<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettleCell")
            .field("state", &self.inner.slot.lock().state.kind())
            .finish_non_exhaustive()
    }
}
