//! Observer sequences held by a pending cell.

use std::panic::{self, AssertUnwindSafe};

use crate::impls::panic_message;
use crate::ports::Job;

pub(crate) type SuccessObserver<T> = Box<dyn FnOnce(T) + Send + 'static>;
pub(crate) type FailureObserver<E> = Box<dyn FnOnce(E) + Send + 'static>;
pub(crate) type TerminalObserver = Box<dyn FnOnce() + Send + 'static>;

/// Observers waiting for settlement, in registration order.
pub(crate) struct Observers<T, E> {
    pub(crate) success: Vec<SuccessObserver<T>>,
    pub(crate) failure: Vec<FailureObserver<E>>,
    pub(crate) terminal: Vec<TerminalObserver>,
}

impl<T, E> Default for Observers<T, E> {
    fn default() -> Self {
        Self {
            success: Vec::new(),
            failure: Vec::new(),
            terminal: Vec::new(),
        }
    }
}

/// One job: success observers in order, then terminal observers.
pub(crate) fn fulfillment_job<T>(
    success: Vec<SuccessObserver<T>>,
    terminal: Vec<TerminalObserver>,
    value: T,
) -> Job
where
    T: Clone + Send + 'static,
{
    Box::new(move || {
        for observer in success {
            let value = value.clone();
            invoke("on_success", move || observer(value));
        }
        run_terminal(terminal);
    })
}

/// One job: failure observers in order, then terminal observers.
pub(crate) fn rejection_job<E>(
    failure: Vec<FailureObserver<E>>,
    terminal: Vec<TerminalObserver>,
    error: E,
) -> Job
where
    E: Clone + Send + 'static,
{
    Box::new(move || {
        for observer in failure {
            let error = error.clone();
            invoke("on_failure", move || observer(error));
        }
        run_terminal(terminal);
    })
}

fn run_terminal(terminal: Vec<TerminalObserver>) {
    for observer in terminal {
        invoke("on_settle", observer);
    }
}

/// Call one observer. A panic is logged and swallowed so the rest of the
/// settlement still gets delivered.
pub(crate) fn invoke(category: &'static str, observer: impl FnOnce()) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(observer)) {
        tracing::error!(
            category,
            panic = %panic_message(payload.as_ref()),
            "observer panicked"
        );
    }
}
