//! Runtime - scheduler と cell のワイヤリング
//!
//! 設定から scheduler を 1 つ作り、そこから作る cell はすべて同じ
//! scheduler を共有する。

use std::sync::Arc;

use super::config::{SchedulerKind, SettleConfig};
use crate::cell::{Fulfiller, Rejecter, SettleCell};
use crate::domain::SettleError;
use crate::impls::{MicrotaskQueue, TokioScheduler};
use crate::ports::Scheduler;

enum Backend {
    Microtask(MicrotaskQueue),
    Tokio(TokioScheduler),
}

/// SettleRuntime owns one scheduler and hands out cells wired to it.
///
/// # 使用例
/// ```ignore
/// let rt = SettleRuntime::microtask();
/// let cell = rt.fulfilled::<u32, String>(1);
/// cell.on_success(|v| println!("{v}"));
/// rt.run_until_idle();
/// ```
pub struct SettleRuntime {
    backend: Backend,
    scheduler: Arc<dyn Scheduler>,
}

impl SettleRuntime {
    /// Build the backend named in `config`.
    ///
    /// The tokio backend needs to be called from inside a tokio runtime.
    pub fn from_config(config: &SettleConfig) -> Result<Self, SettleError> {
        match config.scheduler {
            SchedulerKind::Microtask => Ok(Self::microtask()),
            SchedulerKind::Tokio => Self::tokio(),
        }
    }

    pub fn microtask() -> Self {
        let queue = MicrotaskQueue::new();
        Self {
            scheduler: Arc::new(queue.clone()),
            backend: Backend::Microtask(queue),
        }
    }

    pub fn tokio() -> Result<Self, SettleError> {
        let driver = TokioScheduler::spawn()?;
        Ok(Self {
            scheduler: Arc::new(driver.clone()),
            backend: Backend::Tokio(driver),
        })
    }

    pub fn kind(&self) -> SchedulerKind {
        match self.backend {
            Backend::Microtask(_) => SchedulerKind::Microtask,
            Backend::Tokio(_) => SchedulerKind::Tokio,
        }
    }

    pub fn scheduler(&self) -> Arc<dyn Scheduler> {
        Arc::clone(&self.scheduler)
    }

    pub fn cell<T, E, F>(&self, initializer: F) -> SettleCell<T, E>
    where
        T: Clone + Send + 'static,
        E: Clone + Send + 'static,
        F: FnOnce(Fulfiller<T, E>, Rejecter<T, E>) -> Result<(), E>,
    {
        SettleCell::new(self.scheduler(), initializer)
    }

    pub fn deferred<T, E>(&self) -> (SettleCell<T, E>, Fulfiller<T, E>, Rejecter<T, E>)
    where
        T: Clone + Send + 'static,
        E: Clone + Send + 'static,
    {
        SettleCell::deferred(self.scheduler())
    }

    pub fn fulfilled<T, E>(&self, value: T) -> SettleCell<T, E>
    where
        T: Clone + Send + 'static,
        E: Clone + Send + 'static,
    {
        SettleCell::fulfilled(self.scheduler(), value)
    }

    pub fn rejected<T, E>(&self, error: E) -> SettleCell<T, E>
    where
        T: Clone + Send + 'static,
        E: Clone + Send + 'static,
    {
        SettleCell::rejected(self.scheduler(), error)
    }

    /// Drain the microtask backend. The tokio backend drains itself, so this
    /// returns 0 there.
    pub fn run_until_idle(&self) -> usize {
        match &self.backend {
            Backend::Microtask(queue) => queue.run_until_idle(),
            Backend::Tokio(_) => 0,
        }
    }

    /// Stop the scheduler after running everything already queued.
    pub async fn shutdown(&self) {
        match &self.backend {
            Backend::Microtask(queue) => {
                queue.run_until_idle();
            }
            Backend::Tokio(driver) => driver.shutdown_and_join().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StateKind;
    use parking_lot::Mutex;
    use tokio::sync::oneshot;

    #[test]
    fn microtask_runtime_from_config() {
        let config = SettleConfig {
            scheduler: SchedulerKind::Microtask,
            ..SettleConfig::default()
        };
        let rt = SettleRuntime::from_config(&config).unwrap();
        assert_eq!(rt.kind(), SchedulerKind::Microtask);

        let seen = Arc::new(Mutex::new(None));
        let s = seen.clone();
        rt.fulfilled::<u32, String>(3)
            .on_success(move |v| *s.lock() = Some(v));
        assert!(seen.lock().is_none());

        assert_eq!(rt.run_until_idle(), 2);
        assert_eq!(*seen.lock(), Some(3));
    }

    #[test]
    fn tokio_runtime_needs_a_tokio_context() {
        let err = SettleRuntime::from_config(&SettleConfig::default())
            .err()
            .expect("outside tokio");
        assert!(matches!(err, SettleError::NoTokioRuntime(_)));
    }

    #[tokio::test]
    async fn tokio_runtime_delivers_through_driver() {
        let rt = SettleRuntime::from_config(&SettleConfig::default()).unwrap();
        assert_eq!(rt.kind(), SchedulerKind::Tokio);

        let (tx, rx) = oneshot::channel();
        let cell = rt.cell::<String, String, _>(|_fulfill, reject| {
            reject.reject("nope".to_string());
            Ok(())
        });
        cell.on_failure(move |e| {
            let _ = tx.send(e);
        });

        assert_eq!(rx.await.unwrap(), "nope");
        assert_eq!(cell.kind(), StateKind::Rejected);
        assert_eq!(rt.run_until_idle(), 0);
        rt.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_drains_pending_notifications() {
        let rt = SettleRuntime::tokio().unwrap();
        let (cell, fulfill, _reject) = rt.deferred::<u8, ()>();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        cell.on_success(move |v| s.lock().push(v));
        fulfill.fulfill(1);

        rt.shutdown().await;
        assert_eq!(*seen.lock(), vec![1]);

        // after shutdown the notification is dropped, the outcome is not
        let late = rt.rejected::<u8, ()>(());
        assert_eq!(late.kind(), StateKind::Rejected);
    }
}
