//! TokioScheduler - tokio の driver task で回す遅延実行キュー
//!
//! # 学習ポイント
//! - unbounded mpsc で FIFO を保つ（`tokio::spawn` をジョブごとに呼ぶと順序が保証されない）
//! - watch channel で shutdown を伝える
//! - shutdown 後も、すでに積まれたジョブは drain してから driver を終える

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::run_job;
use crate::domain::{SchedulerError, SettleError};
use crate::ports::{Job, RejectedJob, Scheduler};

struct Inner {
    tx: mpsc::UnboundedSender<Job>,
    closed: AtomicBool,
    shutdown_tx: watch::Sender<bool>,
    join: Mutex<Option<JoinHandle<()>>>,
}

/// TokioScheduler は driver task 1 本でジョブを順番に実行する
///
/// - `schedule` は channel に積むだけなので、呼び出し中にジョブが走ることはない
/// - current_thread runtime では「登録したコードの続き」が必ず先に走る
/// - multi_thread runtime でも順序（FIFO）は保たれる
/// - driver は普通の tokio task なので、同じ runtime の timer や I/O の
///   task より先に走る保証はない（microtask のような優先度はない）
///
/// Clone したハンドルは同じ driver を共有する。全ハンドルが drop されると
/// driver は残りのジョブを実行して終了する。
#[derive(Clone)]
pub struct TokioScheduler {
    inner: Arc<Inner>,
}

impl TokioScheduler {
    /// Spawn the driver on the ambient tokio runtime.
    pub fn spawn() -> Result<Self, SettleError> {
        let handle =
            Handle::try_current().map_err(|e| SettleError::NoTokioRuntime(e.to_string()))?;
        Ok(Self::spawn_on(&handle))
    }

    /// Spawn the driver on a specific runtime.
    pub fn spawn_on(handle: &Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let join = handle.spawn(drive(rx, shutdown_rx));

        Self {
            inner: Arc::new(Inner {
                tx,
                closed: AtomicBool::new(false),
                shutdown_tx,
                join: Mutex::new(Some(join)),
            }),
        }
    }

    /// Stop accepting new jobs. Jobs already queued still run.
    pub fn request_shutdown(&self) {
        self.inner.closed.store(true, Ordering::Release);
        // ignore send error: the driver may already be gone
        let _ = self.inner.shutdown_tx.send(true);
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Shutdown and wait for the driver to drain.
    ///
    /// Only the first caller actually waits; later calls return immediately.
    pub async fn shutdown_and_join(&self) {
        self.request_shutdown();
        let join = self.inner.join.lock().take();
        if let Some(join) = join
            && let Err(e) = join.await
        {
            tracing::warn!(error = %e, "scheduler driver ended abnormally");
        }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, job: Job) -> Result<(), RejectedJob> {
        if self.is_closed() {
            return Err(RejectedJob::new(SchedulerError::Closed, job));
        }
        self.inner
            .tx
            .send(job)
            .map_err(|e| RejectedJob::new(SchedulerError::Closed, e.0))
    }
}

async fn drive(mut rx: mpsc::UnboundedReceiver<Job>, mut shutdown_rx: watch::Receiver<bool>) {
    tracing::debug!("scheduler driver started");
    loop {
        tokio::select! {
            biased;
            job = rx.recv() => match job {
                Some(job) => run_job(job),
                // every handle dropped
                None => break,
            },
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }

    rx.close();
    let mut drained = 0usize;
    while let Ok(job) = rx.try_recv() {
        run_job(job);
        drained += 1;
    }
    tracing::debug!(drained, "scheduler driver stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_outside_runtime_fails() {
        let err = TokioScheduler::spawn().err().expect("no runtime here");
        assert!(matches!(err, SettleError::NoTokioRuntime(_)));
    }

    #[tokio::test]
    async fn schedule_never_runs_inline() {
        let scheduler = TokioScheduler::spawn().unwrap();
        let ran = Arc::new(AtomicBool::new(false));

        let flag = ran.clone();
        scheduler
            .schedule(Box::new(move || flag.store(true, Ordering::SeqCst)))
            .unwrap();
        assert!(!ran.load(Ordering::SeqCst));

        scheduler.shutdown_and_join().await;
        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn jobs_run_in_fifo_order() {
        let scheduler = TokioScheduler::spawn().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        for i in 0..5 {
            let tx = tx.clone();
            scheduler
                .schedule(Box::new(move || {
                    let _ = tx.send(i);
                }))
                .unwrap();
        }
        drop(tx);

        let mut seen = Vec::new();
        while let Some(i) = rx.recv().await {
            seen.push(i);
        }
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn fifo_holds_on_multi_thread_runtime() {
        let scheduler = TokioScheduler::spawn().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for i in 0..100 {
            let seen = seen.clone();
            scheduler
                .schedule(Box::new(move || seen.lock().push(i)))
                .unwrap();
        }
        scheduler.shutdown_and_join().await;

        assert_eq!(*seen.lock(), (0..100).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn shutdown_rejects_new_jobs() {
        let scheduler = TokioScheduler::spawn().unwrap();
        scheduler.shutdown_and_join().await;

        assert!(scheduler.is_closed());
        let err = scheduler.schedule(Box::new(|| {})).unwrap_err();
        assert_eq!(err.reason(), &SchedulerError::Closed);

        // second call is a no-op
        scheduler.shutdown_and_join().await;
    }

    #[tokio::test]
    async fn panicking_job_keeps_driver_alive() {
        let scheduler = TokioScheduler::spawn().unwrap();
        let ran = Arc::new(AtomicBool::new(false));

        scheduler.schedule(Box::new(|| panic!("boom"))).unwrap();
        let flag = ran.clone();
        scheduler
            .schedule(Box::new(move || flag.store(true, Ordering::SeqCst)))
            .unwrap();

        scheduler.shutdown_and_join().await;
        assert!(ran.load(Ordering::SeqCst));
    }
}
