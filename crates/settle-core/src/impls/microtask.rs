//! MicrotaskQueue - 呼び出し側が回す遅延実行キュー
//!
//! # 学習ポイント
//! - Mutex はジョブ実行中に保持しない（ジョブが新しいジョブを積めるように）
//! - Clone したハンドルは同じキューを共有する

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use super::run_job;
use crate::ports::{Job, RejectedJob, Scheduler};

#[derive(Default)]
struct QueueState {
    jobs: VecDeque<Job>,
    total_enqueued: u64,
}

/// MicrotaskQueue は決定的な FIFO scheduler
///
/// `schedule` は積むだけで、実行は `run_one` / `run_until_idle` を呼んだ
/// ときにだけ起きる。テストで「登録直後はまだ呼ばれていない」を確認する
/// のに使う。
///
/// # 使用例
/// ```ignore
/// let queue = MicrotaskQueue::new();
/// let cell = SettleCell::fulfilled(Arc::new(queue.clone()), 5);
/// cell.on_success(|v| println!("{v}"));
/// queue.run_until_idle();
/// ```
#[derive(Clone, Default)]
pub struct MicrotaskQueue {
    state: Arc<Mutex<QueueState>>,
}

impl MicrotaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the oldest queued job. Returns `false` when the queue was empty.
    pub fn run_one(&self) -> bool {
        let job = self.state.lock().jobs.pop_front();
        match job {
            Some(job) => {
                run_job(job);
                true
            }
            None => false,
        }
    }

    /// Drain the queue, including jobs scheduled by the jobs being run.
    ///
    /// Returns the number of jobs executed.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while self.run_one() {
            ran += 1;
        }
        if ran > 0 {
            tracing::trace!(ran, "microtask queue drained");
        }
        ran
    }

    pub fn pending_count(&self) -> usize {
        self.state.lock().jobs.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending_count() == 0
    }

    /// Total number of jobs ever accepted.
    pub fn total_enqueued(&self) -> u64 {
        self.state.lock().total_enqueued
    }
}

impl Scheduler for MicrotaskQueue {
    fn schedule(&self, job: Job) -> Result<(), RejectedJob> {
        let mut state = self.state.lock();
        state.jobs.push_back(job);
        state.total_enqueued += 1;
        Ok(())
    }
}
