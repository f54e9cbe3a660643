//! Scheduler port - 遅延実行の抽象化
//!
//! セルは observer を「後のターン」で呼ぶために Scheduler を使う。
//! グローバルなキューではなく trait として注入するので、テストでは
//! MicrotaskQueue を使って手動でキューを回せる。
//!
//! # 実装
//! - **MicrotaskQueue**: 呼び出し側が回す FIFO（テスト・決定的実行用）
//! - **TokioScheduler**: tokio の driver task が回す FIFO（本番用）

use thiserror::Error;

use crate::domain::SchedulerError;

/// One unit of deferred work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Scheduler は zero-argument のジョブを後のターンに回す
///
/// # Contract
/// - `schedule` の中でジョブを実行してはいけない（セルはロックを握ったまま呼ぶ）
/// - ジョブは受け付けた順（FIFO）に実行する
/// - 受け付けられない場合はジョブを `RejectedJob` に入れて返す。
///   scheduler の中で drop しない（drop のタイミングは呼び出し側が決める）
///
/// # Thread Safety
/// - `Send + Sync` を要求（セルは複数スレッドから触れる）
pub trait Scheduler: Send + Sync {
    fn schedule(&self, job: Job) -> Result<(), RejectedJob>;
}

/// A job the scheduler refused, handed back to the caller.
#[derive(Error)]
#[error("{reason}")]
pub struct RejectedJob {
    reason: SchedulerError,
    job: Job,
}

impl RejectedJob {
    pub fn new(reason: SchedulerError, job: Job) -> Self {
        Self { reason, job }
    }

    pub fn reason(&self) -> &SchedulerError {
        &self.reason
    }

    pub fn into_job(self) -> Job {
        self.job
    }
}

impl std::fmt::Debug for RejectedJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RejectedJob")
            .field("reason", &self.reason)
            .finish_non_exhaustive()
    }
}
