//! Impls - Scheduler の実装
//!
//! # 含まれる実装
//! - **MicrotaskQueue**: 呼び出し側が回す決定的な FIFO（テスト・組み込み用）
//! - **TokioScheduler**: tokio の driver task が回す FIFO（本番用）
//!
//! どちらもジョブ単位で panic を捕まえるので、1 つの壊れたジョブで
//! キュー全体が止まることはない。

pub mod microtask;
pub mod tokio_driver;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::ports::Job;

pub use self::microtask::MicrotaskQueue;
pub use self::tokio_driver::TokioScheduler;

/// Run one job, logging instead of unwinding into the caller.
pub(crate) fn run_job(job: Job) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
        tracing::error!(panic = %panic_message(payload.as_ref()), "deferred job panicked");
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
