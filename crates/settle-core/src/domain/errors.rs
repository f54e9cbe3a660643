//! Errors - エラー型
//!
//! セル自体はエラーを外に出さない（初期化の失敗は Rejected 状態になる）。
//! ここにあるのは scheduler・設定・ロギングまわりのエラーだけ。

use std::path::PathBuf;

use thiserror::Error;

/// Scheduler がジョブを受け付けられない
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("scheduler is shut down")]
    Closed,
}

#[derive(Debug, Error)]
pub enum SettleError {
    #[error("no tokio runtime available: {0}")]
    NoTokioRuntime(String),

    #[error("invalid config: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to initialize logging: {0}")]
    Logging(String),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}
