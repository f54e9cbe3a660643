//! settle-core
//!
//! A settlement cell: a one-shot container for the eventual outcome of an
//! asynchronous operation, observed through callbacks instead of blocking reads.
//!
//! # モジュール構成
//! - **domain**: 状態（SettleState / StateKind）、ステータス、エラー
//! - **ports**: Scheduler trait（遅延実行の抽象化）
//! - **impls**: MicrotaskQueue（決定的）、TokioScheduler（本番用）
//! - **cell**: SettleCell と settle trigger
//! - **app**: 設定と SettleRuntime
//! - **observability**: tracing subscriber の初期化

pub mod app;
pub mod cell;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;

pub use app::{SchedulerKind, SettleConfig, SettleRuntime};
pub use cell::{Fulfiller, Rejecter, SettleCell};
pub use domain::{CellStatus, SchedulerError, SettleError, SettleState, StateKind};
pub use impls::{MicrotaskQueue, TokioScheduler};
pub use observability::{LogFormat, init_logging};
pub use ports::{Job, RejectedJob, Scheduler};
