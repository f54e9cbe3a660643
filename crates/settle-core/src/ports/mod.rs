//! Ports - 抽象化レイヤー
//!
//! セルが依存する外部の仕組み（遅延実行キュー）を trait として定義します。
//! 実装は `impls` にあります。

pub mod scheduler;

pub use self::scheduler::{Job, RejectedJob, Scheduler};
