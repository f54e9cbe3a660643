//! App - アプリケーション層
//!
//! # 主要コンポーネント
//! - **SettleConfig**: 実行時設定（scheduler の種類、ログ形式）
//! - **SettleRuntime**: scheduler を 1 つ持ち、そこに繋がった cell を作る

pub mod config;
pub mod runtime;

pub use self::config::{SchedulerKind, SettleConfig};
pub use self::runtime::SettleRuntime;
