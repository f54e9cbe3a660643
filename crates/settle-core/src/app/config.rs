//! Config - 実行時設定
//!
//! JSON で書く。すべてのフィールドは省略可能で、省略時はデフォルト値。
//!
//! ```json
//! { "scheduler": "microtask", "log_format": "json" }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::SettleError;
use crate::observability::LogFormat;

/// Which scheduler backs the cells handed out by a runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerKind {
    /// Caller-driven queue (`run_until_idle`).
    Microtask,
    /// Driver task on the ambient tokio runtime.
    #[default]
    Tokio,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettleConfig {
    pub scheduler: SchedulerKind,
    pub log_format: LogFormat,
}

impl SettleConfig {
    pub fn from_json_str(s: &str) -> Result<Self, SettleError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SettleError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| SettleError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }
}
