//! Logging setup.
//!
//! The library itself only emits `tracing` events. Binaries call
//! [`init_logging`] once to install a subscriber; the level comes from
//! `RUST_LOG` (default `info`).

use serde::{Deserialize, Serialize};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::domain::SettleError;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format with colors
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
    Compact,
}

impl LogFormat {
    /// Parse from string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            "compact" => Some(Self::Compact),
            _ => None,
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown log format: {s}"))
    }
}

/// Install the global `tracing` subscriber.
///
/// Fails if a subscriber is already installed.
pub fn init_logging(service_name: &str, format: LogFormat) -> Result<(), SettleError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let result = match format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(true).with_ansi(true))
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .try_init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().compact())
            .try_init(),
    };
    result.map_err(|e| SettleError::Logging(e.to_string()))?;

    tracing::info!(service = service_name, format = ?format, "logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("pretty", Some(LogFormat::Pretty))]
    #[case("PRETTY", Some(LogFormat::Pretty))]
    #[case("json", Some(LogFormat::Json))]
    #[case("Compact", Some(LogFormat::Compact))]
    #[case("xml", None)]
    fn log_format_parse(#[case] input: &str, #[case] expected: Option<LogFormat>) {
        assert_eq!(LogFormat::parse(input), expected);
        assert_eq!(input.parse::<LogFormat>().ok(), expected);
    }

    #[test]
    fn log_format_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&LogFormat::Json).unwrap(), "\"json\"");
        let back: LogFormat = serde_json::from_str("\"compact\"").unwrap();
        assert_eq!(back, LogFormat::Compact);
    }
}
