//! Logging configuration.
//!
//! Resolved from `HS_LOG` (falling back to `RUST_LOG`) and `HS_LOG_FORMAT`;
//! explicit overrides passed by the caller win over the environment.

use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;

pub const ENV_LOG_LEVEL: &str = "HS_LOG";
pub const ENV_LOG_FORMAT: &str = "HS_LOG_FORMAT";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines on stderr.
    #[default]
    Human,
    /// One JSON object per line on stderr.
    Jsonl,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "console" | "pretty" => Ok(LogFormat::Human),
            "jsonl" | "json" => Ok(LogFormat::Jsonl),
            _ => Err(format!("unknown log format: {}", s)),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Human => write!(f, "human"),
            LogFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

/// Parse a level name, accepting `quiet`/`none` as aliases for `off`.
pub fn parse_level(s: &str) -> Option<LevelFilter> {
    match s.trim().to_lowercase().as_str() {
        "quiet" | "none" => Some(LevelFilter::OFF),
        "warning" => Some(LevelFilter::WARN),
        other => other.parse().ok(),
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    pub format: LogFormat,
    /// Maximum verbosity for `hs_core` targets.
    pub level: LevelFilter,
    /// Include timestamps in human output.
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Human,
            level: LevelFilter::INFO,
            timestamps: true,
        }
    }
}

impl LogConfig {
    /// Resolve from the process environment, then apply overrides.
    pub fn from_env(level: Option<LevelFilter>, format: Option<LogFormat>) -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), level, format)
    }

    /// Resolve from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F, level: Option<LevelFilter>, format: Option<LogFormat>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(parsed) = lookup(ENV_LOG_LEVEL).as_deref().and_then(parse_level) {
            config.level = parsed;
        } else if let Some(rust_log) = lookup("RUST_LOG") {
            // Only a bare level is honoured here; directive strings go
            // straight to EnvFilter in init_logging.
            if let Some(parsed) = parse_level(&rust_log) {
                config.level = parsed;
            }
        }

        if let Some(parsed) = lookup(ENV_LOG_FORMAT).and_then(|v| v.parse().ok()) {
            config.format = parsed;
        }

        if let Some(level) = level {
            config.level = level;
        }
        if let Some(format) = format {
            config.format = format;
        }
        config
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }
}
