//! Structured logging for hs-core.
//!
//! Library code only emits `tracing` events; installing a subscriber is left
//! to the binary or test harness via [`init_logging`]. Every record carries an
//! `event` field from [`event_names`] and a `stage` field.
//!
//! ```ignore
//! use hs_core::logging::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::from_env(None, None))?;
//! ```

pub mod config;
pub mod events;

pub use config::{parse_level, LogConfig, LogFormat};
pub use events::{event_names, Stage};

use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber, writing to stderr.
///
/// A `RUST_LOG` directive string takes precedence over `config.level`.
/// Fails if a global subscriber is already set.
pub fn init_logging(config: &LogConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hs_core={}", config.level)));

    match config.format {
        LogFormat::Human => {
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(std::io::stderr().is_terminal());
            if config.timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer)
                    .try_init()
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer.without_time())
                    .try_init()
            }
        }
        LogFormat::Jsonl => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    }
}

/// [`init_logging`] with environment-derived settings.
pub fn init_default_logging() -> Result<(), TryInitError> {
    init_logging(&LogConfig::from_env(None, None))
}
