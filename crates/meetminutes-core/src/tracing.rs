//! Tracing setup for meetminutes.
//!
//! One initialization path for both interactive runs and cron jobs: the CLI
//! uses the compact format, unattended runs can switch to JSON so the
//! archive logs stay machine-readable. `RUST_LOG` overrides the default
//! level in every mode.

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    prelude::*,
};

/// Errors that can occur during tracing initialization.
#[derive(Debug, Error)]
pub enum TracingError {
    /// Failed to set the global subscriber.
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// Failed to parse an env filter directive.
    #[error("failed to parse env filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),
}

/// Output format for log messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    /// Human-readable pretty format.
    Pretty,
    /// Compact single-line format (default for the CLI).
    #[default]
    Compact,
    /// JSON format for unattended/cron runs.
    Json,
}

/// Configuration for tracing initialization.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// The default log level when `RUST_LOG` is not set.
    pub default_level: Level,
    /// Output format for log messages.
    pub output_format: TracingOutputFormat,
    /// Whether to include timestamps.
    pub include_timestamp: bool,
    /// Whether to include the target (module path).
    pub include_target: bool,
    /// Custom env filter directive (overrides `default_level` if set).
    pub env_filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: Level::INFO,
            output_format: TracingOutputFormat::Compact,
            include_timestamp: false,
            include_target: false,
            env_filter: None,
        }
    }
}

impl TracingConfig {
    /// Config for interactive CLI usage.
    #[must_use]
    pub fn cli(debug: bool) -> Self {
        Self {
            default_level: if debug { Level::DEBUG } else { Level::INFO },
            ..Self::default()
        }
    }

    /// Config for unattended (cron) runs: JSON with timestamps.
    #[must_use]
    pub fn cron() -> Self {
        Self {
            default_level: Level::INFO,
            output_format: TracingOutputFormat::Json,
            include_timestamp: true,
            include_target: true,
            env_filter: None,
        }
    }

    /// Sets the default log level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.default_level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Sets a custom env filter directive.
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }
}

/// Initializes tracing with the given configuration.
///
/// Call once at process start. `RUST_LOG` overrides the default level.
///
/// # Errors
///
/// Returns an error if a global subscriber is already set or if the env
/// filter directive is invalid.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let env_filter = if let Some(ref filter) = config.env_filter {
        EnvFilter::try_new(filter)?
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("meetminutes={}", config.default_level)))
    };

    match config.output_format {
        TracingOutputFormat::Pretty => {
            let subscriber = tracing_subscriber::registry().with(env_filter).with(
                fmt::layer()
                    .pretty()
                    .with_target(config.include_target)
                    .with_span_events(FmtSpan::NONE),
            );
            tracing::subscriber::set_global_default(subscriber)?;
        }
        TracingOutputFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_target(config.include_target)
                .with_span_events(FmtSpan::NONE);
            let layer = if config.include_timestamp {
                layer.boxed()
            } else {
                layer.without_time().boxed()
            };
            let subscriber = tracing_subscriber::registry().with(env_filter).with(layer);
            tracing::subscriber::set_global_default(subscriber)?;
        }
        TracingOutputFormat::Json => {
            let subscriber = tracing_subscriber::registry().with(env_filter).with(
                fmt::layer()
                    .json()
                    .with_target(config.include_target)
                    .with_span_events(FmtSpan::NONE),
            );
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    Ok(())
}
