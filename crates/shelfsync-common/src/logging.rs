//! Logging configuration and initialization
//!
//! Centralized tracing setup for all shelfsync binaries. Supports console
//! and daily-rotated file output, an env-configurable level, and extra
//! per-module filter directives. Use the structured macros (`info!`,
//! `warn!`, ...) everywhere; `println!` output bypasses the subscriber.
//!
//! # Example
//!
//! ```no_run
//! use shelfsync_common::logging::{init_logging, LogConfig};
//! use tracing::info;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = LogConfig::from_env();
//!     init_logging(&config)?;
//!     info!("logging ready");
//!     Ok(())
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

/// Minimum level to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(anyhow::anyhow!("invalid log level: {}", s)),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Minimum log level
    pub level: LogLevel,

    /// Also write to a daily-rotated log file
    pub log_to_file: bool,

    /// Directory for log files
    pub log_dir: PathBuf,

    /// Log file name prefix (e.g. "shelfsync" -> "shelfsync.2026-08-30")
    pub log_file_prefix: String,

    /// Additional filter directives (e.g. "hyper=warn,tower_http=debug")
    pub filter_directives: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            log_to_file: false,
            log_dir: PathBuf::from("./logs"),
            log_file_prefix: "shelfsync".to_string(),
            filter_directives: None,
        }
    }
}

impl LogConfig {
    /// Build a configuration from environment variables, falling back to
    /// defaults for anything unset.
    ///
    /// - `LOG_LEVEL`: trace, debug, info, warn, error
    /// - `LOG_TO_FILE`: true/false
    /// - `LOG_DIR`: directory for log files
    /// - `LOG_FILE_PREFIX`: log file name prefix
    /// - `LOG_FILTER`: extra filter directives
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(level) = std::env::var("LOG_LEVEL").ok().and_then(|s| s.parse().ok()) {
            config.level = level;
        }
        if let Ok(val) = std::env::var("LOG_TO_FILE") {
            config.log_to_file = val.parse().unwrap_or(false);
        }
        if let Ok(dir) = std::env::var("LOG_DIR") {
            config.log_dir = PathBuf::from(dir);
        }
        if let Ok(prefix) = std::env::var("LOG_FILE_PREFIX") {
            config.log_file_prefix = prefix;
        }
        if let Ok(filter) = std::env::var("LOG_FILTER") {
            config.filter_directives = Some(filter);
        }

        config
    }

    pub fn with_filter_directives(mut self, directives: impl Into<String>) -> Self {
        self.filter_directives = Some(directives.into());
        self
    }

    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.log_file_prefix = prefix.into();
        self
    }

    fn env_filter(&self) -> Result<EnvFilter> {
        let mut filter =
            EnvFilter::from_default_env().add_directive(self.level.to_tracing_level().into());

        if let Some(ref directives) = self.filter_directives {
            for directive in directives.split(',') {
                filter = filter.add_directive(
                    directive
                        .trim()
                        .parse()
                        .context("failed to parse filter directive")?,
                );
            }
        }

        Ok(filter)
    }
}

/// Initialize the global tracing subscriber.
///
/// Call once at startup; a second call returns an error from `try_init`.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let filter = config.env_filter()?;

    let console_layer = fmt::layer().with_writer(std::io::stdout).with_target(true);

    let file_layer = if config.log_to_file {
        std::fs::create_dir_all(&config.log_dir).context("failed to create log directory")?;
        let appender =
            tracing_appender::rolling::daily(&config.log_dir, &config.log_file_prefix);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        // The guard flushes on drop; keep it alive for the process lifetime.
        std::mem::forget(guard);

        Some(fmt::layer().with_writer(writer).with_ansi(false).boxed())
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    Ok(())
}
