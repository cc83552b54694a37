//! Telemetry and tracing utilities
//!
//! Installs a global `tracing` subscriber for the crate's events. Nothing in
//! the library calls these; applications opt in.
//!
//! ## Example
//!
//! ```rust,ignore
//! use fluxcall::telemetry::{init_subscriber, OutputFormat, SubscriberConfig};
//!
//! let config = SubscriberConfig::builder()
//!     .log_level(tracing::Level::DEBUG)
//!     .output_format(OutputFormat::Json)
//!     .build();
//! let _guard = init_subscriber(config)?;
//! ```

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::error::{Error, Result};

/// Output format for tracing logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format
    Json,
    /// Compact JSON format
    JsonCompact,
}

impl std::str::FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "json-compact" => Ok(Self::JsonCompact),
            _ => Err(Error::configuration(format!(
                "Invalid log format: {s}. Valid options: text, json, json-compact"
            ))),
        }
    }
}

/// Configuration for tracing subscriber
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    pub log_level: tracing::Level,
    pub output_format: OutputFormat,
    /// Write to this file instead of stdout
    pub log_file: Option<PathBuf>,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            log_level: tracing::Level::INFO,
            output_format: OutputFormat::Text,
            log_file: None,
        }
    }
}

impl SubscriberConfig {
    pub fn builder() -> SubscriberConfigBuilder {
        SubscriberConfigBuilder::default()
    }

    /// Debug-level text output, which includes per-call execution and cancellation.
    pub fn debug() -> Self {
        Self {
            log_level: tracing::Level::DEBUG,
            ..Self::default()
        }
    }

    /// `fluxcall={level}`
    pub fn filter(&self) -> String {
        format!("fluxcall={}", level_name(self.log_level))
    }
}

fn level_name(level: tracing::Level) -> &'static str {
    match level {
        tracing::Level::TRACE => "trace",
        tracing::Level::DEBUG => "debug",
        tracing::Level::INFO => "info",
        tracing::Level::WARN => "warn",
        tracing::Level::ERROR => "error",
    }
}

/// Builder for SubscriberConfig
#[derive(Debug, Default)]
pub struct SubscriberConfigBuilder {
    log_level: Option<tracing::Level>,
    output_format: Option<OutputFormat>,
    log_file: Option<PathBuf>,
}

impl SubscriberConfigBuilder {
    pub fn log_level(mut self, level: tracing::Level) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Set the log level from a string
    pub fn log_level_str(mut self, level: &str) -> Result<Self> {
        let parsed = match level.to_lowercase().as_str() {
            "trace" => tracing::Level::TRACE,
            "debug" => tracing::Level::DEBUG,
            "info" => tracing::Level::INFO,
            "warn" => tracing::Level::WARN,
            "error" => tracing::Level::ERROR,
            _ => {
                return Err(Error::configuration(format!(
                    "Invalid log level: {level}. Valid options: trace, debug, info, warn, error"
                )));
            }
        };
        self.log_level = Some(parsed);
        Ok(self)
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    pub fn build(self) -> SubscriberConfig {
        SubscriberConfig {
            log_level: self.log_level.unwrap_or(tracing::Level::INFO),
            output_format: self.output_format.unwrap_or_default(),
            log_file: self.log_file,
        }
    }
}

fn file_writer(path: &Path) -> Result<(BoxMakeWriter, WorkerGuard)> {
    let name = path
        .file_name()
        .ok_or_else(|| Error::configuration(format!("Invalid log file: {}", path.display())))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name.to_string_lossy())
        .build(dir)
        .map_err(|e| Error::configuration(format!("Failed to open log file: {e}")))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);
    Ok((BoxMakeWriter::new(writer), guard))
}

/// Initialize tracing subscriber with the given configuration
///
/// Returns the file writer's guard when `log_file` is set; keep it alive for
/// as long as events should be flushed. A subscriber that is already
/// installed is left in place.
pub fn init_subscriber(config: SubscriberConfig) -> Result<Option<WorkerGuard>> {
    let filter = config.filter();
    let (writer, guard) = match &config.log_file {
        Some(path) => {
            let (writer, guard) = file_writer(path)?;
            (writer, Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stdout), None),
    };
    let ansi = guard.is_none();

    let init_result = match config.output_format {
        OutputFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .json()
            .try_init(),
        OutputFormat::JsonCompact => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .json()
            .flatten_event(true)
            .try_init(),
        OutputFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(true)
            .with_thread_names(true)
            .try_init(),
    };

    match init_result {
        Ok(()) => Ok(guard),
        Err(e) => {
            let message = e.to_string();
            if message.contains("global default trace dispatcher has already been set") {
                Ok(None)
            } else {
                Err(Error::configuration(format!(
                    "Failed to initialize tracing: {e}"
                )))
            }
        }
    }
}

pub fn init_default() -> Result<Option<WorkerGuard>> {
    init_subscriber(SubscriberConfig::default())
}

pub fn init_debug() -> Result<Option<WorkerGuard>> {
    init_subscriber(SubscriberConfig::debug())
}

/// Initialize tracing subscriber from environment variables
///
/// - `FLUXCALL_LOG_LEVEL`: trace, debug, info, warn, error
/// - `FLUXCALL_LOG_FORMAT`: text, json, json-compact
/// - `FLUXCALL_LOG_FILE`: log file path
pub fn init_from_env() -> Result<Option<WorkerGuard>> {
    init_subscriber(config_from_env()?)
}

fn config_from_env() -> Result<SubscriberConfig> {
    config_from_lookup(|key| std::env::var(key).ok())
}

fn config_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<SubscriberConfig> {
    let mut builder = SubscriberConfig::builder();
    if let Some(level) = lookup("FLUXCALL_LOG_LEVEL") {
        builder = builder.log_level_str(&level)?;
    }
    if let Some(format) = lookup("FLUXCALL_LOG_FORMAT") {
        builder = builder.output_format(format.parse()?);
    }
    if let Some(file) = lookup("FLUXCALL_LOG_FILE") {
        builder = builder.log_file(file);
    }
    Ok(builder.build())
}
