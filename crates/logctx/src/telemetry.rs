//! Buildable logger configuration and the development/production presets.

use std::io;
use std::str::FromStr;

use serde::Serialize;
use tracing::Dispatch;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{filter, fmt, layer::SubscriberExt, Layer, Registry};

use crate::error::{LogCtxError, Result};
use crate::level::{AtomicLevel, Severity};
use crate::logger::{Logger, LoggerSettings};

/// Output encoding of emitted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Json,
    Console,
}

impl Encoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Json => "json",
            Encoding::Console => "console",
        }
    }
}

impl FromStr for Encoding {
    type Err = LogCtxError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Encoding::Json),
            "console" => Ok(Encoding::Console),
            _ => Err(LogCtxError::UnknownEncoding(s.to_string())),
        }
    }
}

/// Everything needed to build a [`Logger`].
///
/// The encoding stays a free-form string until [`LoggerConfig::build`], which
/// is where an unknown name is rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggerConfig {
    pub level: Severity,
    pub encoding: String,
    pub development: bool,
    pub disable_stacktrace: bool,
    /// Records at or above this severity carry a stack trace.
    pub stacktrace_level: Severity,
}

impl LoggerConfig {
    /// JSON to stderr at info, stack traces from error up.
    pub fn production() -> Self {
        Self {
            level: Severity::Info,
            encoding: Encoding::Json.as_str().to_string(),
            development: false,
            disable_stacktrace: false,
            stacktrace_level: Severity::Error,
        }
    }

    /// Console text to stderr at debug, stack traces from warn up.
    pub fn development() -> Self {
        Self {
            level: Severity::Debug,
            encoding: Encoding::Console.as_str().to_string(),
            development: true,
            disable_stacktrace: false,
            stacktrace_level: Severity::Warn,
        }
    }

    pub fn with_encoding(mut self, encoding: &str) -> Self {
        self.encoding = encoding.to_string();
        self
    }

    pub fn build(&self) -> Result<Logger> {
        self.build_with_writer(io::stderr)
    }

    pub fn build_with_writer<W>(&self, writer: W) -> Result<Logger>
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let encoding: Encoding = self.encoding.parse()?;
        let level = AtomicLevel::new(self.level);

        let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = match encoding {
            Encoding::Json => fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_writer(writer)
                .boxed(),
            Encoding::Console => fmt::layer().with_ansi(false).with_writer(writer).boxed(),
        };

        // Spans always pass so attached fields survive any threshold
        let threshold = level.clone();
        let level_filter =
            filter::filter_fn(move |meta| meta.is_span() || threshold.enables(meta.level()));

        let subscriber = tracing_subscriber::registry().with(fmt_layer.with_filter(level_filter));

        Ok(Logger::new(
            Dispatch::new(subscriber),
            LoggerSettings {
                level,
                encoding: encoding.as_str(),
                development: self.development,
                disable_stacktrace: self.disable_stacktrace,
                stacktrace_level: self.stacktrace_level,
            },
        ))
    }
}
