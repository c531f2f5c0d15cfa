//! Severity levels and the shared level controller.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::error::{LogCtxError, Result};

/// Severity threshold of a log record.
///
/// Ordered from most to least verbose. `tracing` has no fatal level, so a
/// `Fatal` threshold suppresses every `tracing` event.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Fatal,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "trace",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        }
    }

    /// Parses `s`, falling back to `Info` when it names no known level.
    pub fn parse_or_info(s: &str) -> Self {
        s.parse().unwrap_or(Severity::Info)
    }

    /// Whether a `tracing` event at `level` passes this threshold.
    pub fn enables(&self, level: &Level) -> bool {
        Severity::from(*level) >= *self
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => Severity::Trace,
            1 => Severity::Debug,
            2 => Severity::Info,
            3 => Severity::Warn,
            4 => Severity::Error,
            _ => Severity::Fatal,
        }
    }
}

impl From<Level> for Severity {
    fn from(level: Level) -> Self {
        match level {
            Level::TRACE => Severity::Trace,
            Level::DEBUG => Severity::Debug,
            Level::INFO => Severity::Info,
            Level::WARN => Severity::Warn,
            Level::ERROR => Severity::Error,
        }
    }
}

impl FromStr for Severity {
    type Err = LogCtxError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Severity::Trace),
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warn" | "warning" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            "fatal" => Ok(Severity::Fatal),
            _ => Err(LogCtxError::InvalidLevel(s.to_string())),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A threshold that can be read and changed concurrently.
///
/// Clones share the same underlying value, so every logger built from one
/// configuration observes a change made through any of them.
#[derive(Debug, Clone)]
pub struct AtomicLevel {
    inner: Arc<AtomicU8>,
}

impl AtomicLevel {
    pub fn new(level: Severity) -> Self {
        Self {
            inner: Arc::new(AtomicU8::new(level as u8)),
        }
    }

    pub fn level(&self) -> Severity {
        Severity::from_u8(self.inner.load(Ordering::Relaxed))
    }

    pub fn set_level(&self, level: Severity) {
        self.inner.store(level as u8, Ordering::Relaxed);
    }

    pub fn enables(&self, level: &Level) -> bool {
        self.level().enables(level)
    }
}

impl Default for AtomicLevel {
    fn default() -> Self {
        Self::new(Severity::Info)
    }
}
