//! The logger handle shared between the global state and request contexts.
//!
//! A [`Logger`] bundles a built `tracing` dispatcher with the span that
//! carries its attached fields. Records go through ordinary `tracing` macros
//! run inside [`Logger::in_scope`], or through the level methods below.

use std::backtrace::Backtrace;
use std::fmt;
use std::sync::Arc;

use tracing::subscriber::NoSubscriber;
use tracing::{Dispatch, Level, Span};

use crate::level::{AtomicLevel, Severity};

/// Effective settings of a built logger. Shared by every logger derived
/// from the same build.
#[derive(Debug)]
pub struct LoggerSettings {
    pub(crate) level: AtomicLevel,
    pub(crate) encoding: &'static str,
    pub(crate) development: bool,
    pub(crate) disable_stacktrace: bool,
    pub(crate) stacktrace_level: Severity,
}

#[derive(Clone)]
pub struct Logger {
    inner: Arc<Inner>,
}

struct Inner {
    dispatch: Dispatch,
    span: Span,
    settings: Arc<LoggerSettings>,
}

macro_rules! emit {
    ($lvl:expr, $stack:expr, $msg:expr) => {
        match $stack {
            Some(trace) => tracing::event!($lvl, stacktrace = %trace, "{}", $msg),
            None => tracing::event!($lvl, "{}", $msg),
        }
    };
}

impl Logger {
    pub(crate) fn new(dispatch: Dispatch, settings: LoggerSettings) -> Self {
        Self {
            inner: Arc::new(Inner {
                dispatch,
                span: Span::none(),
                settings: Arc::new(settings),
            }),
        }
    }

    /// A logger that drops every record regardless of level.
    pub fn nop() -> Self {
        Self::new(
            Dispatch::new(NoSubscriber::default()),
            LoggerSettings {
                level: AtomicLevel::new(Severity::Fatal),
                encoding: "none",
                development: false,
                disable_stacktrace: true,
                stacktrace_level: Severity::Fatal,
            },
        )
    }

    /// Runs `f` with this logger's dispatcher as the default and its span
    /// entered, so `tracing` macros inside `f` are written by this logger.
    pub fn in_scope<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        tracing::dispatcher::with_default(&self.inner.dispatch, || self.inner.span.in_scope(f))
    }

    /// Derives a logger whose span is created by `make_span`.
    ///
    /// `make_span` receives this logger's span as the parent and runs under
    /// this logger's dispatcher, so the new span belongs to the same
    /// subscriber.
    pub fn child<F>(&self, make_span: F) -> Logger
    where
        F: FnOnce(&Span) -> Span,
    {
        let span = tracing::dispatcher::with_default(&self.inner.dispatch, || {
            make_span(&self.inner.span)
        });
        Logger {
            inner: Arc::new(Inner {
                dispatch: self.inner.dispatch.clone(),
                span,
                settings: self.inner.settings.clone(),
            }),
        }
    }

    /// Attaches `app = name` to every subsequent record.
    pub fn with_app(&self, name: &str) -> Logger {
        self.child(|parent| tracing::info_span!(parent: parent, "app", app = %name))
    }

    pub fn log(&self, level: Level, message: &str) {
        let stack = self
            .wants_stacktrace(level)
            .then(Backtrace::force_capture);
        self.in_scope(|| match level {
            Level::TRACE => emit!(Level::TRACE, stack, message),
            Level::DEBUG => emit!(Level::DEBUG, stack, message),
            Level::INFO => emit!(Level::INFO, stack, message),
            Level::WARN => emit!(Level::WARN, stack, message),
            Level::ERROR => emit!(Level::ERROR, stack, message),
        });
    }

    pub fn debug(&self, message: &str) {
        self.log(Level::DEBUG, message);
    }

    pub fn info(&self, message: &str) {
        self.log(Level::INFO, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(Level::WARN, message);
    }

    pub fn error(&self, message: &str) {
        self.log(Level::ERROR, message);
    }

    fn wants_stacktrace(&self, level: Level) -> bool {
        let settings = &self.inner.settings;
        !settings.disable_stacktrace
            && settings.level.enables(&level)
            && Severity::from(level) >= settings.stacktrace_level
    }

    /// True when both handles are the same logger instance.
    pub fn ptr_eq(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn span(&self) -> &Span {
        &self.inner.span
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.inner.dispatch
    }

    pub fn level(&self) -> Severity {
        self.inner.settings.level.level()
    }

    /// The level controller shared by this logger and its relatives.
    pub fn level_handle(&self) -> &AtomicLevel {
        &self.inner.settings.level
    }

    pub fn encoding(&self) -> &'static str {
        self.inner.settings.encoding
    }

    pub fn development(&self) -> bool {
        self.inner.settings.development
    }

    pub fn disable_stacktrace(&self) -> bool {
        self.inner.settings.disable_stacktrace
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level())
            .field("encoding", &self.encoding())
            .field("disable_stacktrace", &self.disable_stacktrace())
            .field("span", &self.inner.span)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::LoggerConfig;
    use crate::testing::CaptureWriter;

    #[test]
    fn test_nop_drops_everything() {
        let logger = Logger::nop();
        assert!(!logger.in_scope(|| tracing::enabled!(Level::ERROR)));
        // Must not panic or write anywhere
        logger.error("dropped");
    }

    #[test]
    fn test_child_shares_settings_not_identity() {
        let logger = LoggerConfig::production().build().unwrap();
        let child = logger.with_app("svc");
        assert!(!child.ptr_eq(&logger));
        assert!(logger.clone().ptr_eq(&logger));

        child.level_handle().set_level(Severity::Warn);
        assert_eq!(logger.level(), Severity::Warn);
    }

    #[test]
    fn test_app_field_is_written() {
        let writer = CaptureWriter::default();
        let logger = LoggerConfig::production()
            .build_with_writer(writer.clone())
            .unwrap()
            .with_app("billing");

        logger.info("started");

        let out = writer.contents();
        assert!(out.contains("started"), "{out}");
        assert!(out.contains("\"app\":\"billing\""), "{out}");
    }

    #[test]
    fn test_stacktrace_attached_only_when_enabled() {
        let writer = CaptureWriter::default();
        let mut config = LoggerConfig::production();
        config.disable_stacktrace = false;
        let logger = config.build_with_writer(writer.clone()).unwrap();
        logger.warn("below threshold");
        logger.error("boom");
        let lines = writer.lines();
        assert_eq!(lines.len(), 2);
        assert!(!lines[0].contains("stacktrace"));
        assert!(lines[1].contains("stacktrace"));

        let writer = CaptureWriter::default();
        let mut config = LoggerConfig::production();
        config.disable_stacktrace = true;
        let logger = config.build_with_writer(writer.clone()).unwrap();
        logger.error("boom");
        assert!(!writer.contents().contains("stacktrace"));
    }
}
