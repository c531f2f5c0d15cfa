//! Process-wide logger state.
//!
//! The active logger lives in an [`ArcSwap`] so a reload replaces it
//! atomically: readers see either the old or the new logger, and handles
//! obtained before a swap stay usable.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock, Once};

use arc_swap::ArcSwap;
use tracing_subscriber::fmt::MakeWriter;

use crate::config::LoggingConfig;
use crate::logger::Logger;
use crate::telemetry::LoggerConfig;

static GLOBAL: LazyLock<ArcSwap<Logger>> =
    LazyLock::new(|| ArcSwap::from_pointee(initial_logger()));

static REDIRECT_STD_LOG: AtomicBool = AtomicBool::new(false);
static STD_LOG_BRIDGE: Once = Once::new();

// First access configures from the environment. An unreadable environment
// leaves the library default in place, which drops every record.
fn initial_logger() -> Logger {
    match LoggingConfig::from_env() {
        Ok(conf) => {
            redirect_std_log(conf.redirect_std_log);
            configure(&conf, io::stderr)
        }
        Err(_) => Logger::nop(),
    }
}

fn production_fallback<W>(writer: W) -> Logger
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    LoggerConfig::production()
        .build_with_writer(writer)
        .unwrap_or_else(|_| Logger::nop())
}

/// Builds the logger described by `conf`.
///
/// A build failure yields the production preset instead, with one error
/// record describing the rejected configuration.
pub(crate) fn configure<W>(conf: &LoggingConfig, writer: W) -> Logger
where
    W: for<'w> MakeWriter<'w> + Clone + Send + Sync + 'static,
{
    match conf.to_logger_config().build_with_writer(writer.clone()) {
        Ok(logger) => logger,
        Err(err) => {
            let logger = production_fallback(writer);
            logger.in_scope(|| {
                tracing::error!(
                    config = %serde_json::to_string(conf).unwrap_or_default(),
                    error = %err,
                    "Failed creating logger with current settings.  Using production defaults."
                )
            });
            logger
        }
    }
}

/// Reloads logging settings from the `LOG_*` environment and installs the
/// resulting logger globally.
///
/// Never fails. If the environment cannot be parsed the current global
/// logger is left untouched.
pub fn read_logging_config() {
    let Ok(conf) = LoggingConfig::from_env() else {
        return;
    };
    let logger = configure(&conf, io::stderr);
    replace_global(logger);
    redirect_std_log(conf.redirect_std_log);
}

/// Reloads the configuration and installs a global logger that tags every
/// record with `app = app_name`.
pub fn init(app_name: &str) -> Logger {
    read_logging_config();
    let logger = l().with_app(app_name);
    replace_global(logger.clone());
    logger
}

/// The current global logger.
pub fn l() -> Logger {
    Logger::clone(&GLOBAL.load())
}

/// Atomically installs `logger` as the global logger, returning the one it
/// replaced.
pub fn replace_global(logger: Logger) -> Arc<Logger> {
    GLOBAL.swap(Arc::new(logger))
}

struct StdLogBridge;

impl log::Log for StdLogBridge {
    fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
        REDIRECT_STD_LOG.load(Ordering::Relaxed)
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        l().in_scope(|| {
            let _ = tracing_log::format_trace(record);
        });
    }

    fn flush(&self) {}
}

/// Routes records from the `log` facade into the global logger.
///
/// The bridge is registered with `log` at most once per process; turning
/// redirection off afterwards makes it drop records instead.
fn redirect_std_log(enabled: bool) {
    REDIRECT_STD_LOG.store(enabled, Ordering::Relaxed);
    if enabled {
        STD_LOG_BRIDGE.call_once(|| {
            if log::set_boxed_logger(Box::new(StdLogBridge)).is_ok() {
                log::set_max_level(log::LevelFilter::Trace);
            }
        });
    }
}
