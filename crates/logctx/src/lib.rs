//! Environment-driven logger setup and context-scoped logger propagation.
//!
//! This crate provides process-wide logging configuration read from `LOG_*`
//! environment variables, a replaceable global logger, and an immutable
//! [`Context`] that carries a logger through request handling so call sites
//! can attach fields without threading a logger through every signature.

// Environment-sourced settings
pub mod config;
pub use config::{Environment, LoggingConfig};

// Error handling types
pub mod error;
pub use error::{LogCtxError, Result};

// Severity levels and the runtime level controller
pub mod level;
pub use level::{AtomicLevel, Severity};

// Logger handle and presets
pub mod logger;
pub use logger::Logger;
pub mod telemetry;
pub use telemetry::{Encoding, LoggerConfig};

// Global state and initialization
mod global;
pub use global::{init, l, read_logging_config, replace_global};

// Context propagation
mod context;
pub use context::{
    copy_logger_to_context, logger, with_default_logger, with_fields, with_logger, Context,
};

// Runtime level endpoint
pub mod http;
pub use http::http_level_change;

// Test helpers
pub mod testing;

#[doc(hidden)]
pub mod __private {
    pub use tracing;
}
