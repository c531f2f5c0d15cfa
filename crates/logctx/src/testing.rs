//! Helpers for test suites that log.

use std::io;
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;

use crate::global::{init, replace_global};
use crate::logger::Logger;

const ENVIRONMENT_KEY: &str = "LOG_ENVIRONMENT";

/// Installs a global logger for the running test and returns it.
///
/// With `discard` set, every record is dropped. Otherwise the logger uses
/// the development console preset and is tagged with the test's name, which
/// the test harness exposes as the current thread's name.
///
/// `LOG_ENVIRONMENT` is overridden for the duration of the call, so this must
/// not race with other environment-driven initialization in the process.
pub fn init_test(discard: bool) -> Logger {
    let current = std::thread::current();
    init_test_named(current.name().unwrap_or("test"), discard)
}

pub fn init_test_named(name: &str, discard: bool) -> Logger {
    if discard {
        let logger = Logger::nop();
        replace_global(logger.clone());
        return logger;
    }

    let previous = std::env::var_os(ENVIRONMENT_KEY);
    std::env::set_var(ENVIRONMENT_KEY, "dev");
    let logger = init(name);
    match previous {
        Some(value) => std::env::set_var(ENVIRONMENT_KEY, value),
        None => std::env::remove_var(ENVIRONMENT_KEY),
    }
    logger
}

/// In-memory sink for captured log output.
#[derive(Debug, Clone, Default)]
pub struct CaptureWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl CaptureWriter {
    pub fn contents(&self) -> String {
        let buf = self.buf.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&buf).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl io::Write for CaptureWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut buf = self.buf.lock().unwrap_or_else(|e| e.into_inner());
        buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CaptureWriter {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
