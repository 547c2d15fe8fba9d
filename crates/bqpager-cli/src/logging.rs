use anyhow::{Result, anyhow};
use std::io::{self, Write};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

use crate::types::LogLevel;

const FILTER_ENV: &str = "BQPAGER_LOG";

/// Log output captured while the pager owns the terminal. `Some` while held.
static HELD: Mutex<Option<Vec<u8>>> = Mutex::new(None);

/// Installs the global subscriber. Logs go to stderr so they never mix
/// with the echoed query on stdout.
pub(crate) fn init(level: LogLevel) -> Result<()> {
    let filter = match std::env::var(FILTER_ENV) {
        Ok(directives) => EnvFilter::new(directives),
        Err(_) => EnvFilter::new(default_directives(level)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(level >= LogLevel::Debug)
        .with_writer(GatedStderr)
        .try_init()
        .map_err(|err| anyhow!("failed to configure logger: {}", err))
}

/// Dependency crates stay at warn unless tracing is requested.
fn default_directives(level: LogLevel) -> String {
    if level >= LogLevel::Trace {
        return level.to_string();
    }
    format!(
        "warn,bqpager={level},bqpager_engine={level},bqpager_providers={level}",
        level = level
    )
}

/// Buffers log output until dropped, then writes it to stderr.
pub(crate) struct LogHold {
    _private: (),
}

pub(crate) fn hold() -> LogHold {
    if let Ok(mut held) = HELD.lock() {
        held.get_or_insert_with(Vec::new);
    }
    LogHold { _private: () }
}

/// Stops buffering and writes out whatever was held.
pub(crate) fn release() {
    let held = HELD.lock().ok().and_then(|mut held| held.take());
    if let Some(bytes) = held {
        let _ = io::stderr().write_all(&bytes);
    }
}

impl Drop for LogHold {
    fn drop(&mut self) {
        release();
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct GatedStderr;

impl<'a> MakeWriter<'a> for GatedStderr {
    type Writer = GatedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        GatedWriter
    }
}

struct GatedWriter;

impl Write for GatedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Ok(mut held) = HELD.lock()
            && let Some(buffer) = held.as_mut()
        {
            buffer.extend_from_slice(buf);
            return Ok(buf.len());
        }
        io::stderr().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}
