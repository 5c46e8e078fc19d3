use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;

use super::{RegistryError, RegistryResult};

/// Install the global subscriber: readable lines on stderr, plus JSON lines
/// kept by the returned sink when `json_log` is set. `RUST_LOG` overrides
/// the `info` level.
pub fn init_logging(json_log: bool) -> RegistryResult<LogSink> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(io::stderr);

    let sink = if json_log {
        LogSink::pending()
    } else {
        LogSink::disabled()
    };
    let file_layer = json_log.then(|| {
        let writer = sink.clone();
        tracing_subscriber::fmt::layer()
            .json()
            .with_timer(UtcTime::rfc_3339())
            .with_writer(BoxMakeWriter::new(move || writer.clone()))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|err| RegistryError::Logging(err.to_string()))?;

    Ok(sink)
}

enum SinkState {
    Pending(Vec<u8>),
    File(File),
    Disabled,
}

/// Destination of JSON log lines.
///
/// Lines are held in memory until `attach` opens the log file, so a run
/// that fails before its output directory exists leaves no file behind.
#[derive(Clone)]
pub struct LogSink {
    state: Arc<Mutex<SinkState>>,
}

impl LogSink {
    fn pending() -> Self {
        Self::with_state(SinkState::Pending(Vec::new()))
    }

    fn disabled() -> Self {
        Self::with_state(SinkState::Disabled)
    }

    fn with_state(state: SinkState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Append buffered lines to `path` and write every later line there.
    pub fn attach(&self, path: &Path) -> RegistryResult<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| RegistryError::Logging("log sink poisoned".to_string()))?;
        if let SinkState::Pending(buffer) = &*state {
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            file.write_all(buffer)?;
            *state = SinkState::File(file);
        }
        Ok(())
    }
}

impl Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::other("failed to lock log sink"))?;
        match &mut *state {
            SinkState::Pending(buffer) => {
                buffer.extend_from_slice(buf);
                Ok(buf.len())
            }
            SinkState::File(file) => file.write(buf),
            SinkState::Disabled => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::other("failed to lock log sink"))?;
        match &mut *state {
            SinkState::File(file) => file.flush(),
            _ => Ok(()),
        }
    }
}
