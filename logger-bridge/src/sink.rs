//! Log destinations
//!
//! A sink pairs a writer with its own severity threshold and line template.
//! File and console sinks hand their lines to a dedicated non-blocking worker
//! thread, so callers never wait on I/O; the worker is flushed and stopped
//! when the sink is dropped.

use crate::error::{LoggerError, Result};
use crate::formatters::LineFormatter;
use crate::record::Record;
use crate::rolling::RotatingFile;
use log_config::{LoggingConfig, Severity};
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlockingBuilder, WorkerGuard};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkKind {
    File(PathBuf),
    Console,
    Custom(String),
}

pub struct Sink {
    kind: SinkKind,
    min_severity: Severity,
    formatter: LineFormatter,
    writer: BoxMakeWriter,
    _guard: Option<WorkerGuard>,
}

impl Sink {
    /// Rotating file sink at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::OpenLogFile`] when the file cannot be opened.
    pub fn file(path: &Path, config: &LoggingConfig) -> Result<Self> {
        let file = RotatingFile::open(path, config.rotation, config.retention).map_err(|source| {
            LoggerError::OpenLogFile {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let (writer, guard) = NonBlockingBuilder::default()
            .lossy(false)
            .thread_name("logbridge-file")
            .finish(file);

        Ok(Self {
            kind: SinkKind::File(path.to_path_buf()),
            min_severity: config.level,
            formatter: LineFormatter::from_config(config, false),
            writer: BoxMakeWriter::new(writer),
            _guard: Some(guard),
        })
    }

    /// Stdout sink, colored when `config.colorize` is set.
    pub fn console(config: &LoggingConfig) -> Self {
        let (writer, guard) = NonBlockingBuilder::default()
            .lossy(false)
            .thread_name("logbridge-console")
            .finish(io::stdout());

        Self {
            kind: SinkKind::Console,
            min_severity: config.level,
            formatter: LineFormatter::from_config(config, config.colorize),
            writer: BoxMakeWriter::new(writer),
            _guard: Some(guard),
        }
    }

    /// Sink writing synchronously through `make_writer`, without colors.
    pub fn with_writer<W>(name: impl Into<String>, config: &LoggingConfig, make_writer: W) -> Self
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        Self {
            kind: SinkKind::Custom(name.into()),
            min_severity: config.level,
            formatter: LineFormatter::from_config(config, false),
            writer: BoxMakeWriter::new(make_writer),
            _guard: None,
        }
    }

    pub fn kind(&self) -> &SinkKind {
        &self.kind
    }

    pub fn min_severity(&self) -> Severity {
        self.min_severity
    }

    pub fn accepts(&self, severity: Severity) -> bool {
        severity >= self.min_severity
    }

    pub(crate) fn wants_backtrace(&self) -> bool {
        self.formatter.backtrace
    }

    pub(crate) fn write_record(&self, record: &Record<'_>) {
        let line = self.formatter.format(record);
        let mut writer = self.writer.make_writer();
        // Logging is best effort; a failing destination must not fail the caller.
        let _ = writer.write_all(line.as_bytes());
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink")
            .field("kind", &self.kind)
            .field("min_severity", &self.min_severity)
            .field("formatter", &self.formatter)
            .finish_non_exhaustive()
    }
}

/// Sinks for `config`: the rotating file at `log_file`, plus stdout when
/// `to_console` is set.
///
/// # Errors
///
/// Returns [`LoggerError::OpenLogFile`] when the log file cannot be opened.
pub fn build_sinks(log_file: &Path, config: &LoggingConfig) -> Result<Vec<Sink>> {
    let mut sinks = vec![Sink::file(log_file, config)?];
    if config.to_console {
        sinks.push(Sink::console(config));
    }
    Ok(sinks)
}
