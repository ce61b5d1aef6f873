//! `log` facade bridge
//!
//! Registered as the process-wide `log` logger, the bridge re-emits every
//! record accepted by the configured threshold as a `tracing` event. The
//! event carries the record's own target, module path, file and line, which
//! the dispatcher reads back through normalized metadata, so the call site
//! is the code that called `log::warn!` and not the bridge. The dispatcher
//! also binds the process's script name onto these records.

use crate::filters::{log_level_filter, severity_from_log};
use log_config::Severity;
use std::env;
use std::path::Path;
use std::sync::atomic::{AtomicU8, Ordering};
use tracing_log::LogTracer;

pub struct LogBridge {
    tracer: LogTracer,
    min_weight: AtomicU8,
}

impl LogBridge {
    pub fn new(min: Severity) -> Self {
        Self {
            tracer: LogTracer::new(),
            min_weight: AtomicU8::new(min.weight()),
        }
    }

    pub fn min_severity(&self) -> Severity {
        Severity::from_weight(i64::from(self.min_weight.load(Ordering::Relaxed)))
    }

    /// Change the threshold and the `log` crate's global max level with it.
    pub fn set_min_severity(&self, min: Severity) {
        self.min_weight.store(min.weight(), Ordering::Relaxed);
        log::set_max_level(log_level_filter(min));
    }
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        severity_from_log(metadata.level()) >= self.min_severity() && self.tracer.enabled(metadata)
    }

    fn log(&self, record: &log::Record<'_>) {
        if self.enabled(record.metadata()) {
            self.tracer.log(record);
        }
    }

    fn flush(&self) {
        self.tracer.flush();
    }
}

/// File stem of the program's entry point (`argv[0]`), falling back to the
/// current executable.
pub fn script_name() -> Option<String> {
    let stem = |path: &Path| {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| !stem.is_empty())
    };

    env::args_os()
        .next()
        .and_then(|arg0| stem(Path::new(&arg0)))
        .or_else(|| env::current_exe().ok().and_then(|exe| stem(&exe)))
}
