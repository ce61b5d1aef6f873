// Severity mapping between `log`, `tracing` and sink thresholds
use log_config::Severity;
use tracing::Metadata;

/// Field name carrying an explicit severity (`SUCCESS`, `CRITICAL`) on an event.
pub const SEVERITY_FIELD: &str = "severity";

pub fn severity_from_log(level: log::Level) -> Severity {
    match level {
        log::Level::Error => Severity::Error,
        log::Level::Warn => Severity::Warning,
        log::Level::Info => Severity::Info,
        log::Level::Debug => Severity::Debug,
        log::Level::Trace => Severity::Trace,
    }
}

/// Most verbose `log` level that can still reach a sink at `min`.
pub fn log_level_filter(min: Severity) -> log::LevelFilter {
    match min {
        Severity::Trace => log::LevelFilter::Trace,
        Severity::Debug => log::LevelFilter::Debug,
        Severity::Info | Severity::Success => log::LevelFilter::Info,
        Severity::Warning => log::LevelFilter::Warn,
        Severity::Error | Severity::Critical => log::LevelFilter::Error,
    }
}

/// Cheap check on callsite metadata: could an event here reach a sink at `min`?
///
/// `SUCCESS` and `CRITICAL` share a `tracing` level with `INFO` and `ERROR`,
/// so the exact decision is made once the event's fields are known.
pub fn may_pass(metadata: &Metadata<'_>, min: Severity) -> bool {
    *metadata.level() <= min.as_level()
}
