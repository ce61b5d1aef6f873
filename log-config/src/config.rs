// Logging configuration record
use crate::error::ConfigError;
use crate::rotation::Rotation;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// Line template used by every sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// `timestamp [LEVEL] message`
    #[default]
    Standard,
    /// `timestamp [LEVEL] [module] message`
    Enhanced,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Minimum severity written by every sink
    pub level: Severity,
    pub log_format: LogFormat,
    /// When the log file is rotated
    pub rotation: Rotation,
    /// Number of rotated files kept next to the active one
    pub retention: usize,
    /// Also write to stdout
    pub to_console: bool,
    /// Attach a stack trace to error-level records
    pub backtrace: bool,
    /// Attach call site, bound values and span context to error-level records
    pub diagnose: bool,
    /// Color the level label on the console
    pub colorize: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Severity::Info,
            log_format: LogFormat::Standard,
            rotation: Rotation::default(),
            retention: 5,
            to_console: true,
            backtrace: true,
            diagnose: true,
            colorize: true,
        }
    }
}

impl LoggingConfig {
    /// Build a config from the `logging` mapping of a config document.
    ///
    /// Every key missing from `section` keeps its default. A key holding an
    /// unusable value also keeps its default and is reported in the returned
    /// issue list.
    pub fn from_mapping(section: &Mapping) -> (Self, Vec<ConfigError>) {
        let mut config = Self::default();
        let mut issues = Vec::new();

        read(section, "level", parse_severity, &mut config.level, &mut issues);
        read(section, "log_format", parse_format, &mut config.log_format, &mut issues);
        read(section, "rotation", parse_rotation, &mut config.rotation, &mut issues);
        read(section, "retention", parse_retention, &mut config.retention, &mut issues);
        read(section, "to_console", parse_bool, &mut config.to_console, &mut issues);
        read(section, "backtrace", parse_bool, &mut config.backtrace, &mut issues);
        read(section, "diagnose", parse_bool, &mut config.diagnose, &mut issues);
        read(section, "colorize", parse_bool, &mut config.colorize, &mut issues);

        (config, issues)
    }
}

/// Overwrite `slot` with the parsed value of `key` when it is present and
/// non-null; a value that does not parse is recorded and `slot` is left alone.
fn read<T>(
    section: &Mapping,
    key: &'static str,
    parse: fn(&Value) -> Result<T, String>,
    slot: &mut T,
    issues: &mut Vec<ConfigError>,
) {
    let Some(value) = section.get(key).filter(|value| !value.is_null()) else {
        return;
    };
    match parse(value) {
        Ok(parsed) => *slot = parsed,
        Err(reason) => issues.push(ConfigError::InvalidField { field: key, reason }),
    }
}

fn parse_severity(value: &Value) -> Result<Severity, String> {
    match value {
        Value::String(name) => name.parse().map_err(|e: ConfigError| e.to_string()),
        Value::Number(number) => number
            .as_i64()
            .map(Severity::from_weight)
            .ok_or_else(|| format!("expected an integer level, got {number}")),
        other => Err(format!("expected a severity name, got {}", describe(other))),
    }
}

fn parse_format(value: &Value) -> Result<LogFormat, String> {
    serde_yaml::from_value(value.clone()).map_err(|e| e.to_string())
}

fn parse_rotation(value: &Value) -> Result<Rotation, String> {
    match value {
        Value::String(policy) => policy.parse().map_err(|e: ConfigError| e.to_string()),
        Value::Number(number) => number
            .as_u64()
            .filter(|bytes| *bytes > 0)
            .map(Rotation::Size)
            .ok_or_else(|| format!("expected a positive byte count, got {number}")),
        other => Err(format!("expected a size or interval, got {}", describe(other))),
    }
}

fn parse_retention(value: &Value) -> Result<usize, String> {
    value
        .as_u64()
        .and_then(|count| usize::try_from(count).ok())
        .ok_or_else(|| format!("expected a non-negative integer, got {}", describe(value)))
}

fn parse_bool(value: &Value) -> Result<bool, String> {
    value
        .as_bool()
        .ok_or_else(|| format!("expected true or false, got {}", describe(value)))
}

fn describe(value: &Value) -> String {
    serde_yaml::to_string(value)
        .map(|rendered| rendered.trim().to_string())
        .unwrap_or_else(|_| format!("{value:?}"))
}
