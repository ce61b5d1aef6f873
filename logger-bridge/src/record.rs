//! A `tracing` event flattened into what the line formatter needs.

use crate::filters::SEVERITY_FIELD;
use chrono::{DateTime, Local};
use log_config::Severity;
use std::fmt::{self, Write as _};
use std::sync::Arc;
use tracing::field::{Field, Visit};

/// Collects the message, the explicit severity and the remaining fields of an
/// event or span.
///
/// Fields added by the `log` bridge (`log.target`, `log.file`, ...) describe
/// the call site and are skipped; the call site is read from the normalized
/// metadata instead.
#[derive(Debug, Default)]
pub struct FieldCollector {
    pub message: Option<String>,
    pub severity: Option<Severity>,
    pub fields: Vec<(&'static str, String)>,
}

impl FieldCollector {
    fn push(&mut self, field: &Field, value: String) {
        let name = field.name();
        if name == "message" {
            self.message = Some(value);
        } else if !name.starts_with("log.") {
            self.fields.push((name, value));
        }
    }

    /// `key=value` pairs separated by spaces.
    pub fn render_fields(&self) -> String {
        render_pairs(&self.fields)
    }
}

impl Visit for FieldCollector {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == SEVERITY_FIELD {
            if let Ok(severity) = value.parse() {
                self.severity = Some(severity);
                return;
            }
        }
        self.push(field, value.to_string());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.push(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.push(field, format!("{value:?}"));
    }
}

/// Rendered fields of a span, stored in its extensions.
#[derive(Debug, Default)]
pub struct SpanFields(pub String);

impl SpanFields {
    pub fn append(&mut self, more: &str) {
        if more.is_empty() {
            return;
        }
        if !self.0.is_empty() {
            self.0.push(' ');
        }
        self.0.push_str(more);
    }
}

pub(crate) fn render_pairs(pairs: &[(&'static str, String)]) -> String {
    let mut out = String::new();
    for (name, value) in pairs {
        if !out.is_empty() {
            out.push(' ');
        }
        let _ = write!(out, "{name}={value}");
    }
    out
}

#[derive(Debug)]
pub struct Record<'a> {
    pub timestamp: DateTime<Local>,
    pub severity: Severity,
    /// Module path of the call site, or the target when it has none
    pub module: &'a str,
    pub file: Option<&'a str>,
    pub line: Option<u32>,
    pub message: String,
    pub fields: Vec<(&'static str, String)>,
    /// Enclosing spans, outermost first, rendered as `name{fields}`
    pub spans: Vec<String>,
    /// Entry point bound on records forwarded from `log`
    pub script_name: Option<&'a str>,
    pub backtrace: Option<Arc<backtrace::Backtrace>>,
}
