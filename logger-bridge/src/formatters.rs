//! Line templates
//!
//! - `standard`: `2024-05-01 12:00:00.000 [INFO] message`
//! - `enhanced`: `2024-05-01 12:00:00.000 [INFO] [app::db] message`
//!
//! Structured fields follow the message as `key=value`. Error-level records
//! additionally get a diagnose block (call site, bound script name, span
//! context) and a backtrace when the sink asks for them.

use crate::record::{render_pairs, Record};
use colored::{ColoredString, Colorize};
use log_config::{LogFormat, LoggingConfig, Severity};
use std::fmt::Write as _;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineFormatter {
    pub format: LogFormat,
    pub ansi: bool,
    pub backtrace: bool,
    pub diagnose: bool,
}

impl LineFormatter {
    pub fn from_config(config: &LoggingConfig, ansi: bool) -> Self {
        Self {
            format: config.log_format,
            ansi,
            backtrace: config.backtrace,
            diagnose: config.diagnose,
        }
    }

    /// Render `record` as one newline-terminated entry.
    pub fn format(&self, record: &Record<'_>) -> String {
        let mut line = String::with_capacity(64 + record.message.len());
        let _ = write!(
            line,
            "{} [{}] ",
            record.timestamp.format(TIMESTAMP_FORMAT),
            self.level(record.severity)
        );

        if self.format == LogFormat::Enhanced {
            let _ = write!(line, "[{}] ", record.module);
        }

        line.push_str(&record.message);
        if !record.fields.is_empty() {
            if !record.message.is_empty() {
                line.push(' ');
            }
            line.push_str(&render_pairs(&record.fields));
        }
        line.push('\n');

        if record.severity >= Severity::Error {
            if self.diagnose {
                self.diagnose_block(&mut line, record);
            }
            if self.backtrace {
                if let Some(backtrace) = &record.backtrace {
                    let _ = writeln!(line, "Backtrace:\n{backtrace:?}");
                }
            }
        }

        line
    }

    fn diagnose_block(&self, out: &mut String, record: &Record<'_>) {
        match (record.file, record.line) {
            (Some(file), Some(line)) => {
                let _ = writeln!(out, "    at {file}:{line}");
            }
            (Some(file), None) => {
                let _ = writeln!(out, "    at {file}");
            }
            _ => {}
        }
        if let Some(script_name) = record.script_name {
            let _ = writeln!(out, "    script_name = {script_name}");
        }
        for (name, value) in &record.fields {
            let _ = writeln!(out, "    {name} = {value}");
        }
        for span in record.spans.iter().rev() {
            let _ = writeln!(out, "    in {span}");
        }
    }

    fn level(&self, severity: Severity) -> String {
        if self.ansi {
            colorize(severity).to_string()
        } else {
            severity.name().to_string()
        }
    }
}

fn colorize(severity: Severity) -> ColoredString {
    let name = severity.name();
    match severity {
        Severity::Trace => name.bright_purple(),
        Severity::Debug => name.bright_blue(),
        Severity::Info => name.bright_white().bold(),
        Severity::Success => name.bright_green().bold(),
        Severity::Warning => name.bright_yellow().bold(),
        Severity::Error => name.bright_red().bold(),
        Severity::Critical => name.white().on_red().bold(),
    }
}
