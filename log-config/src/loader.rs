//! Locating and reading the configuration file.

use crate::config::LoggingConfig;
use crate::error::{ConfigError, Result};
use serde_yaml::Value;
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const ROOT_ENV: &str = "LOGBRIDGE_ROOT";
pub const CONFIG_ENV: &str = "LOGBRIDGE_CONFIG";

pub const CONFIG_FILE_NAME: &str = "config.yaml";
pub const LOG_DIR_NAME: &str = "logs";
pub const LOG_FILE_NAME: &str = "process.log";

/// Top-level key holding the logging section.
pub const LOGGING_KEY: &str = "logging";

/// Where the config file is read from and where log files are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub root: PathBuf,
    pub config_file: PathBuf,
}

impl ConfigPaths {
    /// `<root>/config.yaml`, logs under `<root>/logs`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let config_file = root.join(CONFIG_FILE_NAME);
        Self { root, config_file }
    }

    pub fn with_config_file(mut self, config_file: impl Into<PathBuf>) -> Self {
        self.config_file = config_file.into();
        self
    }

    /// Root from `LOGBRIDGE_ROOT` (else the working directory), config file
    /// from `LOGBRIDGE_CONFIG` (else `<root>/config.yaml`).
    pub fn from_env() -> Self {
        let root = env::var_os(ROOT_ENV)
            .map(PathBuf::from)
            .or_else(|| env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        let paths = Self::new(root);
        match env::var_os(CONFIG_ENV) {
            Some(config_file) => paths.with_config_file(config_file),
            None => paths,
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.root.join(LOG_DIR_NAME)
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir().join(LOG_FILE_NAME)
    }
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::from_env()
    }
}

/// A loaded config together with the fields that had to fall back to defaults.
#[derive(Debug)]
pub struct LoadReport {
    pub config: LoggingConfig,
    pub issues: Vec<ConfigError>,
}

impl LoadReport {
    fn defaults() -> Self {
        Self {
            config: LoggingConfig::default(),
            issues: Vec::new(),
        }
    }
}

/// Parse a config document.
///
/// An empty document, a document that is not a mapping, or one without a
/// `logging` mapping yields the defaults.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] when `text` is not valid YAML.
pub fn parse_logging_config(text: &str, origin: &Path) -> Result<LoadReport> {
    if text.trim().is_empty() {
        return Ok(LoadReport::defaults());
    }

    let document: Value = serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
        path: origin.to_path_buf(),
        source,
    })?;

    let Some(section) = document.get(LOGGING_KEY).and_then(Value::as_mapping) else {
        return Ok(LoadReport::defaults());
    };

    let (config, issues) = LoggingConfig::from_mapping(section);
    Ok(LoadReport { config, issues })
}

/// Read and parse the config file at `path`.
///
/// Returns `Ok(None)` when the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Read`] when the file exists but cannot be read and
/// [`ConfigError::Parse`] when it is not valid YAML.
pub fn try_load_logging_config(path: &Path) -> Result<Option<LoadReport>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    parse_logging_config(&text, path).map(Some)
}

/// Load the config at `path`, never failing.
///
/// Read and parse errors, as well as individual unusable fields, are reported
/// on stderr and replaced by defaults.
pub fn load_logging_config_from(path: impl AsRef<Path>) -> LoggingConfig {
    match try_load_logging_config(path.as_ref()) {
        Ok(Some(report)) => {
            for issue in &report.issues {
                eprintln!("{issue}");
            }
            report.config
        }
        Ok(None) => LoggingConfig::default(),
        Err(e) => {
            eprintln!("{e}");
            LoggingConfig::default()
        }
    }
}

/// Load the config file found through [`ConfigPaths::from_env`].
pub fn load_logging_config() -> LoggingConfig {
    load_logging_config_from(ConfigPaths::from_env().config_file)
}

/// Load a config document held in memory, never failing.
pub fn load_logging_config_from_str(text: &str) -> LoggingConfig {
    match parse_logging_config(text, Path::new("<inline>")) {
        Ok(report) => {
            for issue in &report.issues {
                eprintln!("{issue}");
            }
            report.config
        }
        Err(e) => {
            eprintln!("{e}");
            LoggingConfig::default()
        }
    }
}
