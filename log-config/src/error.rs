use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Error reading {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid value for logging.{field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Unknown severity: {0}")]
    UnknownSeverity(String),

    #[error("Invalid rotation policy {value:?}: {reason}")]
    InvalidRotation { value: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
