use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Failed to create log directory {}: {source}", path.display())]
    CreateLogDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open log file {}: {source}", path.display())]
    OpenLogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to install global subscriber: {0}")]
    InstallSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("Failed to install `log` bridge: {0}")]
    InstallBridge(#[from] log::SetLoggerError),
}

pub type Result<T> = std::result::Result<T, LoggerError>;
