//! Process-wide logger initialization.
//!
//! The first successful [`setup_logger_with`] installs the global `tracing`
//! subscriber and registers the `log` bridge. Every call (the first included)
//! then loads the config, builds fresh sinks and swaps them in, so calling it
//! again never duplicates output.

use crate::bridge::{script_name, LogBridge};
use crate::dispatcher::{Dispatcher, SinkSet};
use crate::error::{LoggerError, Result};
use crate::sink::{build_sinks, Sink, SinkKind};
use log_config::{load_logging_config_from, ConfigPaths, LoggingConfig, Severity};
use once_cell::sync::{Lazy, OnceCell};
use parking_lot::RwLock;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

static LOGGER: OnceCell<LoggerHandle> = OnceCell::new();
static BRIDGE_REGISTERED: OnceCell<()> = OnceCell::new();
static BRIDGE: Lazy<LogBridge> = Lazy::new(|| LogBridge::new(Severity::default()));

/// Shared handle to the installed logger.
#[derive(Debug)]
pub struct LoggerHandle {
    sinks: SinkSet,
    state: RwLock<State>,
    script_name: Option<String>,
}

#[derive(Debug, Clone)]
struct State {
    config: LoggingConfig,
    log_file: PathBuf,
}

impl LoggerHandle {
    /// The handle, once [`setup_logger`] has succeeded.
    pub fn global() -> Option<&'static LoggerHandle> {
        LOGGER.get()
    }

    fn install() -> Result<Self> {
        let sinks = SinkSet::default();
        let script_name = script_name();
        let dispatcher = Dispatcher::new(sinks.clone()).with_script_name(script_name.clone());

        tracing::subscriber::set_global_default(Registry::default().with(dispatcher))?;

        Ok(Self {
            sinks,
            state: RwLock::new(State {
                config: LoggingConfig::default(),
                log_file: PathBuf::new(),
            }),
            script_name,
        })
    }

    /// Swap in `sinks` built from `config`.
    ///
    /// The state lock is held across the whole swap so that `config()` and the
    /// active sinks always belong to the same setup.
    fn apply(&self, config: LoggingConfig, log_file: PathBuf, sinks: Vec<Sink>) {
        let mut state = self.state.write();
        BRIDGE.set_min_severity(config.level);
        let previous = self.sinks.replace(sinks);
        *state = State { config, log_file };
        drop(state);
        // The previous sinks flush their queued records as they drop.
        drop(previous);
    }

    /// The configuration the current sinks were built from.
    pub fn config(&self) -> LoggingConfig {
        self.state.read().config.clone()
    }

    pub fn log_file(&self) -> PathBuf {
        self.state.read().log_file.clone()
    }

    pub fn sink_count(&self) -> usize {
        let _state = self.state.read();
        self.sinks.len()
    }

    pub fn sinks(&self) -> Vec<SinkKind> {
        let _state = self.state.read();
        self.sinks.kinds()
    }

    /// Entry point name bound onto records forwarded from `log`.
    pub fn script_name(&self) -> Option<&str> {
        self.script_name.as_deref()
    }

    /// Remove every sink, waiting for queued records to be written.
    ///
    /// Records emitted afterwards are discarded until the next setup.
    pub fn shutdown(&self) {
        self.sinks.clear();
    }
}

/// Create `dir` if it does not exist yet.
///
/// # Errors
///
/// Returns [`LoggerError::CreateLogDir`] when the directory cannot be created.
pub fn ensure_log_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| LoggerError::CreateLogDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Register the `log` bridge as the global `log` logger, once.
///
/// Runs before the `tracing` subscriber is installed so that a foreign `log`
/// logger is reported as such on every attempt.
fn register_bridge() -> Result<()> {
    BRIDGE_REGISTERED.get_or_try_init(|| log::set_logger(&*BRIDGE))?;
    Ok(())
}

/// Initialize logging from the paths given by [`ConfigPaths::from_env`].
///
/// # Errors
///
/// See [`setup_logger_with`].
pub fn setup_logger() -> Result<&'static LoggerHandle> {
    setup_logger_with(&ConfigPaths::from_env())
}

/// Initialize (or re-initialize) logging from `paths`.
///
/// Configuration problems are reported on stderr and replaced by defaults.
///
/// # Errors
///
/// Fails when the log directory or log file cannot be created, or when
/// another global `tracing` subscriber or `log` logger is already installed.
pub fn setup_logger_with(paths: &ConfigPaths) -> Result<&'static LoggerHandle> {
    let config = load_logging_config_from(&paths.config_file);

    ensure_log_dir(&paths.log_dir())?;
    let log_file = paths.log_file();
    let sinks = build_sinks(&log_file, &config)?;

    register_bridge()?;
    let handle = LOGGER.get_or_try_init(LoggerHandle::install)?;
    handle.apply(config, log_file, sinks);
    Ok(handle)
}
