//! Process-wide logging bootstrap
//!
//! [`setup_logger`] reads the `logging` section of `config.yaml` (see
//! [`log_config`]) and routes every `tracing` event, and every record sent
//! through the `log` facade, to
//!
//! - a rotating file at `<root>/logs/process.log`,
//! - stdout, when `to_console` is set.
//!
//! Each destination writes from its own worker thread. Calling
//! [`setup_logger`] again replaces the destinations instead of adding to
//! them.
//!
//! ```rust,no_run
//! use logger_bridge::{critical, log_function, setup_logger, success};
//!
//! #[log_function]
//! fn reconcile(batch: u32) -> Result<u32, std::io::Error> {
//!     Ok(batch * 2)
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let logger = setup_logger()?;
//!
//!     logger_bridge::tracing::info!(batch = 7, "starting reconciliation");
//!     logger_bridge::log::warn!("legacy path in use");
//!     reconcile(7)?;
//!     success!("reconciliation finished");
//!     critical!("ledger mismatch");
//!
//!     logger.shutdown();
//!     Ok(())
//! }
//! ```

pub mod bridge;
pub mod dispatcher;
pub mod error;
pub mod filters;
pub mod formatters;
pub mod handle;
pub mod macros;
pub mod record;
pub mod rolling;
pub mod sink;
pub mod trace;

#[cfg(test)]
mod testing;

pub use bridge::LogBridge;
pub use dispatcher::{Dispatcher, SinkSet};
pub use error::{LoggerError, Result};
pub use formatters::LineFormatter;
pub use handle::{ensure_log_dir, setup_logger, setup_logger_with, LoggerHandle};
pub use rolling::RotatingFile;
pub use sink::{build_sinks, Sink, SinkKind};
pub use trace::{trace, Traced};

pub use log_config::{ConfigPaths, LogFormat, LoggingConfig, Rotation, Severity};
pub use trace_macros::log_function;

// Used by the exported macros and by `#[log_function]` expansions.
pub use log;
pub use tracing;
