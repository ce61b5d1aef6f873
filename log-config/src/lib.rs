//! Logging configuration loader for logbridge
//!
//! Reads the optional `logging` section of a YAML document and produces a
//! [`LoggingConfig`] in which every field always holds a usable value:
//!
//! - A missing file yields the defaults
//! - A file that cannot be parsed is reported on stderr and yields the defaults
//! - A document without a `logging` mapping yields the defaults
//! - Each key missing from `logging` keeps its own default
//! - Each key holding an unusable value is reported and keeps its default
//!
//! # Configuration
//!
//! ```yaml
//! logging:
//!   level: INFO            # TRACE, DEBUG, INFO, SUCCESS, WARNING, ERROR, CRITICAL or a number
//!   log_format: standard   # standard | enhanced
//!   rotation: "5 MB"       # size ("5 MB", "512 KiB") or interval ("daily", "6 hours")
//!   retention: 5           # rotated files to keep
//!   to_console: true
//!   backtrace: true
//!   diagnose: true
//!   colorize: true
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use log_config::{load_logging_config_from, Severity};
//!
//! let config = load_logging_config_from("config.yaml");
//! if config.level <= Severity::Debug {
//!     println!("verbose logging enabled");
//! }
//! ```

pub mod config;
pub mod error;
pub mod loader;
pub mod rotation;
pub mod severity;

pub use config::*;
pub use error::*;
pub use loader::*;
pub use rotation::*;
pub use severity::*;
