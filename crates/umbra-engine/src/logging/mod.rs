//! Logging utilities.
//!
//! The engine itself only talks to the `log` facade. This module offers an
//! optional `env_logger` setup for binaries and test harnesses.

mod init;

pub use init::{init_logging, LoggingConfig};
