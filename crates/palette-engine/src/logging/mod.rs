//! Logging utilities.
//!
//! This module centralizes logger initialization. Library code only uses the
//! `log` facade; binaries pick the backend here.

mod init;

pub use init::{LoggingConfig, init_logging};
