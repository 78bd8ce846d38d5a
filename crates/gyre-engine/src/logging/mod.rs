//! Logging utilities.
//!
//! Centralizes logger initialization on the standard `log` facade. Per-frame
//! paths in this crate log at debug/trace so a release run stays quiet.

mod init;

pub use init::{LoggingConfig, init_logging};
