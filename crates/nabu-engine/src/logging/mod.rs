//! Logging setup for hosts embedding the engine.
//!
//! The engine itself only speaks through the `log` facade; this module wires
//! a default `env_logger` backend for binaries that want one.

mod init;

pub use init::{LoggingConfig, init_logging};
