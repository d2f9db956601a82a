//! Native logger setup.
//!
//! Library code logs through the `log` facade only; binaries call
//! [`init_logging`] early in `main`.

mod init;

pub use init::{init_logging, LoggingConfig};
