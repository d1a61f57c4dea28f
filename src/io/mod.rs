//! Output handling for the CLI.
//!
//! This module provides:
//! - The JSON output envelope used with `--json`
//! - Process exit codes

pub mod envelope;
pub mod exit_code;

pub use envelope::{
    EntityType, Envelope, ErrorDetails, MessageType, Meta, ResultCode, SCHEMA_VERSION, Status,
};
pub use exit_code::ExitCode;
