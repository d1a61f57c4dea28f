//! Command implementations for the CLI.
//!
//! Each command returns the [`ExitCode`](crate::io::ExitCode) the process
//! should exit with.

pub mod directories;
pub mod init;

use serde::Serialize;

use crate::io::{Envelope, ExitCode};

/// Print an envelope as JSON and return its exit code.
pub(crate) fn emit<T: Serialize>(envelope: &Envelope<T>) -> ExitCode {
    match envelope.to_json() {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error: failed to serialize output: {e}");
            return ExitCode::GeneralError;
        }
    }
    envelope.exit()
}
