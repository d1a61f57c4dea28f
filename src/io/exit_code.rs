//! Process exit codes for CLI commands.

use crate::registry::ErrorKind;

/// Exit codes returned by the `watchlist` binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    ConfigError = 2,
    /// Nothing matched, or stale entries were found
    NotFound = 3,
    AlreadyWatched = 4,
    NotADirectory = 5,
    PermissionDenied = 6,
    PersistenceFailure = 7,
    /// Path cannot be stored as text
    InvalidPath = 8,
}

impl ExitCode {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl From<ErrorKind> for ExitCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NotADirectory => Self::NotADirectory,
            ErrorKind::PermissionDenied => Self::PermissionDenied,
            ErrorKind::AlreadyWatched => Self::AlreadyWatched,
            ErrorKind::PersistenceFailure => Self::PersistenceFailure,
            ErrorKind::InvalidPath => Self::InvalidPath,
        }
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.code())
    }
}
