//! CLI error handling with user-friendly messages.
//!
//! Centralizes error reporting for the CLI, providing consistent formatting
//! and exit codes.

use std::fmt;
use std::process;

use tilepack_core::TileError;

/// Exit code for any failed run.
pub const EXIT_FAILURE: i32 = 1;

/// CLI-specific errors.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Argument rejected after parsing
    InvalidArgument(String),
    /// The tiling pipeline failed
    Tiling(TileError),
}

impl CliError {
    /// Exit the process with an error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("error: {}", self);

        if let CliError::Tiling(
            TileError::Io(_) | TileError::Compression(_) | TileError::Allocation { .. },
        ) = self
        {
            eprintln!();
            eprintln!("Tiles written before the failure were left in place.");
        }

        process::exit(EXIT_FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::InvalidArgument(msg) => write!(f, "{}", msg),
            CliError::Tiling(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Tiling(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TileError> for CliError {
    fn from(err: TileError) -> Self {
        CliError::Tiling(err)
    }
}
