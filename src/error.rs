//! Error handling module for rudi
//!
//! Every failure that stops a convergence run is a `RudiError`. Each variant
//! maps to a distinct process exit status so operators can script on it.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Exit status for a bad command line.
pub const EXIT_USAGE: i32 = -1;

/// Exit status when the manifest (or command set) cannot be read or parsed.
pub const EXIT_MANIFEST: i32 = -2;

/// Exit status when file content cannot be written.
///
/// Shares 253 with a host command that itself exits 253; only the stderr
/// message tells the two apart.
pub const EXIT_WRITE: i32 = -3;

/// Exit status when a command could not be started at all (shell convention).
pub const EXIT_SPAWN: i32 = 127;

/// Main error type for rudi
#[derive(Error, Debug)]
pub enum RudiError {
    /// Command line could not be parsed
    #[error("Usage error: {0}")]
    Usage(String),

    /// Manifest or command set is missing, unreadable, or malformed
    #[error("Configuration error in {}: {message}", path.display())]
    Manifest { path: PathBuf, message: String },

    /// A host command ran and returned non-zero
    #[error("Command `{command}` failed with exit code {code}")]
    CommandFailed { command: String, code: i32 },

    /// A host command could not be spawned
    #[error("Failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// Writing file content failed
    #[error("Error writing file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type alias for rudi operations
pub type Result<T> = std::result::Result<T, RudiError>;

impl RudiError {
    /// Create a configuration error for `path`
    pub fn manifest(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Manifest {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Create a command failure
    pub fn command_failed(command: impl Into<String>, code: i32) -> Self {
        Self::CommandFailed {
            command: command.into(),
            code,
        }
    }

    /// Create a file write failure
    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Process exit status for this error.
    ///
    /// Command failures pass the command's own exit code through.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => EXIT_USAGE,
            Self::Manifest { .. } => EXIT_MANIFEST,
            Self::CommandFailed { code, .. } => *code,
            Self::Spawn { .. } => EXIT_SPAWN,
            Self::Write { .. } => EXIT_WRITE,
        }
    }
}
