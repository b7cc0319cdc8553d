//! Error types for validated command execution

use thiserror::Error;

/// Unified error type for command execution
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to spawn a process
    #[error("failed to spawn process: {reason}")]
    SpawnFailed {
        /// The reason for the spawn failure
        reason: String,
    },

    /// The command itself failed (non-zero exit status)
    ///
    /// Execution failures are fatal and never retried; only validation
    /// failures are. A command that exits non-zero indicates a malformed
    /// invocation, not a transient condition.
    #[error("command exited with status {code:?}: {output}")]
    CommandFailed {
        /// Exit code if the process exited normally
        code: Option<i32>,
        /// Captured combined output of the failed invocation
        output: String,
    },

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a spawn failed error
    pub fn spawn_failed(reason: impl Into<String>) -> Self {
        Self::SpawnFailed {
            reason: reason.into(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
