use std::{io, result::Result as StdResult};

use thiserror::Error;

/// Custom Result type for snip operations.
pub type Result<T> = StdResult<T, SnipError>;

/// Snip-specific error types
#[derive(Error, Debug)]
pub enum SnipError {
    /// The repository could not be read, or git produced output of an unexpected shape.
    #[error("Git error: {0}")]
    Gateway(String),

    /// Fetching from the remotes failed.
    #[error("Network error: {0}")]
    Network(String),

    /// Switching to another branch failed (e.g. uncommitted changes block the switch).
    #[error("Could not check out '{branch}': {message}")]
    Checkout {
        /// Branch that could not be checked out.
        branch: String,
        /// Human-readable error description.
        message: String,
    },

    /// Git refused to delete a branch.
    #[error("Could not delete branch '{branch}': {message}")]
    Delete {
        /// Branch that could not be deleted.
        branch: String,
        /// Human-readable error description.
        message: String,
    },

    /// Configuration could not be loaded or is inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A contextual precondition failed (e.g. not inside a Git repo).
    #[error("Context error: {0}")]
    Context(String),

    /// The interaction boundary failed to present a candidate or collect a decision.
    #[error("Interaction failed: {0}")]
    Interaction(String),

    /// The operation was cancelled by the user.
    #[error("Aborted by user")]
    UserAborted,

    /// An underlying I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl SnipError {
    /// Return the recommended process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::UserAborted => 130,
            Self::Config(_) | Self::Context(_) => 2,
            Self::Gateway(_) => 4,
            Self::Network(_) => 5,
            _ => 1,
        }
    }

    /// Errors scoped to a single branch. The candidate fails, the pass goes on.
    pub fn is_branch_level(&self) -> bool {
        matches!(self, Self::Checkout { .. } | Self::Delete { .. })
    }

    /// Errors that end the current pass early but leave the other pass free to run.
    pub fn is_pass_fatal(&self) -> bool {
        matches!(self, Self::Gateway(_) | Self::Network(_))
    }
}
