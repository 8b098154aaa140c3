//! Error types
//!
//! One crate-wide error enum; anything that can fail returns [`Result`].
//! A failure during a run aborts it — there is no retry tier.

use thiserror::Error;

/// Errors surfaced by configuration, I/O and the training loops
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem failure (checkpoint directories and files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Checkpoint serialization failure
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Non-finite loss or other numerical breakdown
    #[error("Numerical error: {0}")]
    Numerical(String),
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;
