//! Common error type for the dockhound ecosystem.

use thiserror::Error;

/// Result type alias using [`DockhoundError`].
pub type DockhoundResult<T> = Result<T, DockhoundError>;

/// Errors shared across the dockhound crates.
#[derive(Error, Debug)]
pub enum DockhoundError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Docker API error surfaced while inspecting or listing containers.
    #[error("docker error: {message}")]
    Docker {
        /// Description of the failure.
        message: String,
    },

    /// The Docker event stream closed; ingestion cannot continue.
    #[error("docker event stream closed")]
    EventStreamClosed,

    /// A host store mutation could not be delivered because the event loop
    /// is gone.
    #[error("host store is shut down")]
    StoreClosed,

    /// Internal invariant violation (should not happen).
    #[error("internal error: {message}")]
    Internal {
        /// Description of the failure.
        message: String,
    },
}
