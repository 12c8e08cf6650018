//! Error types and handling for seqkit
//!
//! Every failure in this crate is local and returned to the caller as a
//! [`SeqError`]; nothing here aborts the process.

use std::error::Error;
use std::sync::Arc;

/// Boxed error produced by user-supplied async production logic.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Main error type for sequence, builder and async-sequence operations
#[derive(Debug, thiserror::Error)]
pub enum SeqError {
    /// `first()` was called on a sequence that yielded nothing
    #[error("Sequence contains no elements")]
    EmptySequence,

    /// A frozen builder was asked to accept more items (or to freeze again)
    #[error("Builder is frozen and no longer accepts mutation")]
    ClosedBuilder,

    /// Two values compared equal under a policy but hashed differently
    #[error("Equality policy violated: equal values hashed to {left_hash:#x} and {right_hash:#x}")]
    PolicyMismatch { left_hash: u64, right_hash: u64 },

    /// An async sequence observed cancellation at a suspension point
    #[error("Operation cancelled")]
    Cancelled,

    /// The production logic itself failed
    #[error("Producer failed: {0}")]
    ProducerFailure(Arc<dyn Error + Send + Sync + 'static>),

    /// The builder's staging buffer could not grow to hold another item
    #[error("Staging buffer could not grow: {0}")]
    CapacityOverflow(#[from] std::collections::TryReserveError),

    /// Configuration could not be parsed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

impl SeqError {
    /// Wrap a producer error, keeping the cause shareable
    pub fn producer<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        let boxed: BoxError = err.into();
        SeqError::ProducerFailure(Arc::from(boxed))
    }

    /// Returns true when this error is the `Cancelled` terminal outcome
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SeqError::Cancelled)
    }
}

impl From<tokio::task::JoinError> for SeqError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_cancelled() {
            SeqError::Cancelled
        } else {
            SeqError::producer(err)
        }
    }
}

/// Result type for seqkit operations
pub type SeqResult<T> = Result<T, SeqError>;
