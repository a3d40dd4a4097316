//! # DomainError
//!
//! Centralized error handling for the bump-board engine.
//! Every variant aborts the whole operation; no partial state is ever left behind.

use thiserror::Error;

use crate::models::{Address, InternalId};

/// The primary error type for all board and thread operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Positional or paginated access beyond the live bounds.
    #[error("index {index} out of range for collection of size {size}")]
    OutOfRange { index: usize, size: usize },

    /// Stable-id lookup miss (never issued, or already detached).
    #[error("no live element carries internal id {0}")]
    UnknownId(InternalId),

    /// Caller failed an owner or registered-caller check.
    #[error("unauthorized caller {0}")]
    Unauthorized(Address),

    /// Mutation blocked because the board is locked.
    #[error("board is locked")]
    BoardLocked,

    /// Any mutation on a torn-down board or thread.
    #[error("instance has already been destroyed")]
    AlreadyDestroyed,

    /// Zero-length post text.
    #[error("post text must not be empty")]
    EmptyPost,

    /// Attempt to soft-delete a post that must stay intact (the opening post).
    #[error("post {0} is protected and cannot be removed")]
    ProtectedRecord(usize),

    /// Handle already present in the board's collection.
    #[error("thread {0} is already registered")]
    DuplicateHandle(Address),

    /// The host does not know this board or thread.
    #[error("no board or thread at address {0}")]
    UnknownAddress(Address),
}

impl DomainError {
    pub fn out_of_range(index: usize, size: usize) -> Self {
        Self::OutOfRange { index, size }
    }
}

/// A specialized Result type for bump-board logic.
pub type DomainResult<T> = std::result::Result<T, DomainError>;
