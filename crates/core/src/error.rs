//! Error types for recdex
//!
//! This module defines the single error type shared by the store, the
//! indexer, the planner and the reindexer. We use `thiserror` for automatic
//! `Display` and `Error` trait implementations.
//!
//! A term shorter than the minimum prefix length is NOT an error; the
//! planner handles it as an ordinary unfiltered scan.

use crate::types::{RecordId, ScopeId};
use std::io;
use thiserror::Error;

/// Result type alias for recdex operations
pub type RecdexResult<T> = std::result::Result<T, RecdexError>;

/// Error types for recdex
#[derive(Debug, Error)]
pub enum RecdexError {
    /// Caller supplied a malformed request (page size, schema, config values)
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// What was wrong
        message: String,
    },

    /// The backing store could not be reached or rejected the call transiently
    #[error("Store unavailable: {message}")]
    StoreUnavailable {
        /// Backend failure description
        message: String,
    },

    /// The store cannot express the requested query shape
    #[error("Unsupported query: {reason}")]
    UnsupportedQuery {
        /// Which capability was exceeded
        reason: String,
    },

    /// An atomic batch exceeded the store's per-call operation limit
    #[error("Batch too large: {size} operations, store accepts at most {max}")]
    BatchTooLarge {
        /// Operations in the rejected batch
        size: usize,
        /// Store limit
        max: usize,
    },

    /// Update or delete of a record that does not exist
    #[error("Record not found: {scope}/{id}")]
    NotFound {
        /// Owning scope
        scope: ScopeId,
        /// Missing record
        id: RecordId,
    },

    /// Create of a record that already exists
    #[error("Record already exists: {scope}/{id}")]
    AlreadyExists {
        /// Owning scope
        scope: ScopeId,
        /// Existing record
        id: RecordId,
    },

    /// A cursor token could not be decoded
    #[error("Invalid cursor: {reason}")]
    InvalidCursor {
        /// Decode failure
        reason: String,
    },

    /// A cursor was presented for a different term, filter or sort signature
    #[error("Cursor signature {cursor} does not match query signature {query}")]
    CursorMismatch {
        /// Signature carried by the cursor
        cursor: String,
        /// Signature of the current request
        query: String,
    },

    /// Configuration could not be read or failed validation
    #[error("Configuration error: {message}")]
    Config {
        /// Details
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O error (config files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invariant violation inside recdex
    #[error("Internal error: {message}")]
    Internal {
        /// Details
        message: String,
    },
}

impl RecdexError {
    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        RecdexError::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a store unavailable error
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        RecdexError::StoreUnavailable {
            message: message.into(),
        }
    }

    /// Create an unsupported query error
    pub fn unsupported_query(reason: impl Into<String>) -> Self {
        RecdexError::UnsupportedQuery {
            reason: reason.into(),
        }
    }

    /// Create an invalid cursor error
    pub fn invalid_cursor(reason: impl Into<String>) -> Self {
        RecdexError::InvalidCursor {
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        RecdexError::Config {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        RecdexError::Internal {
            message: message.into(),
        }
    }

    /// Whether repeating the same call may succeed.
    ///
    /// Only transient backend failures qualify. Capability and precondition
    /// errors fail the same way on every attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RecdexError::StoreUnavailable { .. })
    }

    /// Whether the caller must restart pagination from the first page
    pub fn requires_restart(&self) -> bool {
        matches!(
            self,
            RecdexError::CursorMismatch { .. } | RecdexError::InvalidCursor { .. }
        )
    }
}

impl From<serde_json::Error> for RecdexError {
    fn from(e: serde_json::Error) -> Self {
        RecdexError::Serialization(e.to_string())
    }
}
