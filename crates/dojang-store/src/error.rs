//! Error types for table storage.

use dojang_core::Revision;

/// Errors raised by a [`SheetStore`](crate::SheetStore) backend.
///
/// "The table does not exist yet" is not an error; backends report it as
/// [`ReadOutcome::Missing`](crate::ReadOutcome::Missing).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// The backend could not be reached or failed while serving the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The backend refused access.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The table changed between read and write; nothing was written.
    #[error("table changed since it was read (expected revision {expected}, found {actual})")]
    Conflict {
        /// Revision the write was based on
        expected: Revision,
        /// Revision found at write time
        actual: Revision,
    },

    /// The stored data could not be interpreted as a table.
    #[error("malformed table: {0}")]
    Malformed(String),

    /// Local I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Credentials could not be obtained.
    #[error("authentication failed: {0}")]
    Auth(String),
}

/// Convenience `Result` type alias for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Creates an unavailable error.
    pub fn unavailable<S: Into<String>>(message: S) -> Self {
        StoreError::Unavailable(message.into())
    }

    /// Creates a permission-denied error.
    pub fn permission_denied<S: Into<String>>(message: S) -> Self {
        StoreError::PermissionDenied(message.into())
    }

    /// Creates a malformed-table error.
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        StoreError::Malformed(message.into())
    }

    /// Returns whether this is a revision conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}
