//! Error types for dojang-cli.

use std::path::{Path, PathBuf};

/// Result type alias for dojang-cli operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in dojang-cli.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Configuration is missing, unreadable or inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A file could not be read or written.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Offending path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// An input file could not be parsed.
    #[error("Cannot parse {path}: {message}")]
    Parse {
        /// Offending path
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// Error from dojang-core
    #[error(transparent)]
    Core(#[from] dojang_core::Error),

    /// Error from dojang-gcp-auth
    #[error("Credentials error: {0}")]
    Auth(#[from] dojang_gcp_auth::AuthError),

    /// Error from a store
    #[error("Store error: {0}")]
    Store(#[from] dojang_store::StoreError),

    /// A submission failed
    #[error(transparent)]
    Submit(#[from] dojang_store::SubmitError),

    /// The API server failed
    #[error(transparent)]
    Api(#[from] dojang_api::ApiError),
}

impl Error {
    /// Creates a configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config(message.into())
    }

    /// Wraps an I/O error with the path it concerns.
    pub fn io_with_path(source: std::io::Error, path: &Path) -> Self {
        Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Creates a parse error.
    pub fn parse<M: ToString>(path: &Path, message: M) -> Self {
        Error::Parse {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }
}
