//! Error types for credential loading and token exchange.

use std::path::PathBuf;

/// Errors raised while loading credentials or obtaining an access token.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AuthError {
    /// No key path was given and `GOOGLE_APPLICATION_CREDENTIALS` is unset.
    #[error("no service-account key configured (set GOOGLE_APPLICATION_CREDENTIALS)")]
    MissingCredentials,

    /// The key file could not be read.
    #[error("cannot read service-account key {path}: {source}")]
    Io {
        /// Key file path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The key file is not a usable service-account key.
    #[error("invalid service-account key: {0}")]
    InvalidKey(String),

    /// The assertion could not be signed.
    #[error("cannot sign token assertion: {0}")]
    Signing(String),

    /// The token endpoint could not be reached.
    #[error("token request failed: {0}")]
    Http(String),

    /// The token endpoint refused the assertion.
    #[error("token endpoint rejected the request (HTTP {status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Error reported by the endpoint
        message: String,
    },

    /// The token endpoint answered with something other than a token.
    #[error("unexpected token response: {0}")]
    MalformedResponse(String),
}

/// Convenience `Result` type alias for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

impl AuthError {
    /// Creates an invalid-key error.
    pub fn invalid_key<S: Into<String>>(message: S) -> Self {
        AuthError::InvalidKey(message.into())
    }

    /// Returns whether the failure is a permission problem rather than a
    /// connectivity one.
    pub fn is_denied(&self) -> bool {
        matches!(self, AuthError::Rejected { status, .. } if *status == 400 || *status == 401 || *status == 403)
    }
}
