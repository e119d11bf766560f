//! Service-account key files.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{AuthError, Result};

/// Environment variable naming the key file when no path is configured.
pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Token endpoint used when the key file does not name one.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const SERVICE_ACCOUNT: &str = "service_account";

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// A Google service-account key, as downloaded from the Cloud console.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    /// Key type; must be `service_account`.
    #[serde(rename = "type")]
    pub key_type: String,
    /// Owning project.
    #[serde(default)]
    pub project_id: Option<String>,
    /// Key id, sent as the assertion's `kid`.
    #[serde(default)]
    pub private_key_id: Option<String>,
    /// PEM-encoded RSA private key.
    pub private_key: String,
    /// Service-account email; the assertion's issuer.
    pub client_email: String,
    /// Numeric client id.
    #[serde(default)]
    pub client_id: Option<String>,
    /// Token endpoint; the assertion's audience.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("key_type", &self.key_type)
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"<redacted>")
            .field("client_email", &self.client_email)
            .field("client_id", &self.client_id)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountKey {
    /// Parses a key from its JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let key: Self =
            serde_json::from_str(json).map_err(|e| AuthError::invalid_key(e.to_string()))?;
        key.check()?;
        Ok(key)
    }

    /// Reads and parses a key file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| AuthError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let key = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), client_email = %key.client_email, "Loaded service-account key");
        Ok(key)
    }

    /// Loads the key from `explicit`, or from the file named by
    /// `GOOGLE_APPLICATION_CREDENTIALS`.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = locate(explicit, std::env::var_os(CREDENTIALS_ENV))?;
        Self::from_file(&path)
    }

    fn check(&self) -> Result<()> {
        if self.key_type != SERVICE_ACCOUNT {
            return Err(AuthError::invalid_key(format!(
                "expected type '{SERVICE_ACCOUNT}', found '{}'",
                self.key_type
            )));
        }
        if self.client_email.trim().is_empty() {
            return Err(AuthError::invalid_key("client_email is empty"));
        }
        if !self.private_key.contains("PRIVATE KEY") {
            return Err(AuthError::invalid_key("private_key is not a PEM key"));
        }
        Ok(())
    }
}

/// Picks the key path: the explicit one first, then the environment value.
pub fn locate(explicit: Option<&Path>, env_value: Option<OsString>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    match env_value {
        Some(value) if !value.is_empty() => Ok(PathBuf::from(value)),
        _ => Err(AuthError::MissingCredentials),
    }
}
