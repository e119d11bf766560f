//! OAuth2 access tokens for Google APIs.
//!
//! [`ServiceAccountTokenProvider`] implements the JWT-bearer grant: it signs
//! a short-lived RS256 assertion with the service account's private key and
//! trades it for an access token at the key's token URI. The token is
//! reused until shortly before it expires.

use std::fmt;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::credentials::ServiceAccountKey;
use crate::error::{AuthError, Result};

/// Read-write access to spreadsheets.
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Grant type of the service-account token exchange.
pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for a signed assertion (Google's maximum).
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens are refreshed this long before they expire.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Source of bearer tokens for Google API calls.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a currently valid access token.
    async fn access_token(&self) -> Result<String>;
}

/// An access token and when it stops being valid.
#[derive(Clone)]
pub struct AccessToken {
    secret: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Creates a token.
    pub fn new(secret: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            secret: secret.into(),
            expires_at,
        }
    }

    /// The bearer value.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Expiry instant.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the token is usable at `now`, keeping a one-minute margin.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Hands out one fixed token.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    /// Creates a provider for `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

/// Claims of the signed assertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionClaims {
    /// Service-account email.
    pub iss: String,
    /// Space-separated scopes.
    pub scope: String,
    /// Token endpoint.
    pub aud: String,
    /// Issued at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Exchanges service-account assertions for access tokens, with caching.
pub struct ServiceAccountTokenProvider {
    key: ServiceAccountKey,
    scopes: Vec<String>,
    client: reqwest::Client,
    cached: RwLock<Option<AccessToken>>,
}

impl ServiceAccountTokenProvider {
    /// Creates a provider requesting `scopes`.
    pub fn new<I, S>(key: ServiceAccountKey, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key,
            scopes: scopes.into_iter().map(Into::into).collect(),
            client: reqwest::Client::new(),
            cached: RwLock::new(None),
        }
    }

    /// Creates a provider for the Sheets scope.
    pub fn for_sheets(key: ServiceAccountKey) -> Self {
        Self::new(key, [SHEETS_SCOPE])
    }

    /// Uses `client` for token requests.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// The key this provider signs with.
    pub fn key(&self) -> &ServiceAccountKey {
        &self.key
    }

    /// Claims of an assertion issued at `now`.
    pub fn claims(&self, now: DateTime<Utc>) -> AssertionClaims {
        let iat = now.timestamp();
        AssertionClaims {
            iss: self.key.client_email.clone(),
            scope: self.scopes.join(" "),
            aud: self.key.token_uri.clone(),
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        }
    }

    /// Signs an assertion issued at `now`.
    pub fn assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();
        let signing_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| AuthError::invalid_key(e.to_string()))?;
        encode(&header, &self.claims(now), &signing_key).map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Requests a new token from the token endpoint, bypassing the cache.
    pub async fn fetch(&self) -> Result<AccessToken> {
        let now = Utc::now();
        let assertion = self.assertion(now)?;
        tracing::debug!(token_uri = %self.key.token_uri, client_email = %self.key.client_email, "Requesting access token");

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| AuthError::Http(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::Http(e.to_string()))?;

        if !status.is_success() {
            let message = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(description) => format!("{}: {description}", err.error),
                    None => err.error,
                },
                Err(_) => body,
            };
            tracing::warn!(status = status.as_u16(), %message, "Token request rejected");
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| AuthError::MalformedResponse(e.to_string()))?;
        let lifetime = token.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS);
        Ok(AccessToken::new(token.access_token, now + Duration::seconds(lifetime)))
    }

    fn lookup_cached(&self, now: DateTime<Utc>) -> Option<String> {
        let cache = self.cached.read().ok()?;
        let token = cache.as_ref()?;
        token.is_fresh(now).then(|| token.secret.clone())
    }

    fn store(&self, token: AccessToken) {
        if let Ok(mut cache) = self.cached.write() {
            *cache = Some(token);
        }
    }
}

#[async_trait]
impl TokenProvider for ServiceAccountTokenProvider {
    async fn access_token(&self) -> Result<String> {
        if let Some(secret) = self.lookup_cached(Utc::now()) {
            return Ok(secret);
        }
        let token = self.fetch().await?;
        tracing::info!(expires_at = %token.expires_at(), "Obtained access token");
        let secret = token.secret.clone();
        self.store(token);
        Ok(secret)
    }
}
