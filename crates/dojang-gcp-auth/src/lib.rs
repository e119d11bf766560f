#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod credentials;
pub mod error;
pub mod token;

pub use credentials::{ServiceAccountKey, CREDENTIALS_ENV, DEFAULT_TOKEN_URI};
pub use error::{AuthError, Result};
pub use token::{
    AccessToken, AssertionClaims, ServiceAccountTokenProvider, StaticTokenProvider, TokenProvider,
    JWT_BEARER_GRANT, SHEETS_SCOPE,
};
