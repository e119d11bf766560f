#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod routes;
pub mod server;

pub use error::{ApiError, Result};
pub use routes::{router, AppState, Health};
pub use server::{BoundServer, Server};
