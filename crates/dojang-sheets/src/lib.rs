#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod range;
pub mod store;

pub use store::{GoogleSheetStore, DEFAULT_BASE_URL, DEFAULT_WORKSHEET};
