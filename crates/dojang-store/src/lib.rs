#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod append;
pub mod error;
pub mod file;
pub mod memory;
pub mod store;
pub mod submit;

pub use append::{append_record, AppendReport, ReadFailurePolicy};
pub use error::{Result, StoreError};
pub use file::CsvStore;
pub use memory::MemoryStore;
pub use store::{ReadOutcome, SheetStore, Snapshot};
pub use submit::{SubmissionOutcome, SubmissionService, SubmitError};
