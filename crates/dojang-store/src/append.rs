//! Append-merge: read the whole table, add one row, write it back.

use dojang_core::{Record, Revision};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::{ReadOutcome, SheetStore};

/// What to do when the existing table cannot be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadFailurePolicy {
    /// Fail the append; nothing is written.
    #[default]
    Strict,
    /// Start from an empty table, as if the table were missing. The write
    /// is still conditioned on the table being absent, so an existing table
    /// that could not be read is never overwritten.
    Lenient,
}

/// What an append did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppendReport {
    /// Rows before the append.
    pub rows_before: usize,
    /// Rows after the append.
    pub rows_after: usize,
    /// Whether the table did not exist and was created.
    pub bootstrapped: bool,
    /// Read error that a lenient policy recovered from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovered_read_error: Option<String>,
    /// Columns the record added to the header.
    pub added_columns: Vec<String>,
    /// Header columns the record left empty.
    pub missing_columns: Vec<String>,
    /// Revision of the table as written.
    pub revision: Revision,
}

/// Appends `record` as the last row of the table in `store`.
///
/// Existing rows are kept in order and unchanged. The write is conditional
/// on the revision that was read, so a concurrent writer causes a conflict
/// rather than a lost row.
///
/// # Errors
///
/// Returns the backend's error if the read (under
/// [`ReadFailurePolicy::Strict`]) or the write fails; nothing is retried.
pub async fn append_record(
    store: &dyn SheetStore,
    record: &Record,
    policy: ReadFailurePolicy,
) -> Result<AppendReport> {
    let mut recovered_read_error = None;
    let outcome = match store.read().await {
        Ok(outcome) => outcome,
        Err(e) if policy == ReadFailurePolicy::Lenient => {
            tracing::warn!(store = %store.describe(), error = %e, "Read failed; starting from an empty table");
            recovered_read_error = Some(e.to_string());
            ReadOutcome::Missing
        }
        Err(e) => return Err(e),
    };

    let bootstrapped = matches!(outcome, ReadOutcome::Missing);
    let expected = outcome.revision();
    let mut table = outcome.into_table();
    let rows_before = table.len();

    let drift = table.append(record);
    if !drift.is_empty() {
        tracing::info!(
            store = %store.describe(),
            added = ?drift.added_columns,
            missing = ?drift.missing_columns,
            "Record columns differ from the stored header"
        );
    }

    let revision = store.replace(&table, &expected).await?;
    tracing::debug!(store = %store.describe(), rows_before, rows_after = table.len(), %revision, "Table replaced");

    Ok(AppendReport {
        rows_before,
        rows_after: table.len(),
        bootstrapped,
        recovered_read_error,
        added_columns: drift.added_columns,
        missing_columns: drift.missing_columns,
        revision,
    })
}
