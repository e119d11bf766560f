//! The storage backend contract.

use std::sync::Arc;

use async_trait::async_trait;
use dojang_core::{Revision, Table};

use crate::error::Result;

/// A table as read, with the revision a later write must match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Table contents.
    pub table: Table,
    /// Revision of `table`.
    pub revision: Revision,
}

impl Snapshot {
    /// Wraps a table, computing its revision.
    pub fn new(table: Table) -> Self {
        let revision = table.revision();
        Self { table, revision }
    }
}

/// Result of a successful read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The table exists.
    Found(Snapshot),
    /// The table (or its worksheet) does not exist yet.
    Missing,
}

impl ReadOutcome {
    /// Revision a write based on this read must be conditioned on.
    pub fn revision(&self) -> Revision {
        match self {
            ReadOutcome::Found(snapshot) => snapshot.revision.clone(),
            ReadOutcome::Missing => Revision::Absent,
        }
    }

    /// Number of data rows; 0 when missing.
    pub fn row_count(&self) -> usize {
        match self {
            ReadOutcome::Found(snapshot) => snapshot.table.len(),
            ReadOutcome::Missing => 0,
        }
    }

    /// The table read, or an empty one.
    pub fn into_table(self) -> Table {
        match self {
            ReadOutcome::Found(snapshot) => snapshot.table,
            ReadOutcome::Missing => Table::new(),
        }
    }
}

/// A place a whole table can be read from and written back to.
///
/// Backends hold exactly one table. Writes replace it in full and are
/// conditional on the revision the caller read.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Human-readable destination, used in messages and logs.
    fn describe(&self) -> String;

    /// Reads the full table.
    async fn read(&self) -> Result<ReadOutcome>;

    /// Replaces the full table with `table` if the stored revision still
    /// equals `expected`, returning the new revision.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`](crate::StoreError::Conflict) without
    /// writing if the table changed since it was read.
    async fn replace(&self, table: &Table, expected: &Revision) -> Result<Revision>;
}

#[async_trait]
impl<S: SheetStore + ?Sized> SheetStore for Arc<S> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    async fn read(&self) -> Result<ReadOutcome> {
        (**self).read().await
    }

    async fn replace(&self, table: &Table, expected: &Revision) -> Result<Revision> {
        (**self).replace(table, expected).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_outcome() {
        let outcome = ReadOutcome::Missing;
        assert_eq!(outcome.revision(), Revision::Absent);
        assert_eq!(outcome.row_count(), 0);
        assert!(outcome.into_table().columns().is_empty());
    }

    #[test]
    fn test_found_outcome() {
        let table = Table::from_grid(vec![
            vec!["h".to_string()],
            vec!["1".to_string()],
            vec!["2".to_string()],
        ]);
        let outcome = ReadOutcome::Found(Snapshot::new(table.clone()));
        assert_eq!(outcome.revision(), table.revision());
        assert_eq!(outcome.row_count(), 2);
        assert_eq!(outcome.into_table(), table);
    }
}
