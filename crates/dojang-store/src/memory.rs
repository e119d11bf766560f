//! In-memory table store.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dojang_core::{Revision, Table};
use tokio::sync::Mutex;

use crate::error::{Result, StoreError};
use crate::store::{ReadOutcome, SheetStore, Snapshot};

#[derive(Debug, Default)]
struct State {
    table: Option<Table>,
    read_failure: Option<String>,
    write_failure: Option<String>,
}

/// Holds one table in memory.
///
/// The revision check and the write happen under one lock, so concurrent
/// writers cannot lose each other's rows. Failures can be injected to
/// exercise error paths.
#[derive(Debug)]
pub struct MemoryStore {
    name: String,
    state: Mutex<State>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryStore {
    /// Creates a store with no table.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(State::default()),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    /// Creates a store already holding `table`.
    pub fn with_table(name: impl Into<String>, table: Table) -> Self {
        Self {
            state: Mutex::new(State {
                table: Some(table),
                ..State::default()
            }),
            ..Self::new(name)
        }
    }

    /// Current table, if any.
    pub async fn table(&self) -> Option<Table> {
        self.state.lock().await.table.clone()
    }

    /// Makes every read fail as unavailable until [`heal`](Self::heal).
    pub async fn fail_reads(&self, message: impl Into<String>) {
        self.state.lock().await.read_failure = Some(message.into());
    }

    /// Makes every write fail as unavailable until [`heal`](Self::heal).
    pub async fn fail_writes(&self, message: impl Into<String>) {
        self.state.lock().await.write_failure = Some(message.into());
    }

    /// Clears injected failures.
    pub async fn heal(&self) {
        let mut state = self.state.lock().await;
        state.read_failure = None;
        state.write_failure = None;
    }

    /// Number of read attempts so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of write attempts so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new("memory")
    }
}

#[async_trait]
impl SheetStore for MemoryStore {
    fn describe(&self) -> String {
        self.name.clone()
    }

    async fn read(&self) -> Result<ReadOutcome> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().await;
        if let Some(message) = &state.read_failure {
            return Err(StoreError::unavailable(message.clone()));
        }
        Ok(match &state.table {
            Some(table) => ReadOutcome::Found(Snapshot::new(table.clone())),
            None => ReadOutcome::Missing,
        })
    }

    async fn replace(&self, table: &Table, expected: &Revision) -> Result<Revision> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().await;
        if let Some(message) = &state.write_failure {
            return Err(StoreError::unavailable(message.clone()));
        }
        let actual = state
            .table
            .as_ref()
            .map_or(Revision::Absent, Table::revision);
        if actual != *expected {
            return Err(StoreError::Conflict {
                expected: expected.clone(),
                actual,
            });
        }
        let revision = table.revision();
        state.table = Some(table.clone());
        Ok(revision)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn table(rows: &[&str]) -> Table {
        let mut grid = vec![vec!["Name".to_string()]];
        grid.extend(rows.iter().map(|r| vec![r.to_string()]));
        Table::from_grid(grid)
    }

    #[tokio::test]
    async fn test_empty_store_reads_missing() {
        let store = MemoryStore::default();
        assert_eq!(store.read().await.unwrap(), ReadOutcome::Missing);
        assert_eq!(store.reads(), 1);
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_replace_with_matching_revision() {
        let store = MemoryStore::with_table("m", table(&["A"]));
        let revision = store.read().await.unwrap().revision();
        let next = table(&["A", "B"]);
        let new_revision = store.replace(&next, &revision).await.unwrap();
        assert_eq!(new_revision, next.revision());
        assert_eq!(store.table().await, Some(next));
    }

    #[tokio::test]
    async fn test_replace_with_stale_revision_conflicts() {
        let store = MemoryStore::with_table("m", table(&["A"]));
        let err = store
            .replace(&table(&["B"]), &Revision::Absent)
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(store.table().await, Some(table(&["A"])));
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let store = MemoryStore::default();
        store.fail_reads("network down").await;
        let err = store.read().await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(ref m) if m == "network down"));

        store.heal().await;
        store.fail_writes("quota").await;
        assert!(store.read().await.is_ok());
        assert!(store.replace(&table(&["A"]), &Revision::Absent).await.is_err());
        assert_eq!(store.table().await, None);
    }
}
