//! CSV file table store.
//!
//! The first CSV record is the header. Writes take a sibling lock file,
//! re-check the revision, write a temporary file in the same directory and
//! rename it over the original, so readers never see a half-written table.
//! A lock file left behind by a crashed writer is broken once it is older
//! than any write could take.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dojang_core::{Revision, Table};

use crate::error::{Result, StoreError};
use crate::store::{ReadOutcome, SheetStore, Snapshot};

const LOCK_TIMEOUT: Duration = Duration::from_secs(5);
const LOCK_POLL: Duration = Duration::from_millis(10);
const LOCK_STALE_AFTER: Duration = Duration::from_secs(30);

/// Keeps the table in a CSV file.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    /// Creates a store for `path`; the file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The CSV file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SheetStore for CsvStore {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn read(&self) -> Result<ReadOutcome> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_file(&path))
            .await
            .map_err(|e| StoreError::unavailable(format!("read task failed: {e}")))?
    }

    async fn replace(&self, table: &Table, expected: &Revision) -> Result<Revision> {
        let path = self.path.clone();
        let lock = self.lock_path();
        let table = table.clone();
        let expected = expected.clone();
        tokio::task::spawn_blocking(move || {
            let _guard = LockFile::acquire(&lock)?;
            let actual = read_file(&path)?.revision();
            if actual != expected {
                return Err(StoreError::Conflict { expected, actual });
            }
            write_file(&path, &table)?;
            Ok(table.revision())
        })
        .await
        .map_err(|e| StoreError::unavailable(format!("write task failed: {e}")))?
    }
}

fn io_error(path: &Path, err: std::io::Error) -> StoreError {
    match err.kind() {
        ErrorKind::PermissionDenied => {
            StoreError::permission_denied(format!("{}: {err}", path.display()))
        }
        _ => StoreError::Io(err),
    }
}

fn read_file(path: &Path) -> Result<ReadOutcome> {
    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ReadOutcome::Missing),
        Err(e) => return Err(io_error(path, e)),
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| match e.kind() {
            csv::ErrorKind::Io(_) => StoreError::unavailable(format!("{}: {e}", path.display())),
            _ => StoreError::malformed(format!("{}: {e}", path.display())),
        })?;
        grid.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }
    if let Some(first) = grid.first_mut().and_then(|header| header.first_mut()) {
        if let Some(stripped) = first.strip_prefix('\u{feff}') {
            *first = stripped.to_string();
        }
    }
    Ok(ReadOutcome::Found(Snapshot::new(Table::from_grid(grid))))
}

fn write_file(path: &Path, table: &Table) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(|e| io_error(&dir, e))?;

    let tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| io_error(&dir, e))?;
    let mut writer = csv::Writer::from_writer(tmp);
    for row in table.to_grid() {
        writer
            .write_record(&row)
            .map_err(|e| StoreError::unavailable(e.to_string()))?;
    }
    let tmp = writer
        .into_inner()
        .map_err(|e| StoreError::unavailable(e.to_string()))?;
    tmp.as_file().sync_all().map_err(|e| io_error(path, e))?;
    tmp.persist(path).map_err(|e| io_error(path, e.error))?;
    tracing::debug!(path = %path.display(), rows = table.len(), "Wrote CSV table");
    Ok(())
}

/// Exclusive write lock held for the lifetime of the guard.
///
/// The file holds the owner's process id so a stuck lock can be traced.
struct LockFile {
    path: PathBuf,
}

impl LockFile {
    fn acquire(path: &Path) -> Result<Self> {
        let started = Instant::now();
        loop {
            match OpenOptions::new().write(true).create_new(true).open(path) {
                Ok(mut file) => {
                    let guard = Self {
                        path: path.to_path_buf(),
                    };
                    writeln!(file, "{}", std::process::id()).map_err(|e| io_error(path, e))?;
                    return Ok(guard);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if lock_age(path).is_some_and(|age| age >= LOCK_STALE_AFTER) {
                        break_stale_lock(path)?;
                        continue;
                    }
                    if started.elapsed() >= LOCK_TIMEOUT {
                        return Err(StoreError::unavailable(format!(
                            "{} is held by another writer",
                            path.display()
                        )));
                    }
                    thread::sleep(LOCK_POLL);
                }
                Err(e) => return Err(io_error(path, e)),
            }
        }
    }
}

fn lock_age(path: &Path) -> Option<Duration> {
    fs::metadata(path).ok()?.modified().ok()?.elapsed().ok()
}

fn break_stale_lock(path: &Path) -> Result<()> {
    let holder = fs::read_to_string(path).unwrap_or_default();
    tracing::warn!(
        path = %path.display(),
        holder = holder.trim(),
        "Breaking stale lock file"
    );
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_error(path, e)),
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove lock file");
        }
    }
}
