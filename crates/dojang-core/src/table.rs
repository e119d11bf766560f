//! Records, history tables and table revisions.
//!
//! A [`Table`] is a header plus rows of string cells, exactly what a
//! worksheet holds. Appending a [`Record`] never touches existing cells: if
//! the record brings columns the table lacks, the header grows and older
//! rows read as empty in the new columns.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One row to append: an ordered list of `(column, value)` cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    cells: Vec<(String, String)>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a cell. A repeated column replaces the earlier value in place.
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(c, _)| *c == column) {
            Some(cell) => cell.1 = value,
            None => self.cells.push((column, value)),
        }
    }

    /// Value of `column`, if present.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    /// Column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(c, _)| c.as_str())
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the record has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Column changes caused by appending a record whose columns differ from
/// the table's.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaDrift {
    /// Columns the record introduced; existing rows are empty there.
    pub added_columns: Vec<String>,
    /// Table columns the record did not supply; the new row is empty there.
    pub missing_columns: Vec<String>,
}

impl SchemaDrift {
    /// Whether the record matched the table's columns exactly.
    pub fn is_empty(&self) -> bool {
        self.added_columns.is_empty() && self.missing_columns.is_empty()
    }
}

/// A history table: header and rows of cells.
///
/// Deserializing goes through [`Table::from_parts`], so every row is as
/// wide as the header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TableParts")]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

#[derive(Deserialize)]
struct TableParts {
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    rows: Vec<Vec<String>>,
}

impl From<TableParts> for Table {
    fn from(parts: TableParts) -> Self {
        Table::from_parts(parts.columns, parts.rows)
    }
}

impl Table {
    /// Creates an empty table with no columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from a header and rows.
    ///
    /// Short rows are padded with empty cells. Rows longer than the header
    /// extend it with `Unnamed: <index>` columns, so no cell is lost.
    pub fn from_parts(mut columns: Vec<String>, mut rows: Vec<Vec<String>>) -> Self {
        let width = rows
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(columns.len());
        while columns.len() < width {
            columns.push(format!("Unnamed: {}", columns.len()));
        }
        for row in &mut rows {
            row.resize(width, String::new());
        }
        Self { columns, rows }
    }

    /// Builds a table from a grid whose first row is the header.
    pub fn from_grid(mut grid: Vec<Vec<String>>) -> Self {
        if grid.is_empty() {
            return Self::new();
        }
        let header = grid.remove(0);
        Self::from_parts(header, grid)
    }

    /// The table as a grid: header first, then rows.
    ///
    /// A table without columns yields an empty grid.
    pub fn to_grid(&self) -> Vec<Vec<String>> {
        if self.columns.is_empty() {
            return Vec::new();
        }
        let mut grid = Vec::with_capacity(self.rows.len() + 1);
        grid.push(self.columns.clone());
        grid.extend(self.rows.iter().cloned());
        grid
    }

    /// Column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Data rows, in insertion order.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value at `row` in `column`.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(index).map(String::as_str)
    }

    /// Appends `record` as the last row.
    ///
    /// Existing rows keep their values and order. Columns the record brings
    /// are added to the header; cells the record lacks are left empty.
    pub fn append(&mut self, record: &Record) -> SchemaDrift {
        let mut drift = SchemaDrift::default();
        let fresh = self.columns.is_empty();

        for column in record.columns() {
            if !self.columns.iter().any(|c| c == column) {
                self.columns.push(column.to_string());
                drift.added_columns.push(column.to_string());
            }
        }
        let width = self.columns.len();
        if !drift.added_columns.is_empty() {
            for row in &mut self.rows {
                row.resize(width, String::new());
            }
        }

        let row = self
            .columns
            .iter()
            .map(|column| match record.get(column) {
                Some(value) => value.to_string(),
                None => {
                    drift.missing_columns.push(column.clone());
                    String::new()
                }
            })
            .collect();
        self.rows.push(row);

        // A fresh table adopts the record's columns; that is not drift.
        if fresh {
            drift.added_columns.clear();
        }
        drift
    }

    /// Content digest over header and cells.
    ///
    /// Cells are length-prefixed, so `["ab", "c"]` and `["a", "bc"]` differ.
    pub fn digest(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(self.columns.len() as u64).to_le_bytes());
        hasher.update(&(self.rows.len() as u64).to_le_bytes());
        for cell in self.columns.iter().chain(self.rows.iter().flatten()) {
            hasher.update(&(cell.len() as u64).to_le_bytes());
            hasher.update(cell.as_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }

    /// The revision of this table as stored.
    pub fn revision(&self) -> Revision {
        Revision::Digest(self.digest())
    }
}

/// Which version of a stored table a write was based on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "digest", rename_all = "snake_case")]
pub enum Revision {
    /// The table did not exist.
    Absent,
    /// The table existed with this content digest.
    Digest(String),
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Revision::Absent => write!(f, "absent"),
            Revision::Digest(d) => write!(f, "{}", &d[..d.len().min(12)]),
        }
    }
}
