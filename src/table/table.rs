//! Relational table
//!
//! A table is the mutable dataset a query works on: ordered column names, an
//! index from column name to position, and ordered rows. Every query command
//! transforms the table in place.

use std::cmp::Ordering;
use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::{debug, warn};

use super::codec;
use super::join::{self, JoinStrategy};
use super::value::{Cell, Row};
use crate::error::Result;
use crate::storage::Source;

/// Column name of the counter produced by `count_by`
pub const COUNT_COLUMN: &str = "count";

/// An in-memory table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Column names, duplicates allowed
    columns: Vec<String>,
    /// Column name -> position, derived from `columns`
    index: HashMap<String, usize>,
    /// Rows of cells
    rows: Vec<Row>,
}

/// Derive the name -> position index. Later duplicates shadow earlier ones.
fn build_index(columns: &[String]) -> HashMap<String, usize> {
    columns
        .iter()
        .enumerate()
        .map(|(pos, name)| (name.clone(), pos))
        .collect()
}

/// Cell at `pos`, absent when the row is too short
pub(crate) fn cell_at(row: &Row, pos: usize) -> &Cell {
    static ABSENT: Cell = Cell::Null;
    row.get(pos).unwrap_or(&ABSENT)
}

/// Numbers descending, everything else after them in original order
fn descending_numeric(a: &Cell, b: &Cell) -> Ordering {
    match (a.is_numeric(), b.is_numeric()) {
        (true, true) => b.cmp(a),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => Ordering::Equal,
    }
}

impl Table {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table from a header and rows
    pub fn from_parts(columns: Vec<String>, rows: Vec<Row>) -> Self {
        let mut table = Self::new();
        table.set_columns(columns);
        table.rows = rows;
        table
    }

    /// Clear columns, index and rows
    pub fn reset(&mut self) {
        self.columns.clear();
        self.index.clear();
        self.rows.clear();
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn index(&self) -> &HashMap<String, usize> {
        &self.index
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Position of a column, if present
    pub fn position(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    /// Replace the header and re-derive the index
    pub fn set_columns(&mut self, columns: Vec<String>) {
        self.index = build_index(&columns);
        self.columns = columns;
    }

    /// Render the table as CSV
    pub fn to_csv(&self) -> Result<String> {
        codec::encode(&self.columns, &self.rows)
    }

    /// Populate the table from the storage collaborator.
    ///
    /// An empty reply leaves the table untouched, as does a payload that is not
    /// valid CSV. Only transport failures are returned as errors.
    pub fn load(&mut self, source: &mut dyn Source, id: &str) -> Result<()> {
        let content = source.fetch(id)?;
        if content.is_empty() {
            debug!(source = id, "empty response, table unchanged");
            return Ok(());
        }

        match codec::decode(&content) {
            Ok((columns, rows)) => {
                debug!(source = id, columns = columns.len(), rows = rows.len(), "loaded table");
                self.set_columns(columns);
                self.rows = rows;
            }
            Err(e) => warn!(source = id, error = %e, "discarding malformed payload"),
        }
        Ok(())
    }

    /// Project onto `columns`, in the given order.
    ///
    /// Unknown names produce absent cells; duplicates are kept.
    pub fn select(&mut self, columns: &[String]) {
        let positions: Vec<Option<usize>> = columns.iter().map(|c| self.position(c)).collect();

        for row in &mut self.rows {
            let projected: Row = positions
                .iter()
                .map(|pos| pos.map_or(Cell::Null, |pos| cell_at(row, pos).clone()))
                .collect();
            *row = projected;
        }

        self.set_columns(columns.to_vec());
    }

    /// Keep the first `limit` rows; negative limits keep none
    pub fn take(&mut self, limit: i64) {
        let keep = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        self.rows.truncate(keep);
    }

    /// Stable sort, numeric values high to low, non-numeric values last.
    ///
    /// Unknown columns leave the table untouched.
    pub fn order_by(&mut self, column: &str) {
        let Some(pos) = self.position(column) else {
            return;
        };

        self.rows
            .sort_by(|a, b| descending_numeric(cell_at(a, pos), cell_at(b, pos)));
    }

    /// Number of rows per distinct value of `column`, in first-seen order
    pub fn counts(&self, column: &str) -> IndexMap<Cell, usize> {
        let mut counts = IndexMap::new();
        let Some(pos) = self.position(column) else {
            return counts;
        };

        for row in &self.rows {
            *counts.entry(cell_at(row, pos).clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Replace the table with `[column, count]` rows
    pub fn count_by(&mut self, column: &str) {
        let counts = self.counts(column);

        self.set_columns(vec![column.to_string(), COUNT_COLUMN.to_string()]);
        self.rows = counts
            .into_iter()
            .map(|(value, count)| vec![value, Cell::from(count)])
            .collect();
    }

    /// Join against the table stored under `id` on `column`.
    ///
    /// The table resets to empty if either side lacks the column.
    pub fn join(
        &mut self,
        source: &mut dyn Source,
        id: &str,
        column: &str,
        strategy: JoinStrategy,
    ) -> Result<()> {
        let mut right = Table::new();
        right.load(source, id)?;

        *self = match strategy {
            JoinStrategy::Hash => join::hash_join(self, &right, column),
            JoinStrategy::SortMerge => join::sort_merge_join(self, &right, column),
        };
        Ok(())
    }

    /// Replace this table with the hash join of `left` and `right`
    pub fn hash_join(&mut self, left: &Table, right: &Table, column: &str) {
        *self = join::hash_join(left, right, column);
    }

    /// Replace this table with the sort-merge join of `left` and `right`
    pub fn sort_merge(&mut self, left: &Table, right: &Table, column: &str) {
        *self = join::sort_merge_join(left, right, column);
    }
}
