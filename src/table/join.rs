//! Equi-join strategies
//!
//! Both strategies produce `left.columns ++ (right.columns - column)` and one
//! row per matching `(left, right)` pair. They differ only in cost and in the
//! order rows come out, so callers must not depend on row order.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::table::{cell_at, Table};
use super::value::{Cell, Row};

/// Algorithm used by the `join` command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinStrategy {
    /// Bucket the right side by key, probe with the left
    Hash,
    /// Sort both sides by key and merge matching runs
    #[default]
    SortMerge,
}

impl FromStr for JoinStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hash" => Ok(JoinStrategy::Hash),
            "sort_merge" | "sort-merge" | "merge" => Ok(JoinStrategy::SortMerge),
            other => Err(format!("unknown join strategy '{}'", other)),
        }
    }
}

impl fmt::Display for JoinStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinStrategy::Hash => write!(f, "hash"),
            JoinStrategy::SortMerge => write!(f, "sort_merge"),
        }
    }
}

/// Join column positions on both sides, if both have it
fn key_positions(left: &Table, right: &Table, column: &str) -> Option<(usize, usize)> {
    Some((left.position(column)?, right.position(column)?))
}

/// Left columns followed by the right columns minus the join column.
///
/// Only the right-hand occurrence the index resolves (the last one) is
/// dropped. Other columns sharing its name stay, so every joined row has
/// exactly one cell per column.
fn joined_columns(left: &Table, right: &Table, right_pos: usize) -> Vec<String> {
    let mut columns = left.columns().to_vec();
    columns.extend(
        right
            .columns()
            .iter()
            .enumerate()
            .filter(|(pos, _)| *pos != right_pos)
            .map(|(_, name)| name.clone()),
    );
    columns
}

fn combine(left: &Row, right: &Row, right_pos: usize) -> Row {
    let mut row = Vec::with_capacity(left.len() + right.len().saturating_sub(1));
    row.extend(left.iter().cloned());
    row.extend(
        right
            .iter()
            .enumerate()
            .filter(|(pos, _)| *pos != right_pos)
            .map(|(_, cell)| cell.clone()),
    );
    row
}

/// Hash join on `column`.
///
/// Returns an empty table when either side lacks the column. If the right
/// side repeats `column`, only its last occurrence is dropped from the output.
pub fn hash_join(left: &Table, right: &Table, column: &str) -> Table {
    let Some((left_pos, right_pos)) = key_positions(left, right, column) else {
        return Table::new();
    };

    // Build side: right
    let mut buckets: HashMap<&Cell, Vec<&Row>> = HashMap::new();
    for row in right.rows() {
        buckets.entry(cell_at(row, right_pos)).or_default().push(row);
    }

    // Probe side: left
    let mut rows = Vec::new();
    for l_row in left.rows() {
        if let Some(matches) = buckets.get(cell_at(l_row, left_pos)) {
            for r_row in matches {
                rows.push(combine(l_row, r_row, right_pos));
            }
        }
    }

    Table::from_parts(joined_columns(left, right, right_pos), rows)
}

fn sorted_by_key(rows: &[Row], pos: usize) -> Vec<&Row> {
    let mut sorted: Vec<&Row> = rows.iter().collect();
    sorted.sort_by(|a, b| cell_at(a, pos).cmp(cell_at(b, pos)));
    sorted
}

/// End (exclusive) of the run of rows sharing the key at `start`
fn run_end(rows: &[&Row], start: usize, pos: usize) -> usize {
    let key = cell_at(rows[start], pos);
    start
        + rows[start..]
            .iter()
            .take_while(|row| cell_at(row, pos) == key)
            .count()
}

/// Sort-merge join on `column`.
///
/// Returns an empty table when either side lacks the column. The output
/// layout matches [`hash_join`].
pub fn sort_merge_join(left: &Table, right: &Table, column: &str) -> Table {
    let Some((left_pos, right_pos)) = key_positions(left, right, column) else {
        return Table::new();
    };

    let left_sorted = sorted_by_key(left.rows(), left_pos);
    let right_sorted = sorted_by_key(right.rows(), right_pos);

    let mut rows = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < left_sorted.len() && j < right_sorted.len() {
        let left_key = cell_at(left_sorted[i], left_pos);
        let right_key = cell_at(right_sorted[j], right_pos);

        match left_key.cmp(right_key) {
            Ordering::Less => i = run_end(&left_sorted, i, left_pos),
            Ordering::Greater => j = run_end(&right_sorted, j, right_pos),
            Ordering::Equal => {
                let i_end = run_end(&left_sorted, i, left_pos);
                let j_end = run_end(&right_sorted, j, right_pos);
                for l_row in &left_sorted[i..i_end] {
                    for r_row in &right_sorted[j..j_end] {
                        rows.push(combine(l_row, r_row, right_pos));
                    }
                }
                i = i_end;
                j = j_end;
            }
        }
    }

    Table::from_parts(joined_columns(left, right, right_pos), rows)
}
