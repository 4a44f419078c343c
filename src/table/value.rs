//! Cell and Row types for csvdb
//!
//! This module defines how table values are represented in memory. A cell is
//! numeric, textual or absent. Equality, hashing and ordering all agree with
//! each other so the same cell can key a hash bucket and a sorted run.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Lower bound of the `f64` range that converts losslessly into `i64` (-2^63)
const I64_LOWER: f64 = -9_223_372_036_854_775_808.0;
/// Exclusive upper bound of that range (2^63)
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

/// A single value in a row
#[derive(Debug, Clone)]
pub enum Cell {
    /// Absent value (missing column or empty unquoted field)
    Null,
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// Text value
    Text(String),
}

/// An ordered sequence of cells
pub type Row = Vec<Cell>;

/// Returns the integer a float represents exactly, if any.
fn float_as_i64(f: f64) -> Option<i64> {
    if f.fract() == 0.0 && (I64_LOWER..I64_UPPER).contains(&f) {
        Some(f as i64)
    } else {
        None
    }
}

fn cmp_floats(a: f64, b: f64) -> Ordering {
    // NaN sorts above every other number and equal to itself
    a.partial_cmp(&b)
        .unwrap_or_else(|| a.is_nan().cmp(&b.is_nan()))
}

fn cmp_int_float(a: i64, b: f64) -> Ordering {
    if b.is_nan() {
        return Ordering::Less;
    }
    match float_as_i64(b) {
        Some(b) => a.cmp(&b),
        None if b >= I64_UPPER => Ordering::Less,
        None if b < I64_LOWER => Ordering::Greater,
        None => (a as f64).partial_cmp(&b).unwrap_or(Ordering::Less),
    }
}

impl Cell {
    /// Build a cell from raw delimited text, inferring numbers.
    ///
    /// Decimal integers become `Integer`, decimal or exponent notation becomes
    /// `Float`, everything else stays `Text`. Spellings such as `inf` or `NaN`
    /// are not treated as numbers, and neither is anything that overflows to
    /// infinity.
    pub fn infer(raw: &str) -> Cell {
        if let Some(n) = parse_integer(raw) {
            return Cell::Integer(n);
        }
        if let Some(f) = parse_float(raw) {
            return Cell::Float(f);
        }
        Cell::Text(raw.to_string())
    }

    /// Check if this cell is absent
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Check if this cell holds a number
    pub fn is_numeric(&self) -> bool {
        matches!(self, Cell::Integer(_) | Cell::Float(_))
    }

    fn rank(&self) -> u8 {
        match self {
            Cell::Null => 0,
            Cell::Integer(_) | Cell::Float(_) => 1,
            Cell::Text(_) => 2,
        }
    }
}

fn parse_integer(raw: &str) -> Option<i64> {
    let digits = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

fn parse_float(raw: &str) -> Option<f64> {
    let has_digit = raw.bytes().any(|b| b.is_ascii_digit());
    let numeric_chars = raw
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !has_digit || !numeric_chars {
        return None;
    }
    raw.parse().ok().filter(|f: &f64| f.is_finite())
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Cell::Null => 0u8.hash(state),
            Cell::Integer(i) => {
                1u8.hash(state);
                i.hash(state);
            }
            Cell::Float(f) => match float_as_i64(*f) {
                // Integral floats hash like the integer they equal
                Some(i) => {
                    1u8.hash(state);
                    i.hash(state);
                }
                None if f.is_nan() => 2u8.hash(state),
                None => {
                    3u8.hash(state);
                    f.to_bits().hash(state);
                }
            },
            Cell::Text(s) => {
                4u8.hash(state);
                s.hash(state);
            }
        }
    }
}

/// Natural ordering: absent < numeric < text. Numbers compare by value
/// regardless of integer/float representation, text compares bytewise.
impl Ord for Cell {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Cell::Null, Cell::Null) => Ordering::Equal,
            (Cell::Integer(a), Cell::Integer(b)) => a.cmp(b),
            (Cell::Float(a), Cell::Float(b)) => cmp_floats(*a, *b),
            (Cell::Integer(a), Cell::Float(b)) => cmp_int_float(*a, *b),
            (Cell::Float(a), Cell::Integer(b)) => cmp_int_float(*b, *a).reverse(),
            (Cell::Text(a), Cell::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Integer(i) => write!(f, "{}", i),
            Cell::Float(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e16 => {
                write!(f, "{:.1}", n)
            }
            Cell::Float(n) => write!(f, "{}", n),
            Cell::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i32> for Cell {
    fn from(v: i32) -> Self {
        Cell::Integer(v as i64)
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Integer(v)
    }
}

impl From<usize> for Cell {
    fn from(v: usize) -> Self {
        Cell::Integer(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Float(v)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Cell::Text(v)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Cell::Null)
    }
}
