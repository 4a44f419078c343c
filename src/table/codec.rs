//! Delimited text codec
//!
//! Decodes CSV payloads returned by the storage role into a header and typed
//! rows, and renders a header plus rows back into CSV for the client.
//!
//! Blank lines after the header are rows with a single absent cell. Line
//! endings may be `\n`, `\r\n` or a lone `\r`.

use csv::{QuoteStyle, ReaderBuilder, StringRecord, WriterBuilder};

use super::value::{Cell, Row};
use crate::error::{Error, Result};

fn malformed(err: csv::Error) -> Error {
    let line = err.position().map_or(0, |pos| pos.line() as usize);
    Error::MalformedCsv {
        line,
        reason: err.to_string(),
    }
}

fn field_cell(field: &str) -> Cell {
    if field.is_empty() {
        Cell::Null
    } else {
        Cell::infer(field)
    }
}

fn blank_row() -> Row {
    vec![Cell::Null]
}

fn is_terminator(b: u8) -> bool {
    b == b'\r' || b == b'\n'
}

/// Line terminators opening `gap`, counting `\r\n` once
fn leading_terminators(gap: &[u8]) -> usize {
    let mut count = 0;
    let mut i = 0;
    while i < gap.len() && is_terminator(gap[i]) {
        i += if gap[i] == b'\r' && gap.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
        count += 1;
    }
    count
}

/// Blank lines the reader stepped over in `consumed`.
///
/// `consumed` is the text read since the previous record ended and `prev` is
/// the last byte of that record. The reader skips blank lines silently, and
/// it may leave the previous record's terminator (or the `\n` of a `\r\n`)
/// at the start of `consumed`.
fn blank_lines(prev: Option<u8>, consumed: &[u8]) -> usize {
    let mut gap = consumed;
    if prev == Some(b'\r') && gap.first() == Some(&b'\n') {
        gap = &gap[1..];
    }

    let terminators = leading_terminators(gap);
    match prev {
        Some(b) if !is_terminator(b) => terminators.saturating_sub(1),
        _ => terminators,
    }
}

/// Decode CSV text into `(columns, rows)`.
///
/// The first record is the header; the remaining records become rows with
/// numeric inference applied to every cell and empty fields read as absent.
/// An empty payload yields an empty header and no rows.
pub fn decode(text: &str) -> Result<(Vec<String>, Vec<Row>)> {
    let bytes = text.as_bytes();
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut record = StringRecord::new();
    let mut columns: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    let mut end: usize = 0;

    while reader.read_record(&mut record).map_err(malformed)? {
        let next_end = (reader.position().byte() as usize).min(bytes.len());
        let prev = end.checked_sub(1).map(|i| bytes[i]);
        let blanks = blank_lines(prev, &bytes[end..next_end]);
        end = next_end;

        match columns {
            None => columns = Some(record.iter().map(str::to_string).collect()),
            Some(_) => {
                rows.extend(std::iter::repeat_with(blank_row).take(blanks));
                rows.push(record.iter().map(field_cell).collect());
            }
        }
    }

    let Some(columns) = columns else {
        return Ok((Vec::new(), Vec::new()));
    };

    let prev = end.checked_sub(1).map(|i| bytes[i]);
    let trailing = blank_lines(prev, &bytes[end..]);
    rows.extend(std::iter::repeat_with(blank_row).take(trailing));

    Ok((columns, rows))
}

/// Encode a header and rows as CSV text.
///
/// Rows are only meaningful alongside a header: an empty `columns` slice
/// always produces an empty string. Absent cells are written as empty fields.
pub fn encode(columns: &[String], rows: &[Row]) -> Result<String> {
    if columns.is_empty() {
        return Ok(String::new());
    }

    let mut writer = WriterBuilder::new()
        .flexible(true)
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new());

    writer.write_record(columns)?;
    for row in rows {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::IoError(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}
