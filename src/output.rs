//! Response Formatting
//!
//! This module turns raw engine response lines into readable text.
//! Formatting never fails: when a response cannot be parsed, or does not have
//! the expected shape, the raw text is returned unchanged.
//!
//! # Renderings
//! - [`normalize`]: generic JSON, re-indented with four spaces
//! - [`normalize_stream`]: several JSON documents from a batch run
//! - [`format_select`]: one record block per row of a `select` result
//!
//! # Select Response Shape
//! ```text
//! [[status, start_time, elapsed, ...],
//!  [[[hits],
//!    [["column", "Type"], ...],
//!    [value, ...],          <- rows, present only when hits > 0
//!    ...]]]
//! ```

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Deserializer, Serializer, Value};
use tracing::debug;

use crate::error::{GrnshError, Result};

/// Indentation used by [`normalize`]
const INDENT: &[u8] = b"    ";

/// Width of the row banner line
pub const BANNER_WIDTH: usize = 70;

/// Fill character of the row banner line
pub const BANNER_FILL: char = '*';

/// Extra right-alignment applied to column names
const COLUMN_PADDING: usize = 3;

/// Pretty-print a JSON response, or return it unchanged if it is not JSON
#[must_use]
pub fn normalize(raw: &str) -> String {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => pretty(&value).unwrap_or_else(|| raw.to_string()),
        Err(_) => raw.to_string(),
    }
}

/// Pretty-print a stream of JSON documents from a batch run
///
/// Documents are rendered like [`normalize`] and joined with newlines.
/// If any document fails to parse, or there is none, the raw output is
/// returned unchanged.
#[must_use]
pub fn normalize_stream(raw: &str) -> String {
    let documents: std::result::Result<Vec<Value>, _> =
        Deserializer::from_str(raw).into_iter::<Value>().collect();

    match documents {
        Ok(documents) if !documents.is_empty() => documents
            .iter()
            .map(pretty)
            .collect::<Option<Vec<_>>>()
            .map_or_else(|| raw.to_string(), |rendered| rendered.join("\n")),
        _ => raw.to_string(),
    }
}

/// Render a `select` response as row records, or return it unchanged
#[must_use]
pub fn format_select(raw: &str) -> String {
    match SelectResponse::parse(raw) {
        Ok(response) => response.render(),
        Err(e) => {
            debug!(target: "grnsh::output", error = %e, "not a select response, showing raw text");
            raw.to_string()
        }
    }
}

/// Serialize with [`INDENT`], leaving non-ASCII characters unescaped
fn pretty(value: &Value) -> Option<String> {
    let mut buffer = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT));
    value.serialize(&mut serializer).ok()?;
    String::from_utf8(buffer).ok()
}

/// A result column: name and engine type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub type_name: String,
}

/// A validated `select` response
#[derive(Debug, Clone, PartialEq)]
pub struct SelectResponse {
    /// Elapsed seconds as reported by the engine
    pub elapsed: serde_json::Number,

    /// Total number of matching records (may exceed `rows.len()`)
    pub hits: u64,

    /// Ordered output columns
    pub columns: Vec<Column>,

    /// Returned rows, each aligned with `columns`
    pub rows: Vec<Vec<Value>>,
}

impl SelectResponse {
    /// Parse and validate a raw response line
    ///
    /// # Errors
    /// `MalformedResponse` if the text is not JSON or does not have the
    /// select response shape.
    pub fn parse(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| GrnshError::malformed_response(format!("invalid JSON: {e}")))?;
        Self::from_value(&value)
    }

    /// Validate an already parsed response
    ///
    /// # Errors
    /// `MalformedResponse` if any expected position is missing or has the wrong type.
    pub fn from_value(value: &Value) -> Result<Self> {
        let elapsed = match value.pointer("/0/2") {
            Some(Value::Number(n)) => n.clone(),
            _ => return Err(shape_error("header has no elapsed time at [0][2]")),
        };

        let block = value
            .pointer("/1/0")
            .and_then(Value::as_array)
            .ok_or_else(|| shape_error("no result block at [1][0]"))?;

        let hits = block
            .first()
            .and_then(|meta| meta.get(0))
            .and_then(Value::as_u64)
            .ok_or_else(|| shape_error("no hit count at [1][0][0][0]"))?;

        let columns = block
            .get(1)
            .and_then(Value::as_array)
            .ok_or_else(|| shape_error("no column list at [1][0][1]"))?
            .iter()
            .map(parse_column)
            .collect::<Result<Vec<_>>>()?;

        let rows = if hits == 0 {
            Vec::new()
        } else {
            block
                .iter()
                .skip(2)
                .map(|row| parse_row(row, columns.len()))
                .collect::<Result<Vec<_>>>()?
        };

        Ok(Self { elapsed, hits, columns, rows })
    }

    /// Render row banners, `column: value` lines and the summary line
    #[must_use]
    pub fn render(&self) -> String {
        let width = self.columns.iter().map(|c| c.name.chars().count()).max().unwrap_or(0)
            + COLUMN_PADDING;

        let mut lines = Vec::new();
        for (index, row) in self.rows.iter().enumerate() {
            lines.push(banner(index + 1));
            for (column, value) in self.columns.iter().zip(row) {
                lines.push(format!("{:>width$}: {}", column.name, display_value(value)));
            }
        }
        lines.push(self.summary());
        lines.join("\n")
    }

    /// `"<rows> records / <hits> hits (<elapsed> sec)"`
    #[must_use]
    pub fn summary(&self) -> String {
        format!("{} records / {} hits ({} sec)", self.rows.len(), self.hits, self.elapsed)
    }
}

fn shape_error(message: &str) -> GrnshError {
    GrnshError::malformed_response(format!("select response {message}"))
}

fn parse_column(value: &Value) -> Result<Column> {
    let name = value
        .get(0)
        .and_then(Value::as_str)
        .ok_or_else(|| shape_error("column entry has no name"))?;
    let type_name = value.get(1).and_then(Value::as_str).unwrap_or_default();
    Ok(Column { name: name.to_string(), type_name: type_name.to_string() })
}

fn parse_row(value: &Value, column_count: usize) -> Result<Vec<Value>> {
    let row = value.as_array().ok_or_else(|| shape_error("row is not an array"))?;
    if row.len() != column_count {
        return Err(shape_error("row does not match the column list"));
    }
    Ok(row.clone())
}

/// `" N. row "` centered in [`BANNER_WIDTH`] columns of [`BANNER_FILL`]
///
/// When the padding is odd the extra fill goes right, unless the width
/// itself is odd too.
#[must_use]
pub fn banner(number: usize) -> String {
    let title = format!(" {number}. row ");
    let margin = BANNER_WIDTH.saturating_sub(title.chars().count());
    let left = margin / 2 + (margin & BANNER_WIDTH & 1);
    let right = margin - left;

    let fill = |n: usize| BANNER_FILL.to_string().repeat(n);
    format!("{}{title}{}", fill(left), fill(right))
}

/// Strings are shown bare; everything else as compact JSON
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
