//! Flat tabular records produced by the decoders.

use std::borrow::Cow;

use serde_json::{Number, Value};

use crate::error::{Error, MalformedRecord, Result};

/// A scalar table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Text(String),
    Number(Number),
    Bool(bool),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Text form used by tabular sinks. Null renders as an empty field.
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            Cell::Null => Cow::Borrowed(""),
            Cell::Text(s) => Cow::Borrowed(s),
            Cell::Number(n) => Cow::Owned(n.to_string()),
            Cell::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
        }
    }
}

impl From<&Value> for Cell {
    /// Scalars map directly; mappings and sequences are kept as compact JSON.
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Null,
            Value::String(s) => Cell::Text(s.clone()),
            Value::Number(n) => Cell::Number(n.clone()),
            Value::Bool(b) => Cell::Bool(*b),
            nested => Cell::Text(nested.to_string()),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

/// One record, cells ordered like the owning batch's columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row(Vec<Cell>);

impl Row {
    pub fn cells(&self) -> &[Cell] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<const N: usize> From<[Cell; N]> for Row {
    fn from(cells: [Cell; N]) -> Self {
        Row(cells.into())
    }
}

impl From<Vec<Cell>> for Row {
    fn from(cells: Vec<Cell>) -> Self {
        Row(cells)
    }
}

/// Ordered rows sharing one column set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowBatch {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl RowBatch {
    pub fn new<S: AsRef<str>>(columns: &[S]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row; its width must match the column count.
    pub fn push(&mut self, row: impl Into<Row>) {
        let row = row.into();
        debug_assert_eq!(row.len(), self.columns.len(), "row width differs from column count");
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell of row `index` under `column`.
    pub fn get(&self, index: usize, column: &str) -> Option<&Cell> {
        let position = self.columns.iter().position(|c| c == column)?;
        self.rows.get(index)?.cells().get(position)
    }

    /// Row `index` as `(column, cell)` pairs in column order.
    pub fn record(&self, index: usize) -> Option<impl Iterator<Item = (&str, &Cell)>> {
        let row = self.rows.get(index)?;
        Some(self.columns.iter().map(String::as_str).zip(row.cells()))
    }
}

/// Output of one decoder run: rows for every structurally valid record plus
/// the records that were rejected.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Decoded {
    pub batch: RowBatch,
    pub rejected: Vec<MalformedRecord>,
}

impl Decoded {
    pub fn new(batch: RowBatch) -> Self {
        Self {
            batch,
            rejected: Vec::new(),
        }
    }

    pub fn reject(&mut self, index: usize, reason: impl Into<String>) {
        self.rejected.push(MalformedRecord::new(index, reason));
    }

    /// Fails on the first rejected record instead of skipping it.
    pub fn into_strict(self) -> Result<RowBatch> {
        match self.rejected.into_iter().next() {
            Some(record) => Err(Error::MalformedRecord(record)),
            None => Ok(self.batch),
        }
    }
}
