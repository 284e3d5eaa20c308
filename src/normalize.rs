//! Generic flattening of arbitrary JSON records into dotted columns.
//!
//! Unlike the fixed decoders, the column set here is discovered from the
//! data: the union of every leaf path across all records, in first-seen order.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::navigator::{entries, get};
use crate::row::{Cell, Decoded, RowBatch};

/// Flattens the record sequence found at `records_path` in `document`.
///
/// # Errors
///
/// Returns [`Error::EnvelopeMissing`] if `records_path` does not resolve or
/// does not hold a sequence of records.
pub fn decode_at(document: &Value, records_path: &str) -> Result<Decoded> {
    let node = get(document, records_path).ok_or_else(|| Error::envelope_missing(records_path))?;
    let records = entries(Some(node)).ok_or_else(|| Error::envelope_missing(records_path))?;
    Ok(flatten_records(records))
}

/// Flattens each mapping record; non-mapping records are rejected.
pub fn flatten_records(records: &[Value]) -> Decoded {
    let mut columns: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut flattened = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let Value::Object(map) = record else {
            rejected.push(index);
            continue;
        };

        let mut leaves = Vec::new();
        flatten_into(map, "", &mut leaves);

        let mut row = Vec::with_capacity(leaves.len());
        for (column, value) in leaves {
            let position = *positions.entry(column.clone()).or_insert_with(|| {
                columns.push(column);
                columns.len() - 1
            });
            row.push((position, value));
        }
        flattened.push(row);
    }

    let mut decoded = Decoded::new(RowBatch::new(&columns));
    for leaves in flattened {
        let mut cells = vec![Cell::Null; columns.len()];
        for (position, value) in leaves {
            cells[position] = Cell::from(value);
        }
        decoded.batch.push(cells);
    }
    for index in rejected {
        decoded.reject(index, "record is not a mapping");
    }

    decoded
}

fn flatten_into<'a>(map: &'a Map<String, Value>, prefix: &str, out: &mut Vec<(String, &'a Value)>) {
    for (key, value) in map {
        let column = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(nested) if !nested.is_empty() => flatten_into(nested, &column, out),
            _ => out.push((column, value)),
        }
    }
}
