//! Safe nested-path access over untyped JSON documents.
//!
//! Every JSON decoder reads its fields through [`get`] so that a missing or
//! oddly-shaped optional group resolves to a default instead of a failure.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::row::Cell;

/// Outer wrapper some SIRI responses carry around `ServiceDelivery`.
const SIRI_ROOT: &str = "Siri";

/// Walks `path` (dot-separated keys) from `node`.
///
/// Descends only through mappings that contain the next key; any other node
/// ends the walk with `None`. Sequences are never indexed.
pub fn get<'a>(node: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(node, |current, key| match current {
        Value::Object(map) => map.get(key),
        _ => None,
    })
}

/// Like [`get`], returning `default` when the path does not resolve.
pub fn get_or<'a>(node: &'a Value, path: &str, default: &'a Value) -> &'a Value {
    get(node, path).unwrap_or(default)
}

/// Reads `path` as a row cell; unresolved paths become [`Cell::Null`].
pub fn cell(node: &Value, path: &str) -> Cell {
    get(node, path).map(Cell::from).unwrap_or(Cell::Null)
}

/// Returns the mapping at `path`, if the path resolves to one.
pub fn mapping<'a>(node: &'a Value, path: &str) -> Option<&'a Value> {
    get(node, path).filter(|v| v.is_object())
}

/// Views a node as a sequence of records.
///
/// Absent and null nodes are empty, a single mapping is a one-element
/// sequence. Scalars are not sequences.
pub fn entries(node: Option<&Value>) -> Option<&[Value]> {
    match node {
        None | Some(Value::Null) => Some(&[]),
        Some(Value::Array(items)) => Some(items.as_slice()),
        Some(object @ Value::Object(_)) => Some(std::slice::from_ref(object)),
        Some(_) => None,
    }
}

/// Locates the records under a delivery envelope.
///
/// `envelope` must resolve to a mapping, optionally below a top-level `Siri`
/// wrapper. The `records` key inside it may be missing, which yields no
/// records.
pub fn envelope_records<'a>(
    document: &'a Value,
    envelope: &str,
    records: &str,
) -> Result<&'a [Value]> {
    let root = mapping(document, SIRI_ROOT).unwrap_or(document);
    let delivery = mapping(root, envelope).ok_or_else(|| Error::envelope_missing(envelope))?;

    entries(get(delivery, records))
        .ok_or_else(|| Error::envelope_missing(format!("{envelope}.{records}")))
}
