//! `ScheduledStopPoint` entries from the 511 stops endpoint.

use serde_json::Value;

use crate::error::Result;
use crate::navigator::{cell, envelope_records};
use crate::row::{Decoded, RowBatch};

pub const ENVELOPE: &str = "Contents.dataObjects";
const RECORDS: &str = "ScheduledStopPoint";

pub const COLUMNS: [&str; 8] = [
    "id",
    "Name",
    "ParentStation",
    "Latitude",
    "Longitude",
    "FromDate",
    "ToDate",
    "StopType",
];

/// Source path for each column, in column order.
const PATHS: [&str; 8] = [
    "id",
    "Name",
    "Extensions.ParentStation",
    "Location.Latitude",
    "Location.Longitude",
    "Extensions.ValidBetween.FromDate",
    "Extensions.ValidBetween.ToDate",
    "StopType",
];

/// Decodes a stops document.
///
/// # Errors
///
/// Returns [`Error::EnvelopeMissing`](crate::Error::EnvelopeMissing) if
/// `Contents.dataObjects` is absent.
pub fn decode(document: &Value) -> Result<Decoded> {
    let stops = envelope_records(document, ENVELOPE, RECORDS)?;
    let mut decoded = Decoded::new(RowBatch::new(&COLUMNS));

    for (index, stop) in stops.iter().enumerate() {
        if !stop.is_object() {
            decoded.reject(index, "ScheduledStopPoint is not a mapping");
            continue;
        }
        decoded.batch.push(PATHS.map(|path| cell(stop, path)));
    }

    Ok(decoded)
}
