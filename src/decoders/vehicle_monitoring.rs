//! `VehicleActivity` entries to one row per call.
//!
//! Each activity contributes a row for its current `MonitoredCall` followed
//! by one row per `OnwardCalls.OnwardCall`, all sharing the journey prefix.
//! An activity with no call information contributes nothing.

use serde_json::Value;
use tracing::warn;

use crate::error::Result;
use crate::navigator::{cell, entries, envelope_records, get};
use crate::row::{Cell, Decoded, RowBatch};

pub const ENVELOPE: &str = "ServiceDelivery.VehicleMonitoringDelivery";
const RECORDS: &str = "VehicleActivity";

pub const COLUMNS: [&str; 15] = [
    "RecordedAtTime",
    "LineRef",
    "DirectionRef",
    "VehicleRef",
    "OriginName",
    "DestinationName",
    "VehicleLocation.Latitude",
    "VehicleLocation.Longitude",
    "CallType",
    "StopPointRef",
    "StopPointName",
    "AimedArrivalTime",
    "ExpectedArrivalTime",
    "AimedDepartureTime",
    "ExpectedDepartureTime",
];

const PREFIX_LEN: usize = 8;

pub const MONITORED_CALL: &str = "MonitoredCall";
pub const ONWARD_CALL: &str = "OnwardCall";

static NULL: Value = Value::Null;

/// Decodes a VehicleMonitoring document.
///
/// An activity whose `MonitoredCall` is present but not a mapping, or whose
/// `OnwardCalls.OnwardCall` is neither a list nor a mapping, is rejected as
/// a whole and contributes no rows. A single non-mapping entry inside the
/// onward list is rejected on its own; the other calls still emit rows.
///
/// # Errors
///
/// Returns [`Error::EnvelopeMissing`](crate::Error::EnvelopeMissing) if the
/// `VehicleMonitoringDelivery` envelope is absent.
pub fn decode(document: &Value) -> Result<Decoded> {
    let activities = envelope_records(document, ENVELOPE, RECORDS)?;
    let mut decoded = Decoded::new(RowBatch::new(&COLUMNS));

    for (index, activity) in activities.iter().enumerate() {
        if !activity.is_object() {
            decoded.reject(index, "VehicleActivity is not a mapping");
            continue;
        }

        let journey = get(activity, "MonitoredVehicleJourney").unwrap_or(&NULL);

        let monitored_call = match get(journey, MONITORED_CALL) {
            None | Some(Value::Null) => None,
            Some(call @ Value::Object(_)) => Some(call),
            Some(_) => {
                warn!(index, "MonitoredCall is not a mapping");
                decoded.reject(index, "MonitoredCall is not a mapping");
                continue;
            }
        };

        let Some(onward_calls) = entries(get(journey, "OnwardCalls.OnwardCall")) else {
            warn!(index, "OnwardCalls.OnwardCall is neither a list nor a mapping");
            decoded.reject(index, "OnwardCalls.OnwardCall is not a sequence");
            continue;
        };

        let prefix = journey_prefix(activity, journey);

        if let Some(call) = monitored_call {
            decoded.batch.push(call_row(&prefix, MONITORED_CALL, call));
        }

        for (position, onward) in onward_calls.iter().enumerate() {
            if !onward.is_object() {
                warn!(index, position, "Onward call is not a mapping");
                decoded.reject(index, format!("OnwardCall {position} is not a mapping"));
                continue;
            }
            decoded.batch.push(call_row(&prefix, ONWARD_CALL, onward));
        }
    }

    Ok(decoded)
}

/// Journey-level fields shared by every row of one activity.
fn journey_prefix(activity: &Value, journey: &Value) -> [Cell; PREFIX_LEN] {
    [
        cell(activity, "RecordedAtTime"),
        cell(journey, "LineRef"),
        cell(journey, "DirectionRef"),
        cell(journey, "VehicleRef"),
        cell(journey, "OriginName"),
        cell(journey, "DestinationName"),
        cell(journey, "VehicleLocation.Latitude"),
        cell(journey, "VehicleLocation.Longitude"),
    ]
}

fn call_row(prefix: &[Cell; PREFIX_LEN], call_type: &str, call: &Value) -> Vec<Cell> {
    let mut row = Vec::with_capacity(COLUMNS.len());
    row.extend_from_slice(prefix);
    row.extend([
        Cell::from(call_type),
        cell(call, "StopPointRef"),
        cell(call, "StopPointName"),
        cell(call, "AimedArrivalTime"),
        cell(call, "ExpectedArrivalTime"),
        cell(call, "AimedDepartureTime"),
        cell(call, "ExpectedDepartureTime"),
    ]);
    row
}
