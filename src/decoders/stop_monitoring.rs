//! `MonitoredStopVisit` entries to one row per visit.

use serde_json::Value;
use tracing::warn;

use crate::error::Result;
use crate::navigator::{cell, envelope_records, mapping};
use crate::row::{Decoded, RowBatch};

pub const ENVELOPE: &str = "ServiceDelivery.StopMonitoringDelivery";
const RECORDS: &str = "MonitoredStopVisit";

pub const COLUMNS: [&str; 14] = [
    "RecordedAtTime",
    "MonitoringRef",
    "LineRef",
    "DirectionRef",
    "VehicleRef",
    "OriginName",
    "DestinationName",
    "StopPointName",
    "VehicleLocation.Latitude",
    "VehicleLocation.Longitude",
    "AimedArrivalTime",
    "ExpectedArrivalTime",
    "AimedDepartureTime",
    "ExpectedDepartureTime",
];

/// Decodes a StopMonitoring document.
///
/// A visit without `MonitoredVehicleJourney` or its `MonitoredCall` is
/// rejected; every other field is optional.
///
/// # Errors
///
/// Returns [`Error::EnvelopeMissing`](crate::Error::EnvelopeMissing) if the
/// `StopMonitoringDelivery` envelope is absent.
pub fn decode(document: &Value) -> Result<Decoded> {
    let visits = envelope_records(document, ENVELOPE, RECORDS)?;
    let mut decoded = Decoded::new(RowBatch::new(&COLUMNS));

    for (index, visit) in visits.iter().enumerate() {
        let Some(journey) = mapping(visit, "MonitoredVehicleJourney") else {
            warn!(index, "Stop visit has no MonitoredVehicleJourney");
            decoded.reject(index, "missing MonitoredVehicleJourney");
            continue;
        };
        let Some(call) = mapping(journey, "MonitoredCall") else {
            warn!(index, "Stop visit has no MonitoredCall");
            decoded.reject(index, "missing MonitoredVehicleJourney.MonitoredCall");
            continue;
        };

        decoded.batch.push([
            cell(visit, "RecordedAtTime"),
            cell(visit, "MonitoringRef"),
            cell(journey, "LineRef"),
            cell(journey, "DirectionRef"),
            cell(journey, "VehicleRef"),
            cell(journey, "OriginName"),
            cell(journey, "DestinationName"),
            cell(call, "StopPointName"),
            cell(journey, "VehicleLocation.Latitude"),
            cell(journey, "VehicleLocation.Longitude"),
            cell(call, "AimedArrivalTime"),
            cell(call, "ExpectedArrivalTime"),
            cell(call, "AimedDepartureTime"),
            cell(call, "ExpectedDepartureTime"),
        ]);
    }

    Ok(decoded)
}
