//! Feed kinds and dispatch from a raw payload to the matching decoder.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde_json::Value;
use tracing::debug;

use crate::decoders::{scheduled_stops, stop_monitoring, stop_places, vehicle_monitoring};
use crate::error::{Error, Result};
use crate::parser::validate_feed;
use crate::row::Decoded;
use crate::summary::FeedSummary;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Wire format of a feed payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    Json,
    GtfsRealtimeProtobuf,
}

/// The decoder selected for a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    StopMonitoring,
    VehicleMonitoring,
    StopPlaces,
    ScheduledStops,
    GtfsRealtime,
}

impl FeedKind {
    pub const ALL: [FeedKind; 5] = [
        FeedKind::StopMonitoring,
        FeedKind::VehicleMonitoring,
        FeedKind::StopPlaces,
        FeedKind::ScheduledStops,
        FeedKind::GtfsRealtime,
    ];

    pub fn format(self) -> FeedFormat {
        match self {
            FeedKind::GtfsRealtime => FeedFormat::GtfsRealtimeProtobuf,
            _ => FeedFormat::Json,
        }
    }

    /// Column contract of the kind's row output. GTFS-Realtime feeds are
    /// validated, not flattened, and have none.
    pub fn columns(self) -> Option<&'static [&'static str]> {
        match self {
            FeedKind::StopMonitoring => Some(&stop_monitoring::COLUMNS),
            FeedKind::VehicleMonitoring => Some(&vehicle_monitoring::COLUMNS),
            FeedKind::StopPlaces => Some(&stop_places::COLUMNS),
            FeedKind::ScheduledStops => Some(&scheduled_stops::COLUMNS),
            FeedKind::GtfsRealtime => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FeedKind::StopMonitoring => "stop-monitoring",
            FeedKind::VehicleMonitoring => "vehicle-monitoring",
            FeedKind::StopPlaces => "stop-places",
            FeedKind::ScheduledStops => "stops",
            FeedKind::GtfsRealtime => "gtfs-rt",
        }
    }

    /// Maps a 511 transit endpoint name (as used for saved file stems) to
    /// its decoder. Endpoints without a decoder return `None`.
    pub fn from_endpoint(endpoint: &str) -> Option<Self> {
        match endpoint.to_ascii_lowercase().as_str() {
            "stopmonitoring" => Some(FeedKind::StopMonitoring),
            "vehiclemonitoring" => Some(FeedKind::VehicleMonitoring),
            "stopplaces" => Some(FeedKind::StopPlaces),
            "stops" => Some(FeedKind::ScheduledStops),
            "tripupdates" | "vehiclepositions" | "servicealerts" => Some(FeedKind::GtfsRealtime),
            _ => None,
        }
    }

    /// Detects the kind from a saved feed file: `.pb` files are GTFS-RT,
    /// anything else is looked up by file stem.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension().and_then(|e| e.to_str());
        if extension.is_some_and(|e| e.eq_ignore_ascii_case("pb")) {
            return Some(FeedKind::GtfsRealtime);
        }
        path.file_stem()
            .and_then(|s| s.to_str())
            .and_then(Self::from_endpoint)
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FeedKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .or_else(|| Self::from_endpoint(s))
            .ok_or_else(|| Error::UnknownFeedKind(s.to_string()))
    }
}

/// Raw feed bytes tagged with their wire format.
#[derive(Debug, Clone, Copy)]
pub struct FeedPayload<'a> {
    pub format: FeedFormat,
    pub bytes: &'a [u8],
}

impl<'a> FeedPayload<'a> {
    pub fn new(format: FeedFormat, bytes: &'a [u8]) -> Self {
        Self { format, bytes }
    }
}

/// Result of processing one feed.
#[derive(Debug)]
pub enum FeedOutcome {
    Rows(Decoded),
    Validated(FeedSummary),
}

/// Parses JSON document bytes, tolerating a leading UTF-8 byte-order mark.
///
/// # Errors
///
/// Returns [`Error::InvalidJson`] if the bytes are not a JSON document.
pub fn parse_document(bytes: &[u8]) -> Result<Value> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    Ok(serde_json::from_slice(bytes)?)
}

/// Runs the row decoder for `kind` over an already-parsed document.
///
/// # Errors
///
/// Fails with [`Error::UnknownFeedKind`] for GTFS-RT, which has no document
/// form, and otherwise with the decoder's whole-feed errors.
pub fn decode_document(kind: FeedKind, document: &Value) -> Result<Decoded> {
    match kind {
        FeedKind::StopMonitoring => stop_monitoring::decode(document),
        FeedKind::VehicleMonitoring => vehicle_monitoring::decode(document),
        FeedKind::StopPlaces => stop_places::decode(document),
        FeedKind::ScheduledStops => scheduled_stops::decode(document),
        FeedKind::GtfsRealtime => {
            Err(Error::UnknownFeedKind(format!("{kind} has no JSON decoder")))
        }
    }
}

/// Decodes or validates a raw payload according to `kind`.
///
/// # Errors
///
/// Fails with [`Error::UnknownFeedKind`] if the payload's format tag is not
/// the wire format of `kind`.
#[tracing::instrument(skip(payload), fields(bytes = payload.bytes.len()))]
pub fn process_payload(kind: FeedKind, payload: FeedPayload<'_>) -> Result<FeedOutcome> {
    if payload.format != kind.format() {
        return Err(Error::UnknownFeedKind(format!(
            "{kind} does not accept {:?} payloads",
            payload.format
        )));
    }

    match payload.format {
        FeedFormat::GtfsRealtimeProtobuf => {
            let summary = validate_feed(payload.bytes)?;
            debug!(entities = summary.total_entities, "Feed validated");
            Ok(FeedOutcome::Validated(summary))
        }
        FeedFormat::Json => {
            let document = parse_document(payload.bytes)?;
            let decoded = decode_document(kind, &document)?;
            debug!(
                rows = decoded.batch.len(),
                rejected = decoded.rejected.len(),
                "Feed decoded"
            );
            Ok(FeedOutcome::Rows(decoded))
        }
    }
}

/// Convenience for [`process_payload`] with the kind's own wire format.
pub fn process_bytes(kind: FeedKind, bytes: &[u8]) -> Result<FeedOutcome> {
    process_payload(kind, FeedPayload::new(kind.format(), bytes))
}
