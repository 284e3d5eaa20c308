use pretty_assertions::assert_eq;
use prost::Message;
use transit_feed_decoder::feed::{FeedOutcome, process_bytes};
use transit_feed_decoder::gtfs_rt::{FeedEntity, FeedHeader, FeedMessage, Position, VehiclePosition};
use transit_feed_decoder::output::{CsvSink, RowSink};
use transit_feed_decoder::{Cell, Decoded, Error, FeedKind, RowBatch};

fn decode_fixture(kind: FeedKind, bytes: &[u8]) -> Decoded {
    match process_bytes(kind, bytes).expect("fixture should decode") {
        FeedOutcome::Rows(decoded) => decoded,
        FeedOutcome::Validated(_) => panic!("expected rows for {kind}"),
    }
}

fn to_csv(batch: &RowBatch) -> String {
    let mut sink = CsvSink::new(Vec::new());
    sink.write_batch(batch).unwrap();
    String::from_utf8(sink.into_inner().unwrap()).unwrap()
}

#[test]
fn test_stop_monitoring_fixture() {
    let bytes = include_bytes!("fixtures/StopMonitoring.json");
    let decoded = decode_fixture(FeedKind::StopMonitoring, bytes);

    assert_eq!(decoded.batch.len(), 2);
    assert_eq!(decoded.rejected.len(), 1);
    assert_eq!(decoded.rejected[0].index, 2);

    let csv = to_csv(&decoded.batch);
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some(
            "RecordedAtTime,MonitoringRef,LineRef,DirectionRef,VehicleRef,OriginName,DestinationName,\
             StopPointName,VehicleLocation.Latitude,VehicleLocation.Longitude,AimedArrivalTime,\
             ExpectedArrivalTime,AimedDepartureTime,ExpectedDepartureTime"
        )
    );
    assert_eq!(
        lines.next(),
        Some(
            "2024-03-04T17:01:58Z,70011,L1,S,101,San Francisco Caltrain Station,San Jose Diridon Station,\
             San Francisco Caltrain Station,37.776439,-122.394992,2024-03-04T17:05:00Z,\
             2024-03-04T17:05:00Z,2024-03-04T17:05:00Z,2024-03-04T17:06:00Z"
        )
    );
    assert_eq!(decoded.batch.get(1, "VehicleRef"), Some(&Cell::Null));
    assert_eq!(decoded.batch.get(1, "ExpectedArrivalTime"), Some(&Cell::Null));
}

#[test]
fn test_stop_monitoring_strict_mode_aborts() {
    let bytes = include_bytes!("fixtures/StopMonitoring.json");
    let decoded = decode_fixture(FeedKind::StopMonitoring, bytes);

    match decoded.into_strict() {
        Err(Error::MalformedRecord(record)) => assert!(record.reason.contains("MonitoredCall")),
        other => panic!("expected malformed record, got {other:?}"),
    }
}

#[test]
fn test_vehicle_monitoring_fixture() {
    let bytes = include_bytes!("fixtures/VehicleMonitoring.json");
    let decoded = decode_fixture(FeedKind::VehicleMonitoring, bytes);
    let batch = &decoded.batch;

    // 1 + 2 calls for the first vehicle, none for the second, 1 for the third
    assert_eq!(batch.len(), 4);
    assert!(decoded.rejected.is_empty());

    let vehicles: Vec<_> = (0..4)
        .map(|i| batch.get(i, "VehicleRef").and_then(Cell::as_str).unwrap())
        .collect();
    assert_eq!(vehicles, vec!["101", "101", "101", "412"]);

    let calls: Vec<_> = (0..4)
        .map(|i| batch.get(i, "CallType").and_then(Cell::as_str).unwrap())
        .collect();
    assert_eq!(calls, vec!["MonitoredCall", "OnwardCall", "OnwardCall", "MonitoredCall"]);

    assert_eq!(batch.get(2, "StopPointName"), Some(&Cell::from("South San Francisco")));
    assert_eq!(batch.get(2, "VehicleLocation.Latitude"), Some(&Cell::from("37.76512")));
    assert_eq!(batch.get(3, "VehicleLocation.Latitude"), Some(&Cell::Null));
}

#[test]
fn test_stop_places_fixture() {
    let bytes = include_bytes!("fixtures/stopplaces.json");
    let decoded = decode_fixture(FeedKind::StopPlaces, bytes);

    let csv = to_csv(&decoded.batch);
    assert_eq!(
        csv,
        "@id,Name,PublicCode,TransportMode,Centroid.Location.Latitude,Centroid.Location.Longitude,\
         PostalAddress.AddressLine1,PostalAddress.Town\n\
         70011,San Francisco Caltrain Station,,rail,37.776439,-122.394992,700 4th Street,San Francisco\n\
         70021,22nd Street Caltrain Station,,rail,37.757599,-122.392404,,\n"
    );
}

#[test]
fn test_scheduled_stops_fixture() {
    let bytes = include_bytes!("fixtures/stops.json");
    let decoded = decode_fixture(FeedKind::ScheduledStops, bytes);

    assert_eq!(decoded.batch.len(), 2);
    assert_eq!(decoded.batch.get(0, "ParentStation"), Some(&Cell::from("ctsf")));
    assert_eq!(decoded.batch.get(0, "FromDate"), Some(&Cell::from("2024-01-01T00:00:00-08:00")));
    assert_eq!(decoded.batch.get(1, "ParentStation"), Some(&Cell::Null));
    assert_eq!(decoded.batch.get(1, "StopType"), Some(&Cell::from("onstreetBus")));
}

#[test]
fn test_decoding_twice_is_byte_identical() {
    let bytes = include_bytes!("fixtures/VehicleMonitoring.json");
    let first = to_csv(&decode_fixture(FeedKind::VehicleMonitoring, bytes).batch);
    let second = to_csv(&decode_fixture(FeedKind::VehicleMonitoring, bytes).batch);
    assert_eq!(first, second);
}

#[test]
fn test_wrong_decoder_reports_missing_envelope() {
    let bytes = include_bytes!("fixtures/stops.json");
    let result = process_bytes(FeedKind::StopMonitoring, bytes);
    assert!(matches!(result, Err(Error::EnvelopeMissing { .. })));
}

#[test]
fn test_gtfs_realtime_payload_validates() {
    let feed = FeedMessage {
        header: FeedHeader {
            gtfs_realtime_version: "2.0".to_string(),
            timestamp: Some(1709571730),
            incrementality: None,
            feed_version: None,
        },
        entity: vec![FeedEntity {
            id: "101".to_string(),
            vehicle: Some(VehiclePosition {
                position: Some(Position {
                    latitude: 37.765,
                    longitude: -122.401,
                    bearing: None,
                    speed: None,
                    odometer: None,
                }),
                ..Default::default()
            }),
            ..Default::default()
        }],
    };
    let bytes = feed.encode_to_vec();

    match process_bytes(FeedKind::GtfsRealtime, &bytes).unwrap() {
        FeedOutcome::Validated(summary) => {
            assert_eq!(summary.total_entities, 1);
            assert_eq!(summary.vehicles, 1);
        }
        FeedOutcome::Rows(_) => panic!("GTFS-RT payloads are not flattened"),
    }
}

#[test]
fn test_gtfs_realtime_rejects_json_payload() {
    let bytes = include_bytes!("fixtures/stops.json");
    let result = process_bytes(FeedKind::GtfsRealtime, bytes);
    assert!(matches!(result, Err(Error::ProtobufParse(_))));
}
