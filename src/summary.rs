use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::gtfs_rt::FeedMessage;
use crate::gtfs_rt::feed_header::Incrementality;

/// Structural overview of a validated GTFS-RT feed.
#[derive(Debug, Default, Serialize)]
pub struct FeedSummary {
    pub gtfs_realtime_version: String,
    pub feed_timestamp: Option<DateTime<Utc>>,
    pub incrementality: Option<String>,
    pub total_entities: usize,

    // entity types
    pub trip_updates: usize,
    pub vehicles: usize,
    pub alerts: usize,
    pub shapes: usize,
    pub stops: usize,
    pub trip_modifications: usize,
    pub deleted: usize,
}

impl FeedSummary {
    pub fn from_feed(feed: &FeedMessage) -> Self {
        let header = &feed.header;
        let mut s = FeedSummary {
            gtfs_realtime_version: header.gtfs_realtime_version.clone(),
            feed_timestamp: header
                .timestamp
                .and_then(|t| i64::try_from(t).ok())
                .and_then(|t| DateTime::from_timestamp(t, 0)),
            incrementality: header
                .incrementality
                .and_then(|i| Incrementality::try_from(i).ok())
                .map(|i| i.as_str_name().to_string()),
            total_entities: feed.entity.len(),
            ..Default::default()
        };

        for e in &feed.entity {
            if e.is_deleted() {
                s.deleted += 1;
            }

            if e.trip_update.is_some() {
                s.trip_updates += 1;
            }

            if e.vehicle.is_some() {
                s.vehicles += 1;
            }

            if e.alert.is_some() {
                s.alerts += 1;
            }

            if e.shape.is_some() {
                s.shapes += 1;
            }

            if e.stop.is_some() {
                s.stops += 1;
            }

            if e.trip_modifications.is_some() {
                s.trip_modifications += 1;
            }
        }

        s
    }

    /// Age of the feed relative to `now`, if the header carries a timestamp.
    pub fn age_at(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        self.feed_timestamp.map(|t| now - t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gtfs_rt::{
        Alert, FeedEntity, FeedHeader, Position, TripDescriptor, TripUpdate, VehiclePosition,
    };

    #[test]
    fn test_from_feed_empty() {
        let feed = FeedMessage {
            header: create_header(),
            entity: vec![],
        };
        let summary = FeedSummary::from_feed(&feed);

        assert_eq!(summary.total_entities, 0);
        assert_eq!(summary.vehicles, 0);
        assert_eq!(summary.gtfs_realtime_version, "2.0");
        assert_eq!(summary.incrementality.as_deref(), Some("FULL_DATASET"));
    }

    #[test]
    fn test_from_feed_counts_entity_kinds() {
        let feed = FeedMessage {
            header: create_header(),
            entity: vec![
                FeedEntity {
                    id: "v1".to_string(),
                    vehicle: Some(VehiclePosition {
                        position: Some(Position {
                            latitude: 37.77,
                            longitude: -122.41,
                            bearing: Some(180.0),
                            speed: None,
                            odometer: None,
                        }),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                FeedEntity {
                    id: "t1".to_string(),
                    trip_update: Some(TripUpdate {
                        trip: TripDescriptor {
                            trip_id: Some("101".to_string()),
                            ..Default::default()
                        },
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                FeedEntity {
                    id: "a1".to_string(),
                    is_deleted: Some(true),
                    alert: Some(Alert::default()),
                    ..Default::default()
                },
            ],
        };

        let summary = FeedSummary::from_feed(&feed);

        assert_eq!(summary.total_entities, 3);
        assert_eq!(summary.vehicles, 1);
        assert_eq!(summary.trip_updates, 1);
        assert_eq!(summary.alerts, 1);
        assert_eq!(summary.deleted, 1);
        assert_eq!(summary.shapes, 0);
    }

    #[test]
    fn test_feed_timestamp_and_age() {
        let feed = FeedMessage {
            header: create_header(),
            entity: vec![],
        };
        let summary = FeedSummary::from_feed(&feed);
        let stamp = summary.feed_timestamp.unwrap();

        assert_eq!(stamp.timestamp(), 1234567890);
        let later = stamp + chrono::Duration::seconds(90);
        assert_eq!(summary.age_at(later), Some(chrono::Duration::seconds(90)));
    }

    fn create_header() -> FeedHeader {
        FeedHeader {
            gtfs_realtime_version: "2.0".to_string(),
            timestamp: Some(1234567890),
            incrementality: Some(Incrementality::FullDataset as i32),
            feed_version: None,
        }
    }
}
