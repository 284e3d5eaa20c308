//! Structural validation of GTFS-Realtime payloads.

use prost::Message;

use crate::error::{Error, Result};
use crate::gtfs_rt::FeedMessage;
use crate::summary::FeedSummary;

/// Decodes a protobuf-encoded GTFS-RT [`FeedMessage`] from raw bytes.
///
/// # Errors
///
/// Returns [`Error::ProtobufParse`] if the bytes are not valid protobuf for a
/// `FeedMessage`, or if the required `FeedHeader` is absent. An empty payload
/// therefore fails rather than decoding to an empty feed.
pub fn parse_feed(bytes: &[u8]) -> Result<FeedMessage> {
    let feed = FeedMessage::decode(bytes)?;
    if feed.header.gtfs_realtime_version.is_empty() {
        return Err(Error::ProtobufParse(
            "missing required field FeedHeader.gtfs_realtime_version".to_string(),
        ));
    }
    Ok(feed)
}

/// Checks that `bytes` is a well-formed feed and summarises it.
///
/// The payload itself is not retained or altered.
pub fn validate_feed(bytes: &[u8]) -> Result<FeedSummary> {
    parse_feed(bytes).map(|feed| FeedSummary::from_feed(&feed))
}
