//! `StopPlace` reference entries to one row each.

use serde_json::Value;

use crate::error::Result;
use crate::navigator::{cell, envelope_records};
use crate::row::{Decoded, RowBatch};

pub const ENVELOPE: &str = "ServiceDelivery.DataObjectDelivery.dataObjects.SiteFrame.stopPlaces";
const RECORDS: &str = "StopPlace";

/// Column names double as navigation paths into each `StopPlace`.
pub const COLUMNS: [&str; 8] = [
    "@id",
    "Name",
    "PublicCode",
    "TransportMode",
    "Centroid.Location.Latitude",
    "Centroid.Location.Longitude",
    "PostalAddress.AddressLine1",
    "PostalAddress.Town",
];

/// Decodes a stopplaces document.
///
/// # Errors
///
/// Returns [`Error::EnvelopeMissing`](crate::Error::EnvelopeMissing) if the
/// `stopPlaces` frame is absent.
pub fn decode(document: &Value) -> Result<Decoded> {
    let places = envelope_records(document, ENVELOPE, RECORDS)?;
    let mut decoded = Decoded::new(RowBatch::new(&COLUMNS));

    for (index, place) in places.iter().enumerate() {
        if !place.is_object() {
            decoded.reject(index, "StopPlace is not a mapping");
            continue;
        }
        decoded.batch.push(COLUMNS.map(|path| cell(place, path)));
    }

    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::row::Cell;
    use serde_json::json;

    fn document(places: Value) -> Value {
        json!({"Siri": {"ServiceDelivery": {"DataObjectDelivery": {
            "dataObjects": {"SiteFrame": {"stopPlaces": {"StopPlace": places}}}
        }}}})
    }

    #[test]
    fn test_full_stop_place() {
        let doc = document(json!([{
            "@id": "70011",
            "Name": "San Francisco Caltrain",
            "PublicCode": "SF",
            "TransportMode": "rail",
            "Centroid": {"Location": {"Latitude": "37.7764", "Longitude": "-122.3943"}},
            "PostalAddress": {"AddressLine1": "700 4th St", "Town": "San Francisco"}
        }]));
        let decoded = decode(&doc).unwrap();

        assert_eq!(decoded.batch.len(), 1);
        assert_eq!(decoded.batch.get(0, "@id"), Some(&Cell::from("70011")));
        assert_eq!(
            decoded.batch.get(0, "Centroid.Location.Longitude"),
            Some(&Cell::from("-122.3943"))
        );
        assert_eq!(
            decoded.batch.get(0, "PostalAddress.Town"),
            Some(&Cell::from("San Francisco"))
        );
    }

    #[test]
    fn test_sparse_stop_place_keeps_all_columns() {
        let doc = document(json!([{"Name": "Bare"}, {"@id": "2", "Centroid": "unknown"}]));
        let decoded = decode(&doc).unwrap();

        assert_eq!(decoded.batch.len(), 2);
        for row in decoded.batch.rows() {
            assert_eq!(row.len(), COLUMNS.len());
        }
        assert_eq!(decoded.batch.get(0, "@id"), Some(&Cell::Null));
        assert_eq!(decoded.batch.get(1, "Centroid.Location.Latitude"), Some(&Cell::Null));
    }

    #[test]
    fn test_non_mapping_entry_is_rejected() {
        let doc = document(json!([{"Name": "A"}, 12]));
        let decoded = decode(&doc).unwrap();

        assert_eq!(decoded.batch.len(), 1);
        assert_eq!(decoded.rejected[0].index, 1);
    }

    #[test]
    fn test_missing_site_frame_fails_feed() {
        let doc = json!({"Siri": {"ServiceDelivery": {"DataObjectDelivery": {"dataObjects": {}}}}});
        assert!(matches!(decode(&doc), Err(Error::EnvelopeMissing { .. })));
    }
}
