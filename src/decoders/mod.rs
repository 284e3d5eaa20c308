//! SIRI and 511 reference-data decoders.
//!
//! Each decoder is a pure function from a parsed document to a [`Decoded`]
//! batch with a fixed column contract. Decoders never call one another.
//!
//! [`Decoded`]: crate::row::Decoded

pub mod scheduled_stops;
pub mod stop_monitoring;
pub mod stop_places;
pub mod vehicle_monitoring;
