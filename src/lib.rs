pub mod decoders;
pub mod error;
pub mod feed;
pub mod navigator;
pub mod normalize;
pub mod output;
pub mod parser;
pub mod row;
pub mod summary;

pub use error::{Error, MalformedRecord, Result};
pub use feed::{FeedFormat, FeedKind, FeedOutcome, FeedPayload};
pub use row::{Cell, Decoded, Row, RowBatch};

pub mod gtfs_rt {
    include!(concat!(env!("OUT_DIR"), "/transit_realtime.rs"));
}
