//! Error taxonomy for feed decoding.
//!
//! Whole-feed failures ([`Error::EnvelopeMissing`], [`Error::InvalidJson`],
//! [`Error::ProtobufParse`]) abort a feed. [`MalformedRecord`] is scoped to a
//! single record and is normally collected next to the rows that did decode.

use thiserror::Error;

/// Result type alias for decoding operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A record whose required sub-structure is absent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("record {index} is malformed: {reason}")]
pub struct MalformedRecord {
    /// Position of the record in its source sequence.
    pub index: usize,
    pub reason: String,
}

impl MalformedRecord {
    pub fn new(index: usize, reason: impl Into<String>) -> Self {
        Self {
            index,
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Document bytes are not valid JSON.
    #[error("invalid JSON document: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The delivery envelope that holds the records is absent.
    #[error("delivery envelope '{path}' is missing")]
    EnvelopeMissing { path: String },

    #[error(transparent)]
    MalformedRecord(#[from] MalformedRecord),

    /// Payload does not parse as a GTFS-Realtime `FeedMessage`.
    #[error("payload is not a valid GTFS-Realtime FeedMessage: {0}")]
    ProtobufParse(String),

    /// No decoder is registered for the requested feed name.
    #[error("unknown feed kind '{0}'")]
    UnknownFeedKind(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn envelope_missing(path: impl Into<String>) -> Self {
        Self::EnvelopeMissing { path: path.into() }
    }

    /// Returns true if the error aborts the whole feed rather than one record.
    pub fn is_feed_fatal(&self) -> bool {
        !matches!(self, Self::MalformedRecord(_))
    }
}

impl From<prost::DecodeError> for Error {
    fn from(err: prost::DecodeError) -> Self {
        Self::ProtobufParse(err.to_string())
    }
}
