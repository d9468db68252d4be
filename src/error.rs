//! Error types for windpack encoding, decoding, transport and sessions.

use std::io;
use std::time::Duration;

use thiserror::Error as ThisError;

/// Error returned when a payload cannot be decoded into a reading
///
/// Decode errors are local to one message: the consume loop logs them and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum DecodeError {
    /// Compact frame is not exactly 3 bytes
    #[error("malformed frame: expected {expected} bytes, got {actual}")]
    MalformedFrame { expected: usize, actual: usize },
    /// Verbose payload is not valid JSON, or a field has the wrong type
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    /// Verbose payload lacks a required field
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    /// Wind index has no entry in the direction table
    #[error("unknown wind direction index {0}")]
    UnknownWindDirection(u8),
}

/// Error returned when a reading cannot be serialized
#[derive(Debug, ThisError)]
pub enum EncodeError {
    #[error("failed to serialize reading: {0}")]
    Serialize(#[from] serde_json::Error),

    /// JSON has no representation for the value at two-decimal precision
    #[error("temperature {0} has no JSON representation")]
    NonFiniteTemperature(f64),
}

/// Error reported by the message bus
#[derive(Debug, ThisError)]
pub enum TransportError {
    #[error("bus i/o error: {0}")]
    Io(#[from] io::Error),
    /// A record header announces more bytes than any record may hold
    #[error("corrupt record at offset {offset}: length {length} exceeds {max} bytes")]
    Corrupt { offset: u64, length: u32, max: u32 },
    /// Payload is larger than a record may hold
    #[error("payload of {length} bytes exceeds the {max} byte record limit")]
    RecordTooLarge { length: usize, max: u32 },
    /// Flush did not complete in time
    #[error("flush timed out after {0:?}")]
    FlushTimeout(Duration),
    /// Error delivered by the broker in place of a message
    #[error("broker error: {0}")]
    Broker(String),
}

/// Error returned by a sink while exporting the series
#[derive(Debug, ThisError)]
pub enum SinkError {
    #[error("failed to write {path}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Fatal error for a publish run or consume session
#[derive(Debug, ThisError)]
pub enum Error {
    /// The channel could not be opened at all
    #[error("failed to open channel `{channel}`")]
    ChannelOpen {
        channel: String,
        #[source]
        source: TransportError,
    },
    /// Send or flush was refused by the bus
    #[error("failed to publish message {index} to `{channel}`")]
    Publish {
        channel: String,
        index: usize,
        #[source]
        source: TransportError,
    },
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error("failed to export series")]
    Export(#[from] SinkError),
    #[error("publish run cancelled after {sent} of {count} messages")]
    PublishCancelled { sent: usize, count: usize },
    #[error("session cancelled after {accepted} of {target} readings")]
    Cancelled { accepted: usize, target: usize },
    #[error("session deadline of {deadline:?} exceeded after {accepted} of {target} readings")]
    DeadlineExceeded {
        deadline: Duration,
        accepted: usize,
        target: usize,
    },
}
