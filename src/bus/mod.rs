//! Minimal publish/poll interface to the message bus.
//!
//! The consume loop and the publisher only see [`Producer`] and [`Consumer`]. Two buses
//! implement them: [`SpoolBus`] keeps one append-only file per channel so separate
//! processes can exchange messages, and [`MemoryBus`] keeps everything in process.

use std::time::Duration;

use crate::error::TransportError;

mod memory;
mod spool;

pub use memory::{MemoryBus, MemoryConsumer, MemoryProducer};
pub use spool::{SpoolBus, SpoolConsumer, SpoolProducer, MAX_RECORD_SIZE};

/// What a poll can hand back
#[derive(Debug)]
pub enum Message {
    /// A payload as published
    Payload(Vec<u8>),
    /// The bus reported an error in place of a message
    Error(TransportError),
}

impl Message {
    #[must_use]
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            Self::Payload(bytes) => Some(bytes),
            Self::Error(_) => None,
        }
    }

    #[must_use]
    pub const fn error(&self) -> Option<&TransportError> {
        match self {
            Self::Payload(_) => None,
            Self::Error(e) => Some(e),
        }
    }
}

/// Sending side of the bus
pub trait Producer {
    /// Queue a payload for `channel`
    ///
    /// # Errors
    /// Returns an error if the bus refuses the payload.
    fn send(&mut self, channel: &str, payload: &[u8]) -> Result<(), TransportError>;

    /// Block until every queued payload is acknowledged
    ///
    /// # Errors
    /// Returns an error if delivery fails or does not finish within `timeout`.
    fn flush(&mut self, timeout: Duration) -> Result<(), TransportError>;
}

/// Receiving side of the bus, bound to one channel
pub trait Consumer {
    /// Wait at most `timeout` for the next message
    ///
    /// Returns `None` when nothing arrived in time.
    fn poll(&mut self, timeout: Duration) -> Option<Message>;
}
