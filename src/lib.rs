//! `windpack` - Weather-station telemetry over a message bus
//!
//! Publishes simulated station readings (temperature, humidity, wind direction) to a
//! channel in one of two wire formats, and consumes them back into a bounded series for
//! live display.
//!
//! # Features
//! - **Compact frames**: every reading fits in exactly 3 bytes
//! - **Verbose payloads**: self-describing JSON, the baseline the compact frame is measured against
//! - **One consume loop for both formats**: the wire format is a [`Codec`] chosen at construction
//! - **Error tolerant**: transport errors and malformed payloads are logged and skipped
//!
//! # Example
//! ```
//! use windpack::{CompactCodec, Reading, WindDirection};
//!
//! let reading = Reading::new(72.8, 45, WindDirection::SouthWest);
//! let frame = CompactCodec::pack(&reading);
//! assert_eq!(frame, [0x01, 0x21, 0x6B]);
//!
//! let decoded = CompactCodec::unpack(&frame).unwrap();
//! assert_eq!(decoded.temperature, 72); // truncated, not rounded
//! assert_eq!(decoded.humidity, 45);
//! assert_eq!(decoded.wind_direction.name(), "SO");
//! ```
//!
//! # Wire Formats
//!
//! ## Compact frame (3 bytes, big-endian)
//!
//! | Bits | Width | Field | Description |
//! |------|-------|-------|-------------|
//! | 23-10 | 14 | `temperature` | Integer part of the temperature. Range 0-110, field holds up to 16383. |
//! | 9-3 | 7 | `humidity` | Relative humidity in percent. Range 0-100, field holds up to 127. |
//! | 2-0 | 3 | `wind` | Index into the 8-entry [`WindDirection`] table. |
//!
//! The fractional part of the temperature is dropped by truncation before packing, so
//! the compact format is lossy for temperature and exact for the other two fields.
//! The decoder does not range-check the temperature field.
//!
//! ## Verbose payload (JSON)
//!
//! ```json
//! {"temperatura":72.83,"humedad":45,"direccion_viento":"SO"}
//! ```
//!
//! Temperature keeps its two decimals. A payload that is not JSON, or that has a field
//! of the wrong type, is malformed; a payload that lacks one of the three fields is
//! reported as missing that field.
//!
//! # Consume Loop
//!
//! Each [`Aggregator`] cycle polls the channel for at most the poll timeout and lands in
//! one [`PollOutcome`]: nothing arrived, a transport error, a malformed payload, or a
//! valid reading. Only valid readings count toward the target; the cycle that accepts the
//! last one hands the full [`Series`] to the [`Sink`] and ends the session.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]

pub mod aggregator;
pub mod bus;
mod codec;
mod compact;
pub mod config;
mod constants;
mod error;
mod generator;
pub mod logging;
pub mod publisher;
mod reading;
mod series;
pub mod sink;
mod verbose;

#[cfg(test)]
mod tests;

// Re-export public API
pub use aggregator::{Aggregator, CancellationToken, PollOutcome, SessionConfig, SessionReport, SessionStats};
pub use codec::{Codec, Format};
pub use compact::{CompactCodec, CompactFrame};
pub use config::StationConfig;
pub use error::{DecodeError, EncodeError, Error, SinkError, TransportError};
pub use generator::SampleGenerator;
pub use publisher::{PublishConfig, PublishReport, Publisher};
pub use reading::{Reading, WindDirection};
pub use series::Series;
pub use sink::Sink;
pub use verbose::VerboseCodec;
