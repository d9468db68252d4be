//! Compact 3-byte frame codec.

use crate::codec::Codec;
use crate::constants::{pack_fields, unpack_fields, FRAME_SIZE};
use crate::error::{DecodeError, EncodeError};
use crate::reading::{Reading, WindDirection};

/// A decoded compact frame
///
/// Temperature is the integer part the encoder kept; the fraction is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactFrame {
    pub temperature: u16,
    pub humidity: u8,
    pub wind_direction: WindDirection,
}

impl From<CompactFrame> for Reading {
    fn from(frame: CompactFrame) -> Self {
        Self::new(f64::from(frame.temperature), frame.humidity, frame.wind_direction)
    }
}

/// Codec for the 3-byte bit-packed format
#[derive(Debug, Clone, Copy, Default)]
pub struct CompactCodec;

impl CompactCodec {
    /// Pack a reading into a 3-byte big-endian frame
    ///
    /// Temperature is truncated toward zero, never rounded: 72.8 is sent as 72.
    ///
    /// The caller must keep the integer temperature at or below 16383 and the humidity
    /// at or below 127. Larger values are not rejected; they overflow into the next
    /// field (or past bit 23, where they are dropped).
    #[inline]
    #[must_use]
    pub fn pack(reading: &Reading) -> [u8; FRAME_SIZE] {
        let temperature = reading.temperature.trunc() as u32;
        let packed = pack_fields(
            temperature,
            u32::from(reading.humidity),
            u32::from(reading.wind_direction.index()),
        );
        let [_, b0, b1, b2] = packed.to_be_bytes();
        [b0, b1, b2]
    }

    /// Unpack a 3-byte frame
    ///
    /// # Errors
    /// Returns `MalformedFrame` if `bytes` is not exactly 3 bytes long, and
    /// `UnknownWindDirection` if the wind index has no table entry.
    #[inline]
    pub fn unpack(bytes: &[u8]) -> Result<CompactFrame, DecodeError> {
        let frame: [u8; FRAME_SIZE] = bytes.try_into().map_err(|_| DecodeError::MalformedFrame {
            expected: FRAME_SIZE,
            actual: bytes.len(),
        })?;
        let packed = u32::from_be_bytes([0, frame[0], frame[1], frame[2]]);
        let (temperature, humidity, wind) = unpack_fields(packed);
        let wind_direction =
            WindDirection::from_index(wind).ok_or(DecodeError::UnknownWindDirection(wind))?;

        Ok(CompactFrame {
            temperature,
            humidity,
            wind_direction,
        })
    }
}

impl Codec for CompactCodec {
    fn name(&self) -> &'static str {
        "compact"
    }

    fn encode(&self, reading: &Reading) -> Result<Vec<u8>, EncodeError> {
        Ok(Self::pack(reading).to_vec())
    }

    fn decode(&self, payload: &[u8]) -> Result<Reading, DecodeError> {
        Self::unpack(payload).map(Reading::from)
    }
}
