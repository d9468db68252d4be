//! Internal constants and helper functions for the compact frame layout.

use std::time::Duration;

/// Compact frame size in bytes (24 bits)
pub(crate) const FRAME_SIZE: usize = 3;

/// Temperature field: bits 23-10
pub(crate) const TEMP_SHIFT: u32 = 10;
pub(crate) const TEMP_MASK: u32 = 0x3FFF;

/// Humidity field: bits 9-3
pub(crate) const HUMIDITY_SHIFT: u32 = 3;
pub(crate) const HUMIDITY_MASK: u32 = 0x7F;

/// Wind direction field: bits 2-0
pub(crate) const WIND_MASK: u32 = 0x07;

/// Temperature domain clamp, in degrees
pub(crate) const TEMP_MIN: f64 = 0.0;
pub(crate) const TEMP_MAX: f64 = 110.0;

/// Normal distribution the generator draws temperatures from
pub(crate) const TEMP_MEAN: f64 = 55.0;
pub(crate) const TEMP_STD_DEV: f64 = 20.0;

/// Upper bound for generated humidity (inclusive)
pub(crate) const HUMIDITY_MAX: u8 = 100;

/// Readings per publish run and per consume session
pub(crate) const DEFAULT_MESSAGES: usize = 7;

pub(crate) const DEFAULT_PUBLISH_INTERVAL: Duration = Duration::from_secs(1);
pub(crate) const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(10);
pub(crate) const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(500);
pub(crate) const DEFAULT_REFRESH_PAUSE: Duration = Duration::from_millis(50);

/// Consecutive idle polls between two heartbeat log lines
pub(crate) const DEFAULT_HEARTBEAT_EVERY: u32 = 10;

pub(crate) const VERBOSE_CHANNEL: &str = "station.verbose";
pub(crate) const COMPACT_CHANNEL: &str = "station.compact";

/// Pack the three compact fields into the low 24 bits of a `u32`
///
/// Fields are not masked: a temperature above 16383, a humidity above 127 or a wind
/// index above 7 spills into the neighbouring field.
#[inline]
pub(crate) const fn pack_fields(temperature: u32, humidity: u32, wind: u32) -> u32 {
    (temperature << TEMP_SHIFT) | (humidity << HUMIDITY_SHIFT) | wind
}

/// Unpack the three compact fields from a 24-bit value
/// Returns (`temperature`, `humidity`, `wind_index`)
#[inline]
pub(crate) const fn unpack_fields(packed: u32) -> (u16, u8, u8) {
    let temperature = ((packed >> TEMP_SHIFT) & TEMP_MASK) as u16;
    let humidity = ((packed >> HUMIDITY_SHIFT) & HUMIDITY_MASK) as u8;
    let wind = (packed & WIND_MASK) as u8;
    (temperature, humidity, wind)
}

/// Round to two decimal places (half away from zero)
#[inline]
pub(crate) fn round_centi(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
