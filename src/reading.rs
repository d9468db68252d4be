//! Reading struct and the wind-direction table shared by both wire formats.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One weather-station sample
///
/// Verbose payloads key the fields by the station's own names, the same vocabulary as
/// the [`WindDirection`] codes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Degrees, clamped to [0, 110] by the generator
    #[serde(rename = "temperatura")]
    pub temperature: f64,
    /// Relative humidity in percent, [0, 100]
    #[serde(rename = "humedad")]
    pub humidity: u8,
    #[serde(rename = "direccion_viento")]
    pub wind_direction: WindDirection,
}

impl Reading {
    #[must_use]
    pub const fn new(temperature: f64, humidity: u8, wind_direction: WindDirection) -> Self {
        Self {
            temperature,
            humidity,
            wind_direction,
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "temp: {:.2} / hum: {}% / wind: {}",
            self.temperature, self.humidity, self.wind_direction
        )
    }
}

/// Compass direction of the wind
///
/// The discriminant is the 3-bit index carried by compact frames and the
/// serialized name is the string carried by verbose payloads. Both are wire format:
/// do not reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum WindDirection {
    #[serde(rename = "N")]
    North = 0,
    #[serde(rename = "NO")]
    NorthWest = 1,
    #[serde(rename = "O")]
    West = 2,
    #[serde(rename = "SO")]
    SouthWest = 3,
    #[serde(rename = "S")]
    South = 4,
    #[serde(rename = "SE")]
    SouthEast = 5,
    #[serde(rename = "E")]
    East = 6,
    #[serde(rename = "NE")]
    NorthEast = 7,
}

impl WindDirection {
    /// All directions, in index order
    pub const ALL: [Self; 8] = [
        Self::North,
        Self::NorthWest,
        Self::West,
        Self::SouthWest,
        Self::South,
        Self::SouthEast,
        Self::East,
        Self::NorthEast,
    ];

    /// Look up a direction by its 3-bit index
    #[inline]
    #[must_use]
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    #[inline]
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Short name used on the wire
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::North => "N",
            Self::NorthWest => "NO",
            Self::West => "O",
            Self::SouthWest => "SO",
            Self::South => "S",
            Self::SouthEast => "SE",
            Self::East => "E",
            Self::NorthEast => "NE",
        }
    }
}

impl fmt::Display for WindDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
