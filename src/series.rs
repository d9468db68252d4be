//! Bounded temperature/humidity series built by the consume loop.

use crate::reading::Reading;

/// Two parallel, append-only sequences in arrival order
///
/// Never grows past its capacity: once full, further pushes are refused.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    temperatures: Vec<f64>,
    humidities: Vec<u8>,
    capacity: usize,
}

impl Series {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            temperatures: Vec::with_capacity(capacity),
            humidities: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a reading's temperature and humidity
    ///
    /// Returns `false` (and leaves the series untouched) if the series is already full.
    pub fn push(&mut self, reading: &Reading) -> bool {
        if self.is_full() {
            return false;
        }
        self.temperatures.push(reading.temperature);
        self.humidities.push(reading.humidity);
        true
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.temperatures.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.temperatures.is_empty()
    }

    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    #[must_use]
    pub fn temperatures(&self) -> &[f64] {
        &self.temperatures
    }

    #[must_use]
    pub fn humidities(&self) -> &[u8] {
        &self.humidities
    }
}
