//! Synthetic station readings.

use rand::Rng;
use rand_distr::StandardNormal;

use crate::constants::{round_centi, HUMIDITY_MAX, TEMP_MAX, TEMP_MEAN, TEMP_MIN, TEMP_STD_DEV};
use crate::reading::{Reading, WindDirection};

/// Produces one random reading per call
///
/// Owns its random source, so a seeded RNG yields a reproducible sequence.
///
/// # Example
/// ```
/// use rand::{rngs::StdRng, SeedableRng};
/// use windpack::SampleGenerator;
///
/// let mut generator = SampleGenerator::new(StdRng::seed_from_u64(7));
/// let reading = generator.generate();
/// assert!((0.0..=110.0).contains(&reading.temperature));
/// assert!(reading.humidity <= 100);
/// ```
#[derive(Debug, Clone)]
pub struct SampleGenerator<R: Rng> {
    rng: R,
}

impl<R: Rng> SampleGenerator<R> {
    #[must_use]
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Draw the next reading
    ///
    /// Temperature is N(55, 20) rounded to 2 decimals and clamped to [0, 110]; humidity
    /// and wind direction are uniform.
    pub fn generate(&mut self) -> Reading {
        let z: f64 = self.rng.sample(StandardNormal);
        let temperature = round_centi(TEMP_MEAN + TEMP_STD_DEV * z).clamp(TEMP_MIN, TEMP_MAX);
        let humidity = self.rng.random_range(0..=HUMIDITY_MAX);
        let wind_direction = WindDirection::ALL[self.rng.random_range(0..WindDirection::ALL.len())];

        Reading::new(temperature, humidity, wind_direction)
    }
}
