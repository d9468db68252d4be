#![no_main]

use libfuzzer_sys::fuzz_target;
use windpack::{Codec, CompactCodec, Reading, WindDirection};

fuzz_target!(|data: &[u8]| {
    if data.len() < 10 {
        return;
    }

    // 8 bytes of temperature, then humidity and wind index
    let temperature = f64::from_le_bytes(data[..8].try_into().unwrap());
    if !temperature.is_finite() || !(0.0..=110.0).contains(&temperature) {
        return;
    }
    let humidity = data[8] % 101;
    let wind_direction = WindDirection::ALL[usize::from(data[9] % 8)];
    let reading = Reading::new(temperature, humidity, wind_direction);

    let frame = CompactCodec::pack(&reading);
    let decoded = CompactCodec.decode(&frame).unwrap();

    assert_eq!(decoded.temperature, temperature.trunc());
    assert_eq!(decoded.humidity, humidity);
    assert_eq!(decoded.wind_direction, wind_direction);
    assert_eq!(CompactCodec::pack(&decoded), frame);
});
