#![no_main]

use libfuzzer_sys::fuzz_target;
use windpack::{Codec, CompactCodec, DecodeError};

fuzz_target!(|data: &[u8]| {
    // Only 3-byte frames decode; every one of them must
    match CompactCodec.decode(data) {
        Ok(reading) => {
            assert_eq!(data.len(), 3);
            assert!(reading.temperature >= 0.0 && reading.temperature < 16384.0);
            assert!(reading.humidity < 128);
        }
        Err(e) => {
            assert_ne!(data.len(), 3);
            assert_eq!(
                e,
                DecodeError::MalformedFrame {
                    expected: 3,
                    actual: data.len()
                }
            );
        }
    }
});
