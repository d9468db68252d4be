#![no_main]

use libfuzzer_sys::fuzz_target;
use windpack::{Codec, EncodeError, VerboseCodec};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must never panic
    let Ok(reading) = VerboseCodec.decode(data) else {
        return;
    };

    // Whatever the codec emits, it must read back
    match VerboseCodec.encode(&reading) {
        Ok(payload) => {
            let again = VerboseCodec.decode(&payload).unwrap();
            assert_eq!(again.humidity, reading.humidity);
            assert_eq!(again.wind_direction, reading.wind_direction);
        }
        Err(EncodeError::NonFiniteTemperature(t)) => assert!(!(t * 100.0).is_finite()),
        Err(e) => panic!("unexpected encode error: {e}"),
    }
});
