use std::time::Duration;

use proptest::prelude::*;

use crate::bus::{Consumer, Message};
use crate::constants::round_centi;
use crate::{
    Aggregator, Codec, CompactCodec, DecodeError, Format, Reading, Series, SessionConfig, Sink, SinkError,
    TransportError, VerboseCodec, WindDirection,
};

prop_compose! {
    /// A reading inside the generator's domain, with 2-decimal temperature
    fn arb_reading()(
        centi in 0u32..=11_000,
        humidity in 0u8..=100,
        wind in 0u8..8,
    ) -> Reading {
        let wind_direction = WindDirection::from_index(wind).unwrap();
        Reading::new(f64::from(centi) / 100.0, humidity, wind_direction)
    }
}

/// One poll result in a generated consume script
#[derive(Debug, Clone)]
enum Poll {
    Idle,
    TransportError,
    Garbage(Vec<u8>),
    Valid(Reading),
}

fn arb_poll() -> impl Strategy<Value = Poll> {
    prop_oneof![
        1 => Just(Poll::Idle),
        1 => Just(Poll::TransportError),
        1 => prop::collection::vec(any::<u8>(), 0..8)
            .prop_filter("compact frames are exactly 3 bytes", |b| b.len() != 3)
            .prop_map(Poll::Garbage),
        3 => arb_reading().prop_map(Poll::Valid),
    ]
}

struct ReplayConsumer(std::vec::IntoIter<Poll>);

impl Consumer for ReplayConsumer {
    fn poll(&mut self, _timeout: Duration) -> Option<Message> {
        match self.0.next()? {
            Poll::Idle => None,
            Poll::TransportError => Some(Message::Error(TransportError::Broker("injected".to_string()))),
            Poll::Garbage(bytes) => Some(Message::Payload(bytes)),
            Poll::Valid(reading) => Some(Message::Payload(CompactCodec::pack(&reading).to_vec())),
        }
    }
}

#[derive(Default)]
struct CountingSink {
    samples: usize,
    completions: Vec<usize>,
}

impl Sink for CountingSink {
    fn on_sample(&mut self, _series: &Series) {
        self.samples += 1;
    }

    fn on_complete(&mut self, series: &Series) -> Result<(), SinkError> {
        self.completions.push(series.len());
        Ok(())
    }
}

/// Generate codec properties shared by both wire formats
macro_rules! proptest_codec {
    ($codec:expr, $mod_name:ident) => {
        mod $mod_name {
            use super::*;

            proptest! {
                /// Property: humidity and wind direction survive a round trip exactly
                #[test]
                fn prop_roundtrip_keeps_humidity_and_wind(reading in arb_reading()) {
                    let codec = $codec;
                    let decoded = codec.decode(&codec.encode(&reading).unwrap()).unwrap();
                    prop_assert_eq!(decoded.humidity, reading.humidity);
                    prop_assert_eq!(decoded.wind_direction, reading.wind_direction);
                }

                /// Property: decoding never panics, whatever the bytes
                #[test]
                fn prop_decode_arbitrary_bytes(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
                    let _ = $codec.decode(&bytes);
                }

                /// Property: encoding is deterministic
                #[test]
                fn prop_encode_deterministic(reading in arb_reading()) {
                    let codec = $codec;
                    prop_assert_eq!(codec.encode(&reading).unwrap(), codec.encode(&reading).unwrap());
                }
            }
        }
    };
}

proptest_codec!(CompactCodec, compact_codec);
proptest_codec!(VerboseCodec, verbose_codec);

proptest! {
    /// Property: compact frames are always 3 bytes and keep only the integer temperature
    #[test]
    fn prop_compact_truncates_temperature(reading in arb_reading()) {
        let bytes = CompactCodec::pack(&reading);
        prop_assert_eq!(bytes.len(), 3);

        let frame = CompactCodec::unpack(&bytes).unwrap();
        prop_assert_eq!(f64::from(frame.temperature), reading.temperature.trunc());
        prop_assert!(frame.temperature <= 110);
    }

    /// Property: every 3-byte frame decodes, and re-encodes to the same bytes
    #[test]
    fn prop_compact_frame_identity(bytes in any::<[u8; 3]>()) {
        let reading = CompactCodec.decode(&bytes).unwrap();
        prop_assert_eq!(CompactCodec::pack(&reading), bytes);
    }

    /// Property: any length other than 3 is a malformed frame
    #[test]
    fn prop_compact_rejects_other_lengths(
        bytes in prop::collection::vec(any::<u8>(), 0..32).prop_filter("not 3 bytes", |b| b.len() != 3)
    ) {
        prop_assert_eq!(
            CompactCodec::unpack(&bytes),
            Err(DecodeError::MalformedFrame { expected: 3, actual: bytes.len() })
        );
    }

    /// Property: verbose payloads reproduce a 2-decimal reading exactly
    #[test]
    fn prop_verbose_exact(reading in arb_reading()) {
        let payload = VerboseCodec.encode(&reading).unwrap();
        let decoded = VerboseCodec.decode(&payload).unwrap();
        prop_assert_eq!(decoded.temperature, round_centi(reading.temperature));
        prop_assert_eq!(decoded, reading);
    }

    /// Property: the consume loop keeps valid readings in arrival order, stops at the
    /// target, and completes once with exactly `target` samples
    #[test]
    fn prop_aggregator_accepts_valid_in_order(
        script in prop::collection::vec(arb_poll(), 0..60),
        target in 1usize..10,
    ) {
        let valid: Vec<f64> = script
            .iter()
            .filter_map(|p| match p {
                Poll::Valid(r) => Some(r.temperature.trunc()),
                _ => None,
            })
            .collect();
        prop_assume!(valid.len() >= target);

        let config = SessionConfig {
            target,
            poll_timeout: Duration::ZERO,
            heartbeat_every: 0,
            refresh_pause: Duration::ZERO,
            deadline: None,
        };
        let mut consumer = ReplayConsumer(script.into_iter());
        let mut sink = CountingSink::default();
        let report = Aggregator::new(Format::Compact.codec(), config)
            .run(&mut consumer, &mut sink)
            .unwrap();

        prop_assert_eq!(report.series.temperatures(), &valid[..target]);
        prop_assert_eq!(report.stats.accepted, target);
        prop_assert_eq!(sink.samples, target);
        prop_assert_eq!(sink.completions, vec![target]);
    }
}
