use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::SeedableRng;
use windpack::bus::MemoryBus;
use windpack::sink::render_svg;
use windpack::{
    Aggregator, Codec, CompactCodec, Format, PublishConfig, Publisher, Reading, SampleGenerator, Series,
    SessionConfig, Sink, SinkError, VerboseCodec,
};

fn readings(count: usize) -> Vec<Reading> {
    let mut generator = SampleGenerator::new(StdRng::seed_from_u64(1));
    (0..count).map(|_| generator.generate()).collect()
}

fn codecs() -> [(&'static str, &'static dyn Codec); 2] {
    [("compact", &CompactCodec), ("verbose", &VerboseCodec)]
}

fn bench_encode(c: &mut Criterion) {
    let readings = readings(1000);
    let mut group = c.benchmark_group("encode");
    group.throughput(Throughput::Elements(readings.len() as u64));

    for (name, codec) in codecs() {
        group.bench_function(name, |b| {
            b.iter(|| {
                for r in &readings {
                    black_box(codec.encode(black_box(r)).unwrap());
                }
            })
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let readings = readings(1000);
    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Elements(readings.len() as u64));

    for (name, codec) in codecs() {
        let payloads: Vec<Vec<u8>> = readings.iter().map(|r| codec.encode(r).unwrap()).collect();
        group.bench_function(name, |b| {
            b.iter(|| {
                for p in &payloads {
                    black_box(codec.decode(black_box(p)).unwrap());
                }
            })
        });
    }
    group.finish();
}

struct NullSink;

impl Sink for NullSink {
    fn on_sample(&mut self, series: &Series) {
        black_box(series.len());
    }

    fn on_complete(&mut self, series: &Series) -> Result<(), SinkError> {
        black_box(render_svg(series, "bench"));
        Ok(())
    }
}

fn bench_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");
    group.throughput(Throughput::Elements(100));

    for format in [Format::Compact, Format::Verbose] {
        group.bench_function(format.name(), |b| {
            b.iter(|| {
                let bus = MemoryBus::new();
                let config = PublishConfig {
                    count: 100,
                    interval: Duration::ZERO,
                    ..PublishConfig::new("bench")
                };
                let generator = SampleGenerator::new(StdRng::seed_from_u64(2));
                Publisher::new(format.codec(), generator, config)
                    .run(&mut bus.producer())
                    .unwrap();

                let session = SessionConfig {
                    target: 100,
                    poll_timeout: Duration::ZERO,
                    refresh_pause: Duration::ZERO,
                    ..SessionConfig::default()
                };
                let report = Aggregator::new(format.codec(), session)
                    .run(&mut bus.subscribe("bench"), &mut NullSink)
                    .unwrap();
                black_box(report.series)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode, bench_session);
criterion_main!(benches);
