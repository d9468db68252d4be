//! Paced publisher: generate, encode, send, wait for the ack, sleep.

use std::thread;
use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{info, warn};

use crate::aggregator::CancellationToken;
use crate::bus::Producer;
use crate::codec::Codec;
use crate::constants::{DEFAULT_FLUSH_TIMEOUT, DEFAULT_MESSAGES, DEFAULT_PUBLISH_INTERVAL, DEFAULT_REFRESH_PAUSE};
use crate::error::Error;
use crate::generator::SampleGenerator;

/// Tunables for one publish run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishConfig {
    pub channel: String,
    /// Messages to send before stopping
    pub count: usize,
    /// Sleep between two sends
    pub interval: Duration,
    /// Longest wait for the bus to acknowledge a send
    pub flush_timeout: Duration,
}

impl PublishConfig {
    #[must_use]
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            count: DEFAULT_MESSAGES,
            interval: DEFAULT_PUBLISH_INTERVAL,
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
        }
    }
}

/// Totals for a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub sent: usize,
    /// Payload bytes sent, excluding any bus framing
    pub bytes: usize,
}

/// Sends `count` generated readings to one channel
pub struct Publisher<R: Rng> {
    codec: Box<dyn Codec>,
    generator: SampleGenerator<R>,
    config: PublishConfig,
    cancel: Option<CancellationToken>,
}

impl<R: Rng> Publisher<R> {
    #[must_use]
    pub fn new(codec: Box<dyn Codec>, generator: SampleGenerator<R>, config: PublishConfig) -> Self {
        Self {
            codec,
            generator,
            config,
            cancel: None,
        }
    }

    /// Stop before the next send once `token` is cancelled
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Publish every message, one at a time
    ///
    /// Each send is flushed before the next reading is generated. There is no retry:
    /// the first refused send or flush ends the run.
    ///
    /// # Errors
    /// Returns [`Error::Publish`] if the bus refuses a send or a flush,
    /// [`Error::Encode`] if a reading cannot be serialized, or
    /// [`Error::PublishCancelled`] if the cancellation token fires.
    pub fn run<P: Producer + ?Sized>(&mut self, producer: &mut P) -> Result<PublishReport, Error> {
        let started = Instant::now();
        let count = self.config.count;
        let mut report = PublishReport::default();
        info!(
            codec = self.codec.name(),
            channel = %self.config.channel,
            count,
            "publish run started"
        );

        for i in 0..count {
            if self.is_cancelled() {
                warn!(sent = report.sent, count, "publish run cancelled");
                return Err(Error::PublishCancelled {
                    sent: report.sent,
                    count,
                });
            }

            let reading = self.generator.generate();
            let payload = self.codec.encode(&reading)?;

            producer
                .send(&self.config.channel, &payload)
                .and_then(|()| producer.flush(self.config.flush_timeout))
                .map_err(|source| Error::Publish {
                    channel: self.config.channel.clone(),
                    index: i,
                    source,
                })?;

            report.sent += 1;
            report.bytes += payload.len();
            info!(
                "[{}/{count}] sent {} ({} bytes): {reading}",
                i + 1,
                self.codec.name(),
                payload.len()
            );

            if i + 1 < count {
                self.pace();
            }
        }

        info!(
            sent = report.sent,
            bytes = report.bytes,
            elapsed = ?started.elapsed(),
            "publish run finished"
        );
        Ok(report)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    /// Sleep for the configured interval, waking early on cancellation
    fn pace(&self) {
        let deadline = Instant::now() + self.config.interval;
        loop {
            let now = Instant::now();
            if now >= deadline || self.is_cancelled() {
                return;
            }
            thread::sleep(DEFAULT_REFRESH_PAUSE.min(deadline - now));
        }
    }
}
