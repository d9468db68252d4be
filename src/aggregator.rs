//! Bounded consume loop: poll, decode, append, hand off to the sink.
//!
//! Every cycle lands in exactly one [`PollOutcome`]. Only valid readings move the
//! session forward; idle polls, transport errors and malformed payloads are logged and
//! the loop carries on. The session ends when the series holds `target` readings, or
//! earlier if a [`CancellationToken`] fires or the optional deadline passes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::bus::{Consumer, Message};
use crate::codec::Codec;
use crate::constants::{DEFAULT_HEARTBEAT_EVERY, DEFAULT_MESSAGES, DEFAULT_POLL_TIMEOUT, DEFAULT_REFRESH_PAUSE};
use crate::error::Error;
use crate::series::Series;
use crate::sink::Sink;

/// What one poll cycle amounted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollOutcome {
    /// Nothing arrived within the poll timeout
    Waiting,
    /// A reading was decoded and appended
    ReceivedValid,
    /// The bus delivered an error; discarded
    ReceivedError,
    /// A payload arrived but did not decode; discarded
    ReceivedMalformed,
    /// The series is full and has been handed to the sink
    Done,
}

/// Tunables for one consume session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Accepted readings that end the session
    pub target: usize,
    /// Longest a single poll may block
    pub poll_timeout: Duration,
    /// Log a heartbeat after this many consecutive idle polls (0 disables it)
    pub heartbeat_every: u32,
    /// Pause between cycles, left to the sink for redrawing
    pub refresh_pause: Duration,
    /// Give up once the session has run this long. `None` waits forever.
    pub deadline: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            target: DEFAULT_MESSAGES,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            heartbeat_every: DEFAULT_HEARTBEAT_EVERY,
            refresh_pause: DEFAULT_REFRESH_PAUSE,
            deadline: None,
        }
    }
}

/// Cooperative stop flag shared between a session and whoever may want to end it
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Counters for one session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub accepted: usize,
    pub transport_errors: usize,
    pub malformed: usize,
    pub idle_polls: usize,
    /// Heartbeat notices logged while waiting
    pub heartbeats: usize,
}

/// Result of a completed session
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub series: Series,
    pub stats: SessionStats,
    pub elapsed: Duration,
}

/// Consume loop state for one session
pub struct Aggregator {
    codec: Box<dyn Codec>,
    config: SessionConfig,
    series: Series,
    stats: SessionStats,
    idle_streak: u64,
    completed: bool,
    cancel: Option<CancellationToken>,
}

impl Aggregator {
    #[must_use]
    pub fn new(codec: Box<dyn Codec>, config: SessionConfig) -> Self {
        Self {
            codec,
            series: Series::with_capacity(config.target),
            config,
            stats: SessionStats::default(),
            idle_streak: 0,
            completed: false,
            cancel: None,
        }
    }

    /// Stop the session when `token` is cancelled
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    #[must_use]
    pub const fn series(&self) -> &Series {
        &self.series
    }

    #[must_use]
    pub const fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Run one poll cycle
    ///
    /// Once the series is full this returns [`PollOutcome::Done`] without polling again,
    /// and the sink's `on_complete` has been called exactly once.
    ///
    /// # Errors
    /// Returns [`Error::Export`] if the sink fails to export the completed series.
    pub fn step<C, S>(&mut self, consumer: &mut C, sink: &mut S) -> Result<PollOutcome, Error>
    where
        C: Consumer + ?Sized,
        S: Sink + ?Sized,
    {
        if self.series.is_full() {
            self.complete(sink)?;
            return Ok(PollOutcome::Done);
        }

        let outcome = match consumer.poll(self.config.poll_timeout) {
            None => self.idle(),
            Some(Message::Error(e)) => {
                self.idle_streak = 0;
                self.stats.transport_errors += 1;
                warn!(codec = self.codec.name(), "transport error, message discarded: {e}");
                PollOutcome::ReceivedError
            }
            Some(Message::Payload(payload)) => {
                self.idle_streak = 0;
                match self.codec.decode(&payload) {
                    Ok(reading) => {
                        self.series.push(&reading);
                        self.stats.accepted += 1;
                        info!(
                            "[{}/{}] received {} ({} bytes): {reading}",
                            self.series.len(),
                            self.config.target,
                            self.codec.name(),
                            payload.len()
                        );
                        sink.on_sample(&self.series);

                        if self.series.is_full() {
                            self.complete(sink)?;
                            PollOutcome::Done
                        } else {
                            PollOutcome::ReceivedValid
                        }
                    }
                    Err(e) => {
                        self.stats.malformed += 1;
                        warn!(
                            codec = self.codec.name(),
                            bytes = payload.len(),
                            "malformed payload ignored: {e}"
                        );
                        PollOutcome::ReceivedMalformed
                    }
                }
            }
        };

        Ok(outcome)
    }

    /// Poll until the series is full
    ///
    /// There is no overall timeout unless the session config sets a deadline; a channel
    /// that never delivers a valid reading keeps this running until cancelled.
    ///
    /// # Errors
    /// Returns [`Error::Cancelled`] or [`Error::DeadlineExceeded`] if the session is cut
    /// short (the sink is not told to complete), or [`Error::Export`] if the final
    /// export fails.
    pub fn run<C, S>(mut self, consumer: &mut C, sink: &mut S) -> Result<SessionReport, Error>
    where
        C: Consumer + ?Sized,
        S: Sink + ?Sized,
    {
        let started = Instant::now();
        info!(
            codec = self.codec.name(),
            target = self.config.target,
            "consume session started"
        );

        loop {
            self.check_interrupted(started)?;
            if self.step(consumer, sink)? == PollOutcome::Done {
                break;
            }
            sink.on_refresh(&self.series);
            if !self.config.refresh_pause.is_zero() {
                thread::sleep(self.config.refresh_pause);
            }
        }

        let elapsed = started.elapsed();
        info!(
            accepted = self.stats.accepted,
            transport_errors = self.stats.transport_errors,
            malformed = self.stats.malformed,
            idle_polls = self.stats.idle_polls,
            heartbeats = self.stats.heartbeats,
            ?elapsed,
            "consume session complete"
        );

        Ok(SessionReport {
            series: self.series,
            stats: self.stats,
            elapsed,
        })
    }

    fn idle(&mut self) -> PollOutcome {
        self.stats.idle_polls += 1;
        self.idle_streak = self.idle_streak.wrapping_add(1);

        let heartbeat = u64::from(self.config.heartbeat_every);
        if heartbeat > 0 && self.idle_streak % heartbeat == 0 {
            self.stats.heartbeats += 1;
            info!(
                "...waiting for {} messages ({}/{} received)",
                self.codec.name(),
                self.series.len(),
                self.config.target
            );
        } else {
            debug!(idle_streak = self.idle_streak, "poll timed out");
        }
        PollOutcome::Waiting
    }

    fn complete<S: Sink + ?Sized>(&mut self, sink: &mut S) -> Result<(), Error> {
        if !self.completed {
            self.completed = true;
            sink.on_complete(&self.series)?;
        }
        Ok(())
    }

    fn check_interrupted(&self, started: Instant) -> Result<(), Error> {
        let accepted = self.series.len();
        let target = self.config.target;

        if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
            warn!(accepted, target, "consume session cancelled");
            return Err(Error::Cancelled { accepted, target });
        }
        if let Some(deadline) = self.config.deadline {
            if started.elapsed() >= deadline {
                warn!(accepted, target, ?deadline, "consume session deadline exceeded");
                return Err(Error::DeadlineExceeded {
                    deadline,
                    accepted,
                    target,
                });
            }
        }
        Ok(())
    }
}
