//! Station-wide settings shared by the publish and consume operations.

use std::path::PathBuf;
use std::time::Duration;

use crate::aggregator::SessionConfig;
use crate::codec::Format;
use crate::constants::{
    COMPACT_CHANNEL, DEFAULT_FLUSH_TIMEOUT, DEFAULT_HEARTBEAT_EVERY, DEFAULT_MESSAGES, DEFAULT_POLL_TIMEOUT,
    DEFAULT_PUBLISH_INTERVAL, DEFAULT_REFRESH_PAUSE, VERBOSE_CHANNEL,
};
use crate::publisher::PublishConfig;

/// Every tunable of the station, with the defaults used by the CLI
///
/// Producer and consumer of a format must agree on its channel name; nothing on the
/// bus advertises it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationConfig {
    /// Spool directory backing the bus
    pub bus_dir: PathBuf,
    pub verbose_channel: String,
    pub compact_channel: String,
    /// Messages per publish run, and readings per consume session
    pub messages: usize,
    pub publish_interval: Duration,
    pub flush_timeout: Duration,
    pub poll_timeout: Duration,
    pub heartbeat_every: u32,
    pub refresh_pause: Duration,
    /// Optional bound on a consume session
    pub deadline: Option<Duration>,
    /// Where charts are written
    pub chart_dir: PathBuf,
    /// Rewrite the chart after every accepted reading
    pub live_chart: bool,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            bus_dir: PathBuf::from("spool"),
            verbose_channel: VERBOSE_CHANNEL.to_string(),
            compact_channel: COMPACT_CHANNEL.to_string(),
            messages: DEFAULT_MESSAGES,
            publish_interval: DEFAULT_PUBLISH_INTERVAL,
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            heartbeat_every: DEFAULT_HEARTBEAT_EVERY,
            refresh_pause: DEFAULT_REFRESH_PAUSE,
            deadline: None,
            chart_dir: PathBuf::from("."),
            live_chart: false,
        }
    }
}

impl StationConfig {
    #[must_use]
    pub fn channel(&self, format: Format) -> &str {
        match format {
            Format::Verbose => &self.verbose_channel,
            Format::Compact => &self.compact_channel,
        }
    }

    #[must_use]
    pub fn publish_config(&self, format: Format) -> PublishConfig {
        PublishConfig {
            channel: self.channel(format).to_string(),
            count: self.messages,
            interval: self.publish_interval,
            flush_timeout: self.flush_timeout,
        }
    }

    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            target: self.messages,
            poll_timeout: self.poll_timeout,
            heartbeat_every: self.heartbeat_every,
            refresh_pause: self.refresh_pause,
            deadline: self.deadline,
        }
    }

    /// Chart file for a format, e.g. `chart_compact.svg`
    #[must_use]
    pub fn chart_path(&self, format: Format) -> PathBuf {
        self.chart_dir.join(format!("chart_{format}.svg"))
    }
}
