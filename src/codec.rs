//! The wire-format capability shared by the publisher and the consume loop.

use std::fmt;

use clap::ValueEnum;

use crate::compact::CompactCodec;
use crate::constants::{COMPACT_CHANNEL, VERBOSE_CHANNEL};
use crate::error::{DecodeError, EncodeError};
use crate::reading::Reading;
use crate::verbose::VerboseCodec;

/// Encodes readings to payload bytes and decodes them back
///
/// Producer and consumer of a channel must use the same codec; nothing on the wire
/// says which one was used.
pub trait Codec: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Serialize one reading
    ///
    /// # Errors
    /// Returns an error if the reading cannot be serialized.
    fn encode(&self, reading: &Reading) -> Result<Vec<u8>, EncodeError>;

    /// Deserialize one payload
    ///
    /// # Errors
    /// Returns a [`DecodeError`] describing why the payload was rejected.
    fn decode(&self, payload: &[u8]) -> Result<Reading, DecodeError>;
}

/// Wire format selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Format {
    /// Self-describing JSON payload
    Verbose,
    /// 3-byte bit-packed frame
    Compact,
}

impl Format {
    /// Build the codec for this format
    #[must_use]
    pub fn codec(self) -> Box<dyn Codec> {
        match self {
            Self::Verbose => Box::new(VerboseCodec),
            Self::Compact => Box::new(CompactCodec),
        }
    }

    /// Channel this format travels on unless configured otherwise
    #[must_use]
    pub const fn default_channel(self) -> &'static str {
        match self {
            Self::Verbose => VERBOSE_CHANNEL,
            Self::Compact => COMPACT_CHANNEL,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Verbose => "verbose",
            Self::Compact => "compact",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
