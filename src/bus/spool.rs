//! Directory-backed bus: one append-only spool file per channel.
//!
//! A record is a 4-byte big-endian length followed by that many payload bytes. Producers
//! append whole records and sync the file on flush; consumers read from the first record
//! and keep an offset, so a consumer started after the producer still sees everything.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::{Consumer, Message, Producer};
use crate::error::TransportError;

/// Largest payload a record may carry (64 KiB)
pub const MAX_RECORD_SIZE: u32 = 64 * 1024;

const LENGTH_PREFIX: u64 = 4;
const SPOOL_EXTENSION: &str = "spool";

/// How often a waiting consumer re-checks its spool file
const RETRY_INTERVAL: Duration = Duration::from_millis(20);

/// Bus rooted at a spool directory
#[derive(Debug, Clone)]
pub struct SpoolBus {
    dir: PathBuf,
}

impl SpoolBus {
    /// Open (creating if needed) the spool directory
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, TransportError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Spool file backing `channel`
    #[must_use]
    pub fn channel_path(&self, channel: &str) -> PathBuf {
        self.dir.join(format!("{channel}.{SPOOL_EXTENSION}"))
    }

    #[must_use]
    pub fn producer(&self) -> SpoolProducer {
        SpoolProducer {
            bus: self.clone(),
            pending: VecDeque::new(),
        }
    }

    /// Consume `channel` from its first record
    #[must_use]
    pub fn subscribe(&self, channel: &str) -> SpoolConsumer {
        SpoolConsumer {
            path: self.channel_path(channel),
            file: None,
            offset: 0,
        }
    }
}

/// Producer for a [`SpoolBus`]
///
/// Sends are buffered; `flush` appends them and syncs each touched spool file.
#[derive(Debug)]
pub struct SpoolProducer {
    bus: SpoolBus,
    pending: VecDeque<(String, Vec<u8>)>,
}

impl SpoolProducer {
    fn append(&self, channel: &str, payload: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.bus.channel_path(channel))?;

        // One write per record keeps records contiguous under O_APPEND
        let mut record = Vec::with_capacity(LENGTH_PREFIX as usize + payload.len());
        record.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        record.extend_from_slice(payload);
        write_record(&mut file, &record)
    }
}

/// Append-only storage a failed record can be cut back out of
trait RecordLog: Write {
    fn size(&self) -> io::Result<u64>;
    fn truncate(&mut self, size: u64) -> io::Result<()>;
    fn sync(&mut self) -> io::Result<()>;
}

impl RecordLog for File {
    fn size(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate(&mut self, size: u64) -> io::Result<()> {
        self.set_len(size)
    }

    fn sync(&mut self) -> io::Result<()> {
        self.sync_data()
    }
}

/// Write and sync one whole record
///
/// On failure the log is truncated to its previous size, so the record can be
/// appended again without leaving a torn prefix in front of it.
fn write_record<L: RecordLog>(log: &mut L, record: &[u8]) -> io::Result<()> {
    let size = log.size()?;
    if let Err(e) = log.write_all(record).and_then(|()| log.sync()) {
        if let Err(rollback) = log.truncate(size) {
            warn!(size, "failed to roll back partial spool record: {rollback}");
        }
        return Err(e);
    }
    Ok(())
}

impl Producer for SpoolProducer {
    fn send(&mut self, channel: &str, payload: &[u8]) -> Result<(), TransportError> {
        if payload.len() > MAX_RECORD_SIZE as usize {
            return Err(TransportError::RecordTooLarge {
                length: payload.len(),
                max: MAX_RECORD_SIZE,
            });
        }
        self.pending.push_back((channel.to_string(), payload.to_vec()));
        Ok(())
    }

    fn flush(&mut self, timeout: Duration) -> Result<(), TransportError> {
        let deadline = Instant::now() + timeout;

        // Records that were not written stay queued for the next flush
        while let Some((channel, payload)) = self.pending.front() {
            if Instant::now() > deadline {
                return Err(TransportError::FlushTimeout(timeout));
            }
            self.append(channel, payload)?;
            self.pending.pop_front();
        }
        Ok(())
    }
}

/// Consumer for one channel of a [`SpoolBus`]
#[derive(Debug)]
pub struct SpoolConsumer {
    path: PathBuf,
    file: Option<File>,
    offset: u64,
}

impl SpoolConsumer {
    /// Byte offset of the next record to read
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Read the next complete record, if one is there
    ///
    /// A record still being written counts as absent. A length prefix over
    /// [`MAX_RECORD_SIZE`] cannot be resynchronized from, so the rest of the file is
    /// skipped and the error is returned once.
    fn try_next(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        if self.file.is_none() {
            match File::open(&self.path) {
                Ok(file) => self.file = Some(file),
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
                Err(e) => return Err(e.into()),
            }
        }
        let Some(file) = self.file.as_mut() else {
            return Ok(None);
        };

        let available = file.metadata()?.len();
        if available < self.offset + LENGTH_PREFIX {
            return Ok(None);
        }

        file.seek(SeekFrom::Start(self.offset))?;
        let mut prefix = [0u8; LENGTH_PREFIX as usize];
        file.read_exact(&mut prefix)?;
        let length = u32::from_be_bytes(prefix);

        if length > MAX_RECORD_SIZE {
            let offset = self.offset;
            self.offset = available;
            return Err(TransportError::Corrupt {
                offset,
                length,
                max: MAX_RECORD_SIZE,
            });
        }

        let end = self.offset + LENGTH_PREFIX + u64::from(length);
        if available < end {
            return Ok(None);
        }

        let mut payload = vec![0u8; length as usize];
        file.read_exact(&mut payload)?;
        self.offset = end;
        Ok(Some(payload))
    }
}

impl Consumer for SpoolConsumer {
    fn poll(&mut self, timeout: Duration) -> Option<Message> {
        let deadline = Instant::now() + timeout;

        loop {
            match self.try_next() {
                Ok(Some(payload)) => return Some(Message::Payload(payload)),
                Ok(None) => {}
                Err(e) => {
                    // Reopen on the next poll in case the file was replaced
                    self.file = None;
                    return Some(Message::Error(e));
                }
            }

            let now = Instant::now();
            if now >= deadline {
                debug!(path = %self.path.display(), offset = self.offset, "no record before poll timeout");
                return None;
            }
            std::thread::sleep(RETRY_INTERVAL.min(deadline - now));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory log that accepts `budget` bytes, then fails every write
    struct FlakyLog {
        data: Vec<u8>,
        budget: usize,
    }

    impl Write for FlakyLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.budget == 0 {
                return Err(io::Error::other("device full"));
            }
            let n = buf.len().min(self.budget);
            self.data.extend_from_slice(&buf[..n]);
            self.budget -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl RecordLog for FlakyLog {
        fn size(&self) -> io::Result<u64> {
            Ok(self.data.len() as u64)
        }

        fn truncate(&mut self, size: u64) -> io::Result<()> {
            self.data.truncate(size as usize);
            Ok(())
        }

        fn sync(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_torn_write_is_rolled_back() {
        let mut log = FlakyLog {
            data: vec![0, 0, 0, 1, 0xAA],
            budget: 3,
        };

        let record = [0, 0, 0, 3, 0x01, 0x21, 0x6B];
        assert!(write_record(&mut log, &record).is_err());
        assert_eq!(log.data, [0, 0, 0, 1, 0xAA]);

        // Retrying leaves exactly one copy of the record after the first one
        log.budget = usize::MAX;
        write_record(&mut log, &record).unwrap();
        assert_eq!(log.data, [0, 0, 0, 1, 0xAA, 0, 0, 0, 3, 0x01, 0x21, 0x6B]);
    }

    #[test]
    fn test_failed_flush_keeps_record_pending() {
        let dir = tempfile::tempdir().unwrap();
        let bus = SpoolBus::open(dir.path()).unwrap();
        let mut producer = bus.producer();

        // A directory where the spool file should be makes the append fail
        fs::create_dir(bus.channel_path("c")).unwrap();
        producer.send("c", b"kept").unwrap();
        assert!(matches!(producer.flush(Duration::from_secs(1)), Err(TransportError::Io(_))));
        assert_eq!(producer.pending.len(), 1);

        fs::remove_dir(bus.channel_path("c")).unwrap();
        producer.flush(Duration::from_secs(1)).unwrap();
        assert!(producer.pending.is_empty());

        let mut consumer = bus.subscribe("c");
        assert_eq!(consumer.poll(Duration::ZERO).unwrap().payload(), Some(&b"kept"[..]));
        assert!(consumer.poll(Duration::ZERO).is_none());
    }
}
