//! In-process bus: one shared queue per channel.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use super::{Consumer, Message, Producer};
use crate::error::TransportError;

#[derive(Debug, Default)]
struct Shared {
    queues: Mutex<HashMap<String, VecDeque<Message>>>,
    arrived: Condvar,
}

/// In-process bus
///
/// Cloning yields another handle to the same queues. Each channel has a single queue,
/// so two consumers of one channel split its messages between them.
#[derive(Debug, Clone, Default)]
pub struct MemoryBus {
    shared: Arc<Shared>,
}

impl MemoryBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn producer(&self) -> MemoryProducer {
        MemoryProducer {
            bus: self.clone(),
            pending: Vec::new(),
        }
    }

    #[must_use]
    pub fn subscribe(&self, channel: &str) -> MemoryConsumer {
        MemoryConsumer {
            bus: self.clone(),
            channel: channel.to_string(),
        }
    }

    /// Deliver a transport error to consumers of `channel`, in order with its payloads
    pub fn inject_error(&self, channel: &str, error: TransportError) {
        self.deliver(channel, Message::Error(error));
    }

    /// Deliver a raw payload to `channel`, bypassing any producer
    pub fn inject_payload(&self, channel: &str, payload: &[u8]) {
        self.deliver(channel, Message::Payload(payload.to_vec()));
    }

    /// Number of messages waiting on `channel`
    #[must_use]
    pub fn pending(&self, channel: &str) -> usize {
        self.shared.queues.lock().get(channel).map_or(0, VecDeque::len)
    }

    fn deliver(&self, channel: &str, message: Message) {
        self.shared
            .queues
            .lock()
            .entry(channel.to_string())
            .or_default()
            .push_back(message);
        self.shared.arrived.notify_all();
    }
}

/// Producer handle of a [`MemoryBus`]
///
/// Sends are held back until `flush`.
#[derive(Debug)]
pub struct MemoryProducer {
    bus: MemoryBus,
    pending: Vec<(String, Vec<u8>)>,
}

impl Producer for MemoryProducer {
    fn send(&mut self, channel: &str, payload: &[u8]) -> Result<(), TransportError> {
        self.pending.push((channel.to_string(), payload.to_vec()));
        Ok(())
    }

    fn flush(&mut self, _timeout: Duration) -> Result<(), TransportError> {
        for (channel, payload) in self.pending.drain(..) {
            self.bus.deliver(&channel, Message::Payload(payload));
        }
        Ok(())
    }
}

/// Consumer handle of a [`MemoryBus`], bound to one channel
#[derive(Debug)]
pub struct MemoryConsumer {
    bus: MemoryBus,
    channel: String,
}

impl Consumer for MemoryConsumer {
    fn poll(&mut self, timeout: Duration) -> Option<Message> {
        let deadline = Instant::now() + timeout;
        let shared = &self.bus.shared;
        let mut queues = shared.queues.lock();

        loop {
            if let Some(message) = queues.get_mut(&self.channel).and_then(VecDeque::pop_front) {
                return Some(message);
            }
            if shared.arrived.wait_until(&mut queues, deadline).timed_out() {
                return queues.get_mut(&self.channel).and_then(VecDeque::pop_front);
            }
        }
    }
}
