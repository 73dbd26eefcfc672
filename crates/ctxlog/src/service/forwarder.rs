//! Side-channel forwarder - bounded, drop-on-full hand-off to a consumer task
//!
//! ```text
//! emit / forward ──try_send──▶ [ bounded queue (10 000) ] ──recv──▶ consumer
//!        │
//!        └── queue full or consumer gone: record dropped, diagnostic
//!            written to the primary sink, producer never waits
//! ```
//!
//! The side channel is independent of the primary sink: nothing orders a
//! forwarded record relative to the line written for it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

/// Default side channel capacity.
pub const SIDE_CHANNEL_CAPACITY: usize = 10_000;

/// Why a record did not make it into the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ForwardError {
    #[error("side channel full")]
    Full,
    #[error("side channel consumer is gone")]
    Closed,
    #[error("no side channel attached")]
    Unattached,
}

/// Producer half. Cheap to clone; all clones share one queue and one drop
/// counter.
#[derive(Debug, Clone)]
pub struct Forwarder {
    name: &'static str,
    sender: mpsc::Sender<String>,
    dropped: Arc<AtomicU64>,
}

impl Forwarder {
    /// Queue with the default capacity.
    pub fn channel(name: &'static str) -> (Self, ForwardReceiver) {
        Self::with_capacity(name, SIDE_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(name: &'static str, capacity: usize) -> (Self, ForwardReceiver) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (
            Self {
                name,
                sender,
                dropped: Arc::new(AtomicU64::new(0)),
            },
            ForwardReceiver { receiver },
        )
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Enqueue `line` without waiting. On failure the line is dropped and
    /// counted.
    pub fn forward(&self, line: String) -> Result<(), ForwardError> {
        match self.sender.try_send(line) {
            Ok(()) => Ok(()),
            Err(e) => {
                let err = match e {
                    mpsc::error::TrySendError::Full(_) => ForwardError::Full,
                    mpsc::error::TrySendError::Closed(_) => ForwardError::Closed,
                };
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                debug!(
                    channel = self.name,
                    reason = %err,
                    dropped_total = dropped,
                    "[Forwarder] Dropped record"
                );
                Err(err)
            }
        }
    }

    /// Records currently waiting in the queue.
    pub fn depth(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }

    pub fn capacity(&self) -> usize {
        self.sender.max_capacity()
    }

    /// Records dropped since the channel was created.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Consumer half, owned by whatever ships records onward.
#[derive(Debug)]
pub struct ForwardReceiver {
    receiver: mpsc::Receiver<String>,
}

impl ForwardReceiver {
    /// Next record; `None` once every producer is gone and the queue is
    /// drained.
    pub async fn recv(&mut self) -> Option<String> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<String> {
        self.receiver.try_recv().ok()
    }

    /// Take everything currently queued.
    pub fn drain(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(line) = self.receiver.try_recv() {
            out.push(line);
        }
        out
    }
}
