//! Broadcast fanout to connected viewers
//!
//! Every viewer owns a bounded outbound queue drained by its WebSocket
//! task. Broadcasting serializes an event once and offers the same frame
//! to each queue with `try_send`, so a slow or departed viewer never
//! stalls delivery to the others or the next datagram.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

use crate::error::ViewerError;
use crate::protocol::OutgoingEvent;

/// Serialized JSON text frame, shared across all viewer queues
pub type Frame = Arc<str>;

pub type ViewerId = Uuid;

/// Sending half of one viewer's outbound queue
#[derive(Debug, Clone)]
pub struct ViewerHandle {
    tx: mpsc::Sender<Frame>,
    pub ip: String,
    pub connected_at: DateTime<Utc>,
}

impl ViewerHandle {
    /// Queue a frame without waiting
    pub fn try_send(&self, frame: Frame) -> Result<(), ViewerError> {
        self.tx.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => ViewerError::Backlogged,
            TrySendError::Closed(_) => ViewerError::Closed,
        })
    }

    pub fn send_event(&self, event: &OutgoingEvent) -> Result<(), ViewerError> {
        self.try_send(Frame::from(event.to_json()))
    }
}

/// Result of one broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub skipped: usize,
}

/// Fanout statistics
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct FanoutStats {
    pub broadcasts: u64,
    pub frames_delivered: u64,
    pub frames_skipped: u64,
}

/// Set of currently connected viewers
pub struct ViewerRegistry {
    viewers: DashMap<ViewerId, ViewerHandle>,
    queue_capacity: usize,
    broadcasts: AtomicU64,
    delivered: AtomicU64,
    skipped: AtomicU64,
}

impl ViewerRegistry {
    /// Create a registry whose viewers buffer up to `queue_capacity` frames.
    ///
    /// The capacity is raised to at least two so the connect snapshot
    /// always fits.
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            viewers: DashMap::new(),
            queue_capacity: queue_capacity.max(2),
            broadcasts: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
        }
    }

    /// Create a queue for a new viewer without registering it
    pub fn open(&self, ip: impl Into<String>) -> (ViewerHandle, mpsc::Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let handle = ViewerHandle {
            tx,
            ip: ip.into(),
            connected_at: Utc::now(),
        };
        (handle, rx)
    }

    /// Start including a viewer in broadcasts
    pub fn register(&self, handle: ViewerHandle) -> ViewerId {
        let id = Uuid::new_v4();
        self.viewers.insert(id, handle);
        id
    }

    pub fn remove(&self, id: &ViewerId) -> Option<ViewerHandle> {
        self.viewers.remove(id).map(|(_, handle)| handle)
    }

    pub fn len(&self) -> usize {
        self.viewers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.viewers.is_empty()
    }

    /// Deliver one event to every open viewer.
    ///
    /// Closed or backlogged viewers are skipped; nothing is retried or
    /// kept for later.
    pub fn broadcast(&self, event: &OutgoingEvent) -> BroadcastReport {
        let frame = Frame::from(event.to_json());
        let mut report = BroadcastReport::default();

        for entry in self.viewers.iter() {
            match entry.value().try_send(frame.clone()) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::trace!("Skipping viewer {} ({}): {}", entry.key(), entry.value().ip, e);
                    report.skipped += 1;
                }
            }
        }

        self.broadcasts.fetch_add(1, Ordering::Relaxed);
        self.delivered.fetch_add(report.delivered as u64, Ordering::Relaxed);
        self.skipped.fetch_add(report.skipped as u64, Ordering::Relaxed);

        report
    }

    pub fn stats(&self) -> FanoutStats {
        FanoutStats {
            broadcasts: self.broadcasts.load(Ordering::Relaxed),
            frames_delivered: self.delivered.load(Ordering::Relaxed),
            frames_skipped: self.skipped.load(Ordering::Relaxed),
        }
    }
}

impl Default for ViewerRegistry {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_VIEWER_QUEUE)
    }
}
