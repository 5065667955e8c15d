//! The relay core
//!
//! [`Relay`] owns the one [`ShowState`] behind a single mutex, the command
//! router, and the viewer registry. Datagrams are applied one at a time;
//! the lock is held across routing and broadcast so events leave in the
//! order the state changed. Connecting viewers read the state under the
//! same lock, queue their snapshot, and only then join the registry, so a
//! viewer's snapshot always precedes any broadcast it receives.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rosc::OscPacket;
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::fanout::{Frame, ViewerId, ViewerRegistry};
use crate::protocol::OscArg;
use crate::transport::{CommandRouter, RouterAction, ShowState};

/// A registered viewer and the receiving end of its queue
pub struct ViewerSession {
    pub id: ViewerId,
    pub rx: mpsc::Receiver<Frame>,
}

/// Shared relay state, usually held in an `Arc`
pub struct Relay {
    state: Mutex<ShowState>,
    router: CommandRouter,
    viewers: ViewerRegistry,
    started_at: DateTime<Utc>,
}

impl Relay {
    pub fn new(router: CommandRouter, viewer_queue_capacity: usize) -> Self {
        Self {
            state: Mutex::new(ShowState::new()),
            router,
            viewers: ViewerRegistry::new(viewer_queue_capacity),
            started_at: Utc::now(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            CommandRouter::new(config.transport.reset_on_stop),
            config.viewer.queue_capacity,
        )
    }

    /// Route one OSC message and broadcast whatever it changed
    pub fn handle_message(&self, address: &str, args: &[OscArg]) -> RouterAction {
        let mut state = self.state.lock();
        let action = self.router.route(&mut state, address, args);

        if action.is_ignored() {
            tracing::trace!("Ignored OSC message {} ({} args)", address, args.len());
            return action;
        }

        tracing::debug!("OSC {} -> {:?}", address, action);
        for event in action.events() {
            self.viewers.broadcast(&event);
        }

        action
    }

    /// Route every message in a decoded packet, descending into bundles.
    ///
    /// Returns the number of messages that changed state.
    pub fn handle_packet(&self, packet: &OscPacket) -> usize {
        match packet {
            OscPacket::Message(msg) => {
                let args = OscArg::collect(&msg.args);
                usize::from(!self.handle_message(&msg.addr, &args).is_ignored())
            }
            OscPacket::Bundle(bundle) => bundle
                .content
                .iter()
                .map(|inner| self.handle_packet(inner))
                .sum(),
        }
    }

    /// Register a viewer, queueing the current state and time for it first
    pub fn connect_viewer(&self, ip: impl Into<String>) -> ViewerSession {
        let (handle, rx) = self.viewers.open(ip);

        let state = self.state.lock();
        for event in state.snapshot_events() {
            if let Err(e) = handle.send_event(&event) {
                tracing::debug!("Snapshot to {} not queued: {}", handle.ip, e);
            }
        }
        let id = self.viewers.register(handle);
        drop(state);

        ViewerSession { id, rx }
    }

    pub fn disconnect_viewer(&self, id: &ViewerId) {
        self.viewers.remove(id);
    }

    /// Copy of the current state and time
    pub fn snapshot(&self) -> ShowState {
        *self.state.lock()
    }

    pub fn viewers(&self) -> &ViewerRegistry {
        &self.viewers
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn uptime_seconds(&self) -> u64 {
        (Utc::now() - self.started_at).num_seconds().max(0) as u64
    }
}
