//! Show state held between datagrams
//!
//! Transport mode and timecode are independent axes, but they live in one
//! struct so a single lock guards both and readers never see one updated
//! without the other.

use serde::Serialize;

use crate::protocol::{OutgoingEvent, TransportState};
use crate::timecode::Timecode;

/// Last known transport mode and playhead time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ShowState {
    pub transport: TransportState,
    pub timecode: Timecode,
}

impl ShowState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a transport mode.
    ///
    /// Repeating the current mode is still a transition: callers emit a
    /// fresh state event either way.
    pub fn set_transport(&mut self, transport: TransportState) {
        self.transport = transport;
    }

    pub fn set_timecode(&mut self, timecode: Timecode) {
        self.timecode = timecode;
    }

    pub fn reset_timecode(&mut self) {
        self.timecode = Timecode::ZERO;
    }

    /// Messages that bring a newly connected viewer up to date, in send order
    pub fn snapshot_events(&self) -> [OutgoingEvent; 2] {
        [
            OutgoingEvent::State(self.transport),
            OutgoingEvent::Time(self.timecode),
        ]
    }
}
