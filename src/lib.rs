//! # OSC Timecode Relay
//!
//! Bridges OSC transport and timecode messages (REAPER, Max/MSP, show
//! controllers) to any number of browser viewers over WebSocket, so every
//! screen shows the same playhead time and play/pause/stop state.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────┐
//! │   OSC sender (DAW, Max, …)   │
//! └──────────────┬───────────────┘
//!                │ UDP datagrams
//!                ▼
//! ┌──────────────────────────────┐
//! │ OSC Listener (network::osc)  │  one task, one datagram at a time
//! └──────────────┬───────────────┘
//!                │ address + OscArg list
//!                ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Relay (relay)                         │
//! │  ┌─────────────────────┐      ┌──────────────────────────┐  │
//! │  │ Command Router      │─────▶│ Timecode Normalizer      │  │
//! │  │ (transport::router) │      │ (timecode)               │  │
//! │  └──────────┬──────────┘      └──────────────────────────┘  │
//! │             ▼                                               │
//! │  ┌─────────────────────┐   Mutex<ShowState>: transport mode │
//! │  │ ShowState           │   and timecode change together     │
//! │  └──────────┬──────────┘                                    │
//! │             ▼                                               │
//! │  ┌─────────────────────┐                                    │
//! │  │ Broadcast Fanout    │  serialize once, try_send to each  │
//! │  │ (fanout)            │  viewer queue, skip closed/full    │
//! │  └──────────┬──────────┘                                    │
//! └─────────────┼───────────────────────────────────────────────┘
//!               ▼
//! ┌──────────────────────────────┐
//! │ WebSocket sessions (ui)      │  snapshot on connect, then pushes
//! └──────────────┬───────────────┘
//!                ▼
//!      Viewer 0   Viewer 1   …   Viewer N
//! ```

pub mod config;
pub mod error;
pub mod fanout;
pub mod network;
pub mod protocol;
pub mod relay;
pub mod timecode;
pub mod transport;
pub mod ui;

pub use error::{Error, Result};
pub use protocol::{OscArg, OutgoingEvent, TransportState};
pub use relay::Relay;
pub use timecode::{normalize, Timecode};

/// Application-wide constants
pub mod constants {
    /// Default UDP port for OSC intake
    pub const DEFAULT_OSC_PORT: u16 = 9000;

    /// Default HTTP port for viewers
    pub const DEFAULT_HTTP_PORT: u16 = 3000;

    /// Default per-viewer outbound queue length, in frames
    pub const DEFAULT_VIEWER_QUEUE: usize = 64;

    /// Largest datagram accepted from OSC senders
    pub const MAX_DATAGRAM_SIZE: usize = rosc::decoder::MTU;
}
