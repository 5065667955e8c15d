//! Network subsystem for OSC intake over UDP

pub mod osc;
pub mod udp;

pub use osc::{OscListener, OscStats, OscStatsSnapshot};
pub use udp::{create_socket, local_ipv4_addresses};
