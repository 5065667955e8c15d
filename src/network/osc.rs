//! OSC datagram intake
//!
//! A single task owns the socket and hands each decoded packet to the
//! relay before reading the next, so datagrams never overlap.

use rosc::OscPacket;
use serde::Serialize;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::UdpSocket;

use crate::config::OscConfig;
use crate::constants::MAX_DATAGRAM_SIZE;
use crate::error::{NetworkError, OscError, Result};
use crate::network::udp::create_socket;
use crate::relay::Relay;

/// Decode one datagram
pub fn decode(datagram: &[u8]) -> std::result::Result<OscPacket, OscError> {
    rosc::decoder::decode_udp(datagram)
        .map(|(_, packet)| packet)
        .map_err(|e| OscError::Decode(format!("{:?}", e)))
}

/// Intake counters
#[derive(Debug, Default)]
pub struct OscStats {
    packets_received: AtomicU64,
    bytes_received: AtomicU64,
    invalid_packets: AtomicU64,
    messages_applied: AtomicU64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OscStatsSnapshot {
    pub packets_received: u64,
    pub bytes_received: u64,
    pub invalid_packets: u64,
    pub messages_applied: u64,
}

impl OscStats {
    pub fn snapshot(&self) -> OscStatsSnapshot {
        OscStatsSnapshot {
            packets_received: self.packets_received.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            invalid_packets: self.invalid_packets.load(Ordering::Relaxed),
            messages_applied: self.messages_applied.load(Ordering::Relaxed),
        }
    }
}

/// Receives OSC over UDP and feeds the relay
pub struct OscListener {
    socket: UdpSocket,
    local_addr: SocketAddr,
    stats: Arc<OscStats>,
}

impl OscListener {
    pub fn bind(config: &OscConfig) -> Result<Self> {
        Self::bind_addr(config.socket_addr()?, config.recv_buffer_size)
    }

    pub fn bind_addr(addr: SocketAddr, recv_buffer_size: usize) -> Result<Self> {
        let socket = create_socket(addr, recv_buffer_size)?;
        let local_addr = socket.local_addr()?;

        Ok(Self {
            socket,
            local_addr,
            stats: Arc::new(OscStats::default()),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn stats(&self) -> Arc<OscStats> {
        self.stats.clone()
    }

    /// Process one datagram synchronously
    pub fn handle_datagram(&self, relay: &Relay, datagram: &[u8], from: SocketAddr) {
        self.stats.packets_received.fetch_add(1, Ordering::Relaxed);
        self.stats
            .bytes_received
            .fetch_add(datagram.len() as u64, Ordering::Relaxed);

        match decode(datagram) {
            Ok(packet) => {
                let applied = relay.handle_packet(&packet);
                self.stats
                    .messages_applied
                    .fetch_add(applied as u64, Ordering::Relaxed);
            }
            Err(e) => {
                self.stats.invalid_packets.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Dropping datagram from {}: {}", from, e);
            }
        }
    }

    /// Receive until `shutdown` resolves
    pub async fn run<F>(self, relay: Arc<Relay>, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        tokio::pin!(shutdown);

        tracing::info!("OSC listening on {}", self.local_addr);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("OSC listener stopping");
                    return Ok(());
                }
                received = self.socket.recv_from(&mut buf) => match received {
                    Ok((len, from)) => self.handle_datagram(&relay, &buf[..len], from),
                    Err(e) => {
                        // ICMP port-unreachable surfaces here on some platforms
                        tracing::warn!("{}", NetworkError::ReceiveFailed(e.to_string()));
                    }
                },
            }
        }
    }
}
