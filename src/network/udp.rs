//! UDP socket setup

use socket2::{Domain, Protocol, Socket, Type};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::error::NetworkError;

/// Bind a non-blocking UDP socket registered with the tokio runtime.
///
/// Address reuse is enabled so a restarted relay can rebind immediately.
/// Must be called from within a runtime.
pub fn create_socket(
    addr: SocketAddr,
    recv_buffer_size: usize,
) -> Result<tokio::net::UdpSocket, NetworkError> {
    let domain = if addr.is_ipv4() { Domain::IPV4 } else { Domain::IPV6 };
    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))
        .map_err(|e| NetworkError::BindFailed(e.to_string()))?;

    socket
        .set_reuse_address(true)
        .map_err(|e| NetworkError::BindFailed(e.to_string()))?;

    if recv_buffer_size > 0 {
        if let Err(e) = socket.set_recv_buffer_size(recv_buffer_size) {
            tracing::warn!("Could not set UDP receive buffer to {}: {}", recv_buffer_size, e);
        }
    }

    socket
        .set_nonblocking(true)
        .map_err(|e| NetworkError::BindFailed(e.to_string()))?;
    socket
        .bind(&addr.into())
        .map_err(|e| NetworkError::BindFailed(format!("{}: {}", addr, e)))?;

    tokio::net::UdpSocket::from_std(socket.into())
        .map_err(|e| NetworkError::BindFailed(e.to_string()))
}

/// Local IPv4 addresses viewers can reach, for operator logging.
///
/// One entry per non-loopback interface address. Falls back to loopback
/// when none are up or the interfaces cannot be listed.
pub fn local_ipv4_addresses() -> Vec<Ipv4Addr> {
    match if_addrs::get_if_addrs() {
        Ok(interfaces) => usable_ipv4(interfaces.iter().map(|iface| iface.ip())),
        Err(e) => {
            tracing::debug!("Could not list network interfaces: {}", e);
            vec![Ipv4Addr::LOCALHOST]
        }
    }
}

fn usable_ipv4(ips: impl IntoIterator<Item = IpAddr>) -> Vec<Ipv4Addr> {
    let mut found = Vec::new();
    for ip in ips {
        if let IpAddr::V4(ip) = ip {
            if !ip.is_loopback() && !ip.is_unspecified() && !found.contains(&ip) {
                found.push(ip);
            }
        }
    }

    if found.is_empty() {
        found.push(Ipv4Addr::LOCALHOST);
    }
    found
}
