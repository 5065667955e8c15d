//! Viewer WebSocket sessions
//!
//! Each connection registers with the relay, which queues the current
//! state and time before any broadcast. A writer task drains the queue
//! into the socket; inbound frames are read and discarded.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        ConnectInfo, State,
    },
    http::HeaderMap,
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::relay::ViewerSession;
use crate::ui::server::AppState;

/// Resolve the address to log for a viewer.
///
/// Behind a trusted proxy the first `X-Forwarded-For` entry wins. The
/// IPv4-mapped IPv6 prefix is stripped.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr, trust_proxy: bool) -> String {
    let forwarded = if trust_proxy {
        headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    } else {
        None
    };

    let ip = forwarded.unwrap_or_else(|| peer.ip().to_string());
    match ip.strip_prefix("::ffff:") {
        Some(v4) => v4.to_string(),
        None => ip,
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    let ip = client_ip(&headers, peer, state.trust_proxy);
    ws.on_upgrade(move |socket| handle_socket(socket, state, ip))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, ip: String) {
    let ViewerSession { id, mut rx } = state.relay.connect_viewer(ip.clone());
    tracing::info!("{} connected.", ip);

    let (mut sink, mut stream) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sink.send(Message::Text(frame.to_string())).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = stream.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.relay.disconnect_viewer(&id);
    tracing::info!("{} disconnected.", ip);
}
