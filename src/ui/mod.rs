//! Web UI module: static viewer assets, the viewer WebSocket, and the status API

pub mod handlers;
pub mod server;
pub mod websocket;

pub use server::{AppState, WebServer};
