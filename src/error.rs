//! Error types for the timecode relay

use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Network errors
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Socket bind failed: {0}")]
    BindFailed(String),

    #[error("Receive failed: {0}")]
    ReceiveFailed(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

/// Inbound OSC errors
///
/// Unknown addresses and unusable arguments are not errors; the router
/// reports those as ignored.
#[derive(Error, Debug)]
pub enum OscError {
    #[error("Undecodable datagram: {0}")]
    Decode(String),
}

/// Delivery failures for a single viewer
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerError {
    #[error("Viewer channel closed")]
    Closed,

    #[error("Viewer queue full")]
    Backlogged,
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, Error>;
