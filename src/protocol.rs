//! Wire-level message types
//!
//! Inbound OSC arguments are reduced to [`OscArg`] at the ingestion
//! boundary. Outbound viewer messages are always one of the two
//! [`OutgoingEvent`] shapes:
//!
//! ```text
//! {"type":"time",  "value":"HH:MM:SS"}
//! {"type":"state", "value":"stop" | "play" | "pause"}
//! ```

use rosc::OscType;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::timecode::Timecode;

/// A single OSC argument value, with its type tag discarded
#[derive(Debug, Clone, PartialEq)]
pub enum OscArg {
    Number(f64),
    Text(String),
    Boolean(bool),
    /// Blob, nil, infinitum, time tag, color, MIDI or array. Holds its
    /// position in the list but is never a number or a string.
    Other,
}

impl OscArg {
    /// Convert a decoded OSC argument
    pub fn from_osc(arg: &OscType) -> Self {
        match arg {
            OscType::Int(v) => Self::Number(f64::from(*v)),
            OscType::Long(v) => Self::Number(*v as f64),
            OscType::Float(v) => Self::Number(f64::from(*v)),
            OscType::Double(v) => Self::Number(*v),
            OscType::String(s) => Self::Text(s.clone()),
            OscType::Char(c) => Self::Text(c.to_string()),
            OscType::Bool(b) => Self::Boolean(*b),
            _ => Self::Other,
        }
    }

    /// Convert every argument of a message, one entry per position
    pub fn collect(args: &[OscType]) -> Vec<Self> {
        args.iter().map(Self::from_osc).collect()
    }
}

impl From<f64> for OscArg {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i32> for OscArg {
    fn from(v: i32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<bool> for OscArg {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<&str> for OscArg {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

/// Playback mode of the show timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TransportState {
    #[default]
    #[serde(rename = "stop")]
    Stopped,
    #[serde(rename = "play")]
    Playing,
    #[serde(rename = "pause")]
    Paused,
}

impl TransportState {
    /// Wire name sent to viewers
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stopped => "stop",
            Self::Playing => "play",
            Self::Paused => "pause",
        }
    }
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message pushed to viewers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum OutgoingEvent {
    Time(Timecode),
    State(TransportState),
}

impl OutgoingEvent {
    /// Serialize to the JSON text frame sent over the push channel
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
