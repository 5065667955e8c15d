//! Timecode normalization
//!
//! OSC senders report the playhead in several shapes: a preformatted
//! `HH:MM:SS` string (optionally with a frame or fractional suffix), a
//! plain seconds count as a number or numeric string, or an
//! hours/minutes/seconds triplet. All of them reduce to a [`Timecode`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::protocol::OscArg;

/// Loose clock pattern accepted from senders; the suffix is discarded
static CLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+):(\d{2}):(\d{2})(?:[.:]\d+)?$").expect("valid clock regex"));

/// Canonical display form only
static CANONICAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{2,}):([0-5]\d):([0-5]\d)$").expect("valid canonical regex"));

/// Elapsed show time, displayed as `HH:MM:SS`
///
/// Hours are unbounded and padded to at least two digits. Values built
/// from a seconds count keep minutes and seconds in `00..=59`; a clock
/// string keeps the fields it was sent with, so `00:99:00` stays as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Timecode {
    hours: u64,
    minutes: u64,
    seconds: u64,
}

impl Timecode {
    pub const ZERO: Self = Self::from_hms(0, 0, 0);

    pub const fn from_seconds(total_seconds: u64) -> Self {
        Self {
            hours: total_seconds / 3600,
            minutes: (total_seconds % 3600) / 60,
            seconds: total_seconds % 60,
        }
    }

    /// Keep the fields exactly as given, without carrying
    pub const fn from_hms(hours: u64, minutes: u64, seconds: u64) -> Self {
        Self {
            hours,
            minutes,
            seconds,
        }
    }

    /// Convert a fractional seconds count.
    ///
    /// Negative values clamp to zero and the fraction is floored.
    /// Returns `None` for NaN or infinite input.
    pub fn from_secs_f64(seconds: f64) -> Option<Self> {
        if !seconds.is_finite() {
            return None;
        }
        let whole = seconds.max(0.0).floor();
        Some(Self::from_seconds(whole as u64))
    }

    pub fn total_seconds(&self) -> u64 {
        self.hours
            .saturating_mul(3600)
            .saturating_add(self.minutes * 60)
            .saturating_add(self.seconds)
    }

    pub fn hours(&self) -> u64 {
        self.hours
    }

    pub fn minutes(&self) -> u64 {
        self.minutes
    }

    pub fn seconds(&self) -> u64 {
        self.seconds
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours(), self.minutes(), self.seconds())
    }
}

/// Returned when a string is not a canonical `HH:MM:SS` timecode
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid timecode: {0:?}")]
pub struct ParseTimecodeError(String);

impl FromStr for Timecode {
    type Err = ParseTimecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseTimecodeError(s.to_string());
        let caps = CANONICAL_RE.captures(s).ok_or_else(err)?;
        parse_hms(&caps[1], &caps[2], &caps[3]).ok_or_else(err)
    }
}

impl Serialize for Timecode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timecode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

fn parse_hms(h: &str, m: &str, s: &str) -> Option<Timecode> {
    Some(Timecode::from_hms(h.parse().ok()?, m.parse().ok()?, s.parse().ok()?))
}

/// Reduce an OSC argument list to a timecode.
///
/// Shapes are tried in order and the first match wins:
///
/// 1. leading string matching `H:MM:SS` with an optional `.ff` / `:ff` suffix
/// 2. leading string holding a decimal number, read as seconds
/// 3. a single number, read as seconds
/// 4. three or more numbers, read as hours, minutes, seconds
///
/// Anything else yields `None` and the caller keeps its current value.
pub fn normalize(args: &[OscArg]) -> Option<Timecode> {
    match args {
        [OscArg::Text(text), ..] => parse_text(text),
        [OscArg::Number(secs)] => Timecode::from_secs_f64(*secs),
        [OscArg::Number(h), OscArg::Number(m), OscArg::Number(s), ..] => {
            Timecode::from_secs_f64(h * 3600.0 + m * 60.0 + s)
        }
        _ => None,
    }
}

fn parse_text(text: &str) -> Option<Timecode> {
    let text = text.trim();

    if let Some(caps) = CLOCK_RE.captures(text) {
        return parse_hms(&caps[1], &caps[2], &caps[3]);
    }

    text.parse::<f64>().ok().and_then(Timecode::from_secs_f64)
}
