//! Structured fs_usage records
//!
//! A `LogEntry` is built once per accepted trace line and never mutated.
//! Timestamps carry no date: every entry is assumed to fall on the same
//! calendar day, so traces spanning midnight order incorrectly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const MILLIS_PER_SECOND: u32 = 1_000;
const MILLIS_PER_MINUTE: u32 = 60 * MILLIS_PER_SECOND;
const MILLIS_PER_HOUR: u32 = 60 * MILLIS_PER_MINUTE;

/// Process token used when a line has no trailing duration/process pair
pub const UNKNOWN_PROCESS: &str = "unknown";

/// Wall-clock time of day with millisecond resolution
///
/// Serialized as `HH:MM:SS.mmm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct TimeOfDay {
    millis: u32,
}

impl TimeOfDay {
    /// Build from clock fields, returning `None` when any field is out of range
    pub fn from_hms_milli(hour: u32, minute: u32, second: u32, milli: u32) -> Option<Self> {
        if hour > 23 || minute > 59 || second > 59 || milli > 999 {
            return None;
        }
        Some(Self {
            millis: hour * MILLIS_PER_HOUR
                + minute * MILLIS_PER_MINUTE
                + second * MILLIS_PER_SECOND
                + milli,
        })
    }

    /// Build from milliseconds since midnight
    pub fn from_millis(millis: u32) -> Option<Self> {
        (millis < 24 * MILLIS_PER_HOUR).then_some(Self { millis })
    }

    pub fn hour(&self) -> u32 {
        self.millis / MILLIS_PER_HOUR
    }

    pub fn minute(&self) -> u32 {
        (self.millis % MILLIS_PER_HOUR) / MILLIS_PER_MINUTE
    }

    pub fn second(&self) -> u32 {
        (self.millis % MILLIS_PER_MINUTE) / MILLIS_PER_SECOND
    }

    pub fn millisecond(&self) -> u32 {
        self.millis % MILLIS_PER_SECOND
    }

    /// Milliseconds since midnight
    pub fn as_millis(&self) -> u32 {
        self.millis
    }

    /// Seconds since midnight
    pub fn as_secs_f64(&self) -> f64 {
        f64::from(self.millis) / 1000.0
    }

    /// Signed difference `self - earlier` in seconds
    pub fn seconds_since(&self, earlier: TimeOfDay) -> f64 {
        (i64::from(self.millis) - i64::from(earlier.millis)) as f64 / 1000.0
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}.{:03}",
            self.hour(),
            self.minute(),
            self.second(),
            self.millisecond()
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid time of day: {0:?} (expected HH:MM:SS.fff)")]
pub struct InvalidTimeOfDay(pub String);

impl FromStr for TimeOfDay {
    type Err = InvalidTimeOfDay;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parser::parse_timestamp(s).ok_or_else(|| InvalidTimeOfDay(s.to_string()))
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = InvalidTimeOfDay;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> String {
        t.to_string()
    }
}

/// One structured record derived from a single trace line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: TimeOfDay,
    /// Syscall or operation token (e.g. "open", "stat64")
    pub operation: String,
    /// Descriptor number as written in the trace; scoped to `process`
    pub file_descriptor: Option<String>,
    /// Raw byte-count token, decimal or `0x` hex
    pub bytes: Option<String>,
    /// Raw `0x` hex device token
    pub device: Option<String>,
    pub path: Option<String>,
    /// Operation latency in seconds
    pub duration: f64,
    pub process: String,
}

impl LogEntry {
    /// Process name with any trailing `.<pid>` suffix removed
    pub fn process_name(&self) -> &str {
        match split_pid(&self.process) {
            Some((name, _)) => name,
            None => &self.process,
        }
    }

    /// Numeric PID appended to the process token, if any
    pub fn pid(&self) -> Option<u32> {
        split_pid(&self.process).map(|(_, pid)| pid)
    }
}

fn split_pid(process: &str) -> Option<(&str, u32)> {
    let (name, pid) = process.rsplit_once('.')?;
    if name.is_empty() || pid.is_empty() || !pid.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    pid.parse().ok().map(|pid| (name, pid))
}
