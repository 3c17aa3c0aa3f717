//! Clock times and the elapsed time between an arrival and a departure.

use crate::libs::error::{WorkflowError, WorkflowResult};
use crate::libs::formatter::format_duration;
use chrono::{Duration, Local, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Time of day with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// Parses `HH:MM` or `HH:MM:SS`; seconds are dropped.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        ["%H:%M", "%H:%M:%S", "%H:%M:%S%.f"]
            .iter()
            .find_map(|format| NaiveTime::parse_from_str(raw, format).ok())
            .and_then(|time| Self::new(time.hour(), time.minute()))
    }

    /// Current local wall-clock time.
    pub fn now() -> Self {
        let time = Local::now().time();
        Self::new(time.hour(), time.minute()).unwrap_or(Self(NaiveTime::MIN))
    }

    pub fn minutes(&self) -> i64 {
        i64::from(self.0.hour() * 60 + self.0.minute())
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0.hour(), self.0.minute())
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid time: '{}'", raw)))
    }
}

/// Minutes from `arrival` to `departure` on the same day.
///
/// A departure before the arrival is rejected: records never span midnight.
pub fn elapsed(arrival: ClockTime, departure: ClockTime) -> WorkflowResult<Duration> {
    let minutes = departure.minutes() - arrival.minutes();
    if minutes < 0 {
        return Err(WorkflowError::InvalidDeparture {
            arrival: arrival.to_string(),
            departure: departure.to_string(),
        });
    }
    Ok(Duration::minutes(minutes))
}

/// Stored `duree` value, `HH:MM`.
pub fn compute_duration(arrival: ClockTime, departure: ClockTime) -> WorkflowResult<String> {
    elapsed(arrival, departure).map(|d| format_duration(&d))
}
