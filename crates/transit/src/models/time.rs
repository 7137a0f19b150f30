//! Service-day times as used by GTFS `stop_times.txt`.

use std::fmt;
use std::str::FromStr;

use chrono::TimeDelta;

/// Seconds since the start of the service day.
///
/// GTFS writes these as `HH:MM:SS` and allows hours past 23 for trips that
/// run after midnight, so this is not a wall-clock time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServiceTime(u32);

impl ServiceTime {
    pub const MIDNIGHT: ServiceTime = ServiceTime(0);

    pub const fn from_seconds(seconds: u32) -> Self {
        Self(seconds)
    }

    pub const fn from_hms(hours: u32, minutes: u32, seconds: u32) -> Self {
        Self(hours * 3600 + minutes * 60 + seconds)
    }

    pub fn seconds(&self) -> u32 {
        self.0
    }

    /// Subtract a duration, stopping at the start of the service day.
    pub fn saturating_sub(&self, delta: TimeDelta) -> Self {
        let delta = delta.num_seconds().clamp(0, u32::MAX as i64) as u32;
        Self(self.0.saturating_sub(delta))
    }

    /// Time elapsed from `earlier` to `self`, or `None` if `earlier` is later.
    pub fn since(&self, earlier: ServiceTime) -> Option<TimeDelta> {
        self.0
            .checked_sub(earlier.0)
            .map(|secs| TimeDelta::seconds(secs as i64))
    }
}

impl fmt::Display for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.0 / 3600;
        let minutes = (self.0 % 3600) / 60;
        let seconds = self.0 % 60;
        write!(f, "{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid service time {input:?}, expected HH:MM:SS")]
pub struct ParseServiceTimeError {
    pub input: String,
}

impl FromStr for ServiceTime {
    type Err = ParseServiceTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseServiceTimeError { input: s.to_string() };

        let mut parts = s.trim().split(':');
        let (Some(h), Some(m), Some(sec), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(err());
        };
        if h.is_empty() || m.len() != 2 || sec.len() != 2 {
            return Err(err());
        }

        let hours: u32 = h.parse().map_err(|_| err())?;
        let minutes: u32 = m.parse().map_err(|_| err())?;
        let seconds: u32 = sec.parse().map_err(|_| err())?;
        if minutes >= 60 || seconds >= 60 {
            return Err(err());
        }
        hours
            .checked_mul(3600)
            .and_then(|h| h.checked_add(minutes * 60 + seconds))
            .map(ServiceTime)
            .ok_or_else(err)
    }
}

/// Inclusive range of service times.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: ServiceTime,
    pub end: ServiceTime,
}

impl TimeWindow {
    /// The window `[reference - lookback, reference]`.
    pub fn looking_back(reference: ServiceTime, lookback: TimeDelta) -> Self {
        Self {
            start: reference.saturating_sub(lookback),
            end: reference,
        }
    }

    pub fn contains(&self, time: ServiceTime) -> bool {
        self.start <= time && time <= self.end
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}
