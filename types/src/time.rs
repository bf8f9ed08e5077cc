//! Timestamp type and the clock seam.
//!
//! Timestamps are Unix epoch seconds (UTC). Every duration in the system
//! (cooldowns, voting periods, timelocks, day buckets) is measured in these
//! seconds and nothing else.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds in one calendar day.
pub const SECS_PER_DAY: u64 = 86_400;

/// A Unix timestamp in seconds since epoch (UTC).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    /// Current system time. A clock set before the epoch reads as the epoch.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Seconds elapsed since this timestamp (relative to `now`).
    pub fn elapsed_since(&self, now: Timestamp) -> u64 {
        now.0.saturating_sub(self.0)
    }

    /// Whether this timestamp + duration has passed relative to `now`.
    pub fn has_expired(&self, duration_secs: u64, now: Timestamp) -> bool {
        now.0 >= self.0.saturating_add(duration_secs)
    }

    /// This timestamp shifted forward, saturating at `u64::MAX`.
    pub fn plus_secs(&self, secs: u64) -> Timestamp {
        Self(self.0.saturating_add(secs))
    }

    /// The calendar day containing this timestamp.
    ///
    /// Unsigned division floors, so every second of `[k * 86400, (k+1) * 86400)`
    /// lands in day `k` and day boundaries fall on UTC midnight.
    pub fn day(&self) -> DayIndex {
        DayIndex(self.0 / SECS_PER_DAY)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// A UTC calendar day, counted from the epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DayIndex(u64);

impl DayIndex {
    pub fn new(day: u64) -> Self {
        Self(day)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// First second of this day.
    pub fn start(&self) -> Timestamp {
        Timestamp(self.0.saturating_mul(SECS_PER_DAY))
    }

    /// First second of the following day.
    pub fn next_start(&self) -> Timestamp {
        Timestamp(self.0.saturating_add(1).saturating_mul(SECS_PER_DAY))
    }
}

impl fmt::Display for DayIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "day {}", self.0)
    }
}

/// The single wall-clock source supplied by the hosting environment.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Production clock backed by the system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}
