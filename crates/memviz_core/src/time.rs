//! Time types for MemViz.
//!
//! Wall-clock timestamps record when a replay was created, started, and
//! finished. They are metadata only: replay ordering comes from step
//! indices, never from the clock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wall clock timestamp (UTC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp {
    /// Seconds since the Unix epoch
    pub seconds: u64,
    /// Sub-second nanoseconds
    pub nanos: u32,
}

impl Timestamp {
    /// Maximum nanoseconds per second
    pub const NANOS_PER_SEC: u32 = 1_000_000_000;

    /// Create a new timestamp
    #[must_use]
    pub fn new(seconds: u64, nanos: u32) -> Self {
        Self { seconds, nanos }
    }

    /// Get current timestamp
    #[must_use]
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Convert from a chrono UTC datetime, clamping pre-epoch values to zero
    #[must_use]
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        let seconds = dt.timestamp();
        if seconds < 0 {
            return Self::new(0, 0);
        }
        Self {
            seconds: seconds as u64,
            nanos: dt.timestamp_subsec_nanos().min(Self::NANOS_PER_SEC - 1),
        }
    }

    /// Convert to a chrono UTC datetime
    #[must_use]
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(i64::try_from(self.seconds).ok()?, self.nanos)
    }

    /// Convert to milliseconds
    #[must_use]
    pub const fn as_millis(&self) -> u128 {
        self.seconds as u128 * 1_000 + self.nanos as u128 / 1_000_000
    }

    /// Get duration since another timestamp (zero if `earlier` is later)
    #[must_use]
    pub fn duration_since(&self, earlier: &Timestamp) -> Duration {
        if self < earlier {
            return Duration::zero();
        }

        let mut seconds = self.seconds - earlier.seconds;
        let mut nanos = self.nanos as i64 - earlier.nanos as i64;

        if nanos < 0 {
            seconds = seconds.saturating_sub(1);
            nanos += Self::NANOS_PER_SEC as i64;
        }

        Duration {
            seconds,
            nanos: nanos as u32,
        }
    }

    /// Add a duration
    #[must_use]
    pub fn add(&self, duration: &Duration) -> Self {
        let mut seconds = self.seconds.saturating_add(duration.seconds);
        let mut nanos = self.nanos + duration.nanos;

        if nanos >= Self::NANOS_PER_SEC {
            seconds = seconds.saturating_add(1);
            nanos -= Self::NANOS_PER_SEC;
        }

        Self { seconds, nanos }
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.to_rfc3339()),
            None => write!(f, "{}.{:09}", self.seconds, self.nanos),
        }
    }
}

/// A duration between timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Duration {
    /// Whole seconds
    pub seconds: u64,
    /// Sub-second nanoseconds
    pub nanos: u32,
}

impl Duration {
    /// Create a new duration
    #[must_use]
    pub const fn new(seconds: u64, nanos: u32) -> Self {
        Self { seconds, nanos }
    }

    /// Zero duration
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            seconds: 0,
            nanos: 0,
        }
    }

    /// Duration from seconds
    #[must_use]
    pub const fn from_secs(seconds: u64) -> Self {
        Self { seconds, nanos: 0 }
    }

    /// Duration from milliseconds
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self {
            seconds: millis / 1_000,
            nanos: ((millis % 1_000) * 1_000_000) as u32,
        }
    }

    /// Check for zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.seconds == 0 && self.nanos == 0
    }

    /// Get total seconds
    #[must_use]
    pub const fn as_secs(&self) -> u64 {
        self.seconds
    }

    /// Get total milliseconds
    #[must_use]
    pub fn as_millis(&self) -> u128 {
        self.seconds as u128 * 1_000 + self.nanos as u128 / 1_000_000
    }
}

impl Default for Duration {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<Duration> for std::time::Duration {
    fn from(d: Duration) -> Self {
        std::time::Duration::new(d.seconds, d.nanos)
    }
}

impl std::fmt::Display for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.seconds == 0 && self.nanos == 0 {
            write!(f, "0s")
        } else if self.seconds == 0 {
            write!(f, "{}ms", self.nanos / 1_000_000)
        } else if self.nanos == 0 {
            write!(f, "{}s", self.seconds)
        } else {
            write!(f, "{}.{:03}s", self.seconds, self.nanos / 1_000_000)
        }
    }
}
