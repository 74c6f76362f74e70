//! Daily maintenance time windows
//!
//! A window is a pair of wall-clock times (UTC) and may span midnight.
//! On the wire both ends use the `HHMMSS±ZZZZ` format, e.g. `220000+0100`.

use chrono::{DateTime, Timelike};
use std::fmt;

use crate::error::{CoreError, Result};

const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

/// Time reserved at the end of every window so started operations can finish.
pub const END_BUFFER_SECONDS: u32 = 15 * 60;

/// A time of day with second precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MaintenanceTime {
    hour: u32,
    minute: u32,
    second: u32,
}

impl MaintenanceTime {
    /// Create a new time of day; components wrap the way a clock does.
    pub fn new(hour: u32, minute: u32, second: u32) -> Self {
        let total = u64::from(hour) * 3600 + u64::from(minute) * 60 + u64::from(second);
        Self::from_seconds((total % u64::from(SECONDS_PER_DAY)) as u32)
    }

    fn from_seconds(seconds: u32) -> Self {
        let seconds = seconds % SECONDS_PER_DAY;
        Self {
            hour: seconds / 3600,
            minute: (seconds % 3600) / 60,
            second: seconds % 60,
        }
    }

    /// Parse `HHMMSS±ZZZZ` and normalise to UTC
    pub fn parse(value: &str) -> Result<Self> {
        let invalid = |reason: String| CoreError::InvalidMaintenanceTime {
            value: value.to_string(),
            reason,
        };

        if value.len() != 11 {
            return Err(invalid("expected format HHMMSS+ZZZZ".to_string()));
        }

        // Anchor on an arbitrary date so the offset can be applied
        let parsed = DateTime::parse_from_str(&format!("20000101{value}"), "%Y%m%d%H%M%S%z")
            .map_err(|e| invalid(e.to_string()))?;
        let utc = parsed.naive_utc();

        Ok(Self::new(utc.hour(), utc.minute(), utc.second()))
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    pub fn second(&self) -> u32 {
        self.second
    }

    fn seconds(&self) -> u32 {
        self.hour * 3600 + self.minute * 60 + self.second
    }

    /// Move the time by a signed number of seconds, wrapping at midnight
    pub fn add_seconds(&self, delta: i64) -> Self {
        let day = i64::from(SECONDS_PER_DAY);
        let shifted = (i64::from(self.seconds()) + delta).rem_euclid(day);
        Self::from_seconds(shifted as u32)
    }
}

impl fmt::Display for MaintenanceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}{:02}{:02}+0000", self.hour, self.minute, self.second)
    }
}

/// A daily interval `[begin, end]`, possibly spanning midnight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaintenanceTimeWindow {
    begin: MaintenanceTime,
    end: MaintenanceTime,
}

impl MaintenanceTimeWindow {
    /// Window that matches every instant of the day
    pub const ALWAYS: Self = Self {
        begin: MaintenanceTime {
            hour: 0,
            minute: 0,
            second: 0,
        },
        end: MaintenanceTime {
            hour: 23,
            minute: 59,
            second: 59,
        },
    };

    pub fn new(begin: MaintenanceTime, end: MaintenanceTime) -> Self {
        Self { begin, end }
    }

    /// Parse begin and end; the window is invalid if either fails or both are equal
    pub fn parse(begin: &str, end: &str) -> Result<Self> {
        let begin_time = MaintenanceTime::parse(begin)?;
        let end_time = MaintenanceTime::parse(end)?;

        if begin_time == end_time {
            return Err(CoreError::InvalidMaintenanceTime {
                value: format!("{begin}-{end}"),
                reason: "begin and end must differ".to_string(),
            });
        }

        Ok(Self::new(begin_time, end_time))
    }

    pub fn begin(&self) -> MaintenanceTime {
        self.begin
    }

    pub fn end(&self) -> MaintenanceTime {
        self.end
    }

    /// Whether the window crosses midnight
    pub fn spans_different_days(&self) -> bool {
        self.end < self.begin
    }

    /// Length of the window in seconds
    pub fn width_seconds(&self) -> u32 {
        (self.end.seconds() + SECONDS_PER_DAY - self.begin.seconds()) % SECONDS_PER_DAY
    }

    /// Check whether a time of day falls into the window (bounds inclusive)
    pub fn contains(&self, time: MaintenanceTime) -> bool {
        if self.spans_different_days() {
            time >= self.begin || time <= self.end
        } else {
            time >= self.begin && time <= self.end
        }
    }

    /// Check whether an instant falls into the window
    pub fn contains_instant<Tz: chrono::TimeZone>(&self, instant: &DateTime<Tz>) -> bool {
        let utc = instant.naive_utc();
        self.contains(MaintenanceTime::new(utc.hour(), utc.minute(), utc.second()))
    }

    /// The window shortened by [`END_BUFFER_SECONDS`] at its end.
    ///
    /// Windows not wider than the buffer collapse to zero width at `begin`
    /// rather than inverting.
    pub fn effective(&self) -> Self {
        if self.width_seconds() <= END_BUFFER_SECONDS {
            return Self::new(self.begin, self.begin);
        }
        Self::new(self.begin, self.end.add_seconds(-i64::from(END_BUFFER_SECONDS)))
    }
}

impl fmt::Display for MaintenanceTimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.begin, self.end)
    }
}
