//! Quiet hours window evaluation
//!
//! A window is `[start, end)` in local wall-clock time. When `start > end`
//! the window spans midnight; when `start == end` it is empty.

use chrono::NaiveTime;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("Invalid time of day '{0}', expected HH:MM")]
    InvalidTimeOfDay(String),
}

/// Parse `HH:MM` (also `H:MM` and `HH:MM:SS`) into a time of day
pub fn parse_hhmm(value: &str) -> Result<NaiveTime, PolicyError> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| PolicyError::InvalidTimeOfDay(value.to_string()))
}

/// A configured quiet window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuietHours {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl QuietHours {
    pub fn parse(start: &str, end: &str) -> Result<Self, PolicyError> {
        Ok(Self {
            start: parse_hhmm(start)?,
            end: parse_hhmm(end)?,
        })
    }

    /// Whether the window spans midnight
    pub fn wraps_midnight(&self) -> bool {
        self.start > self.end
    }

    /// Whether `now` falls inside the window
    pub fn contains(&self, now: NaiveTime) -> bool {
        if self.wraps_midnight() {
            now >= self.start || now < self.end
        } else {
            now >= self.start && now < self.end
        }
    }
}
