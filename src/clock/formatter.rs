//! Local date/time formatter backed by `chrono`.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, TimeZone};
use tracing::warn;

use crate::core::ClockFormatter;

/// Default pattern for the date line.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Default pattern for the time line.
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S";

/// Formats the local wall clock with two `strftime` patterns.
#[derive(Debug, Clone)]
pub struct LocalClock {
    date_format: String,
    time_format: String,
}

impl Default for LocalClock {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_FORMAT, DEFAULT_TIME_FORMAT)
    }
}

impl LocalClock {
    /// Create a formatter with the given date and time patterns.
    ///
    /// Invalid patterns are accepted (and logged); they render as empty text.
    pub fn new(date_format: impl Into<String>, time_format: impl Into<String>) -> Self {
        let date_format = date_format.into();
        let time_format = time_format.into();
        for pattern in [&date_format, &time_format] {
            if !is_valid_pattern(pattern) {
                warn!(%pattern, "invalid date/time pattern, the line will be empty");
            }
        }
        Self {
            date_format,
            time_format,
        }
    }

    /// Render `at` with the configured patterns.
    pub fn format_at<Tz>(&self, at: &DateTime<Tz>) -> (String, String)
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        (render(at, &self.date_format), render(at, &self.time_format))
    }
}

impl ClockFormatter for LocalClock {
    fn now(&self) -> (String, String) {
        self.format_at(&Local::now())
    }
}

fn is_valid_pattern(pattern: &str) -> bool {
    !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

// `to_string()` would panic on a format error.
fn render<Tz>(at: &DateTime<Tz>, pattern: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();
    if write!(out, "{}", at.format(pattern)).is_err() {
        out.clear();
    }
    out
}
