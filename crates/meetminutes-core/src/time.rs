//! Day windows for conference-record queries.
//!
//! Conference records are located by constraining the service-side query to
//! one calendar day: `[start of date, start of date + 1 day)` in UTC.

use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};

/// A 24-hour UTC window anchored at midnight of a calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    /// Midnight UTC at the start of the day.
    pub start: DateTime<Utc>,
    /// Midnight UTC of the following day (exclusive).
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// Creates the window covering the given calendar day.
    pub fn for_date(date: NaiveDate) -> Self {
        let start = date.and_hms_opt(0, 0, 0).expect("midnight is valid").and_utc();
        Self {
            start,
            end: start + Duration::days(1),
        }
    }

    /// The window start as an RFC 3339 timestamp with millisecond precision.
    pub fn start_rfc3339(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// The window end as an RFC 3339 timestamp with millisecond precision.
    pub fn end_rfc3339(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}
