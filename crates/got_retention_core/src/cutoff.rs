use chrono::{DateTime, Duration, Utc};

/// The store compares `createdAt` values as strings, so the cutoff must use
/// the exact shape the upstream writer stores: fixed-width UTC with
/// millisecond precision and a trailing `Z`. Any width drift breaks the
/// lexicographic age filter.
const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Age threshold for expiry. Hours are unsigned, so the window can never be
/// negative; zero is legal and expires everything created before the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionWindow {
    hours: u64,
}

impl RetentionWindow {
    pub fn from_hours(hours: u64) -> Self {
        Self { hours }
    }

    pub fn hours(&self) -> u64 {
        self.hours
    }

    fn duration(&self) -> Duration {
        Duration::hours(self.hours as i64)
    }
}

/// Records with `createdAt` strictly below the returned string are expired.
pub fn cutoff_timestamp(event_time: DateTime<Utc>, window: RetentionWindow) -> String {
    format_created_at(event_time - window.duration())
}

pub fn format_created_at(instant: DateTime<Utc>) -> String {
    instant.format(CREATED_AT_FORMAT).to_string()
}
