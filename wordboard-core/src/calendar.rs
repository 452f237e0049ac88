use chrono::{DateTime, Utc};

/// Unix seconds of the first puzzle day: 2021-06-19 07:00:00 UTC.
const EPOCH_UNIX_SECS: i64 = 1_624_086_000;

pub struct PuzzleCalendar;

impl PuzzleCalendar {
    /// Maps an instant to its puzzle-day index: whole elapsed hours since
    /// the epoch, divided by 24, truncated toward zero. Computed in UTC
    /// only, so a guess and a board fetch in the same real-world day always
    /// agree regardless of the server's local time or DST.
    pub fn day_index(instant: DateTime<Utc>) -> i32 {
        let elapsed_hours = (instant.timestamp() - EPOCH_UNIX_SECS) / 3600;
        (elapsed_hours / 24) as i32
    }
}
