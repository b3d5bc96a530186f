use chrono::{Datelike, NaiveDate};

use super::types::TimeRange;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Start time suggested when the grid has no rows yet (09:00)
pub const DEFAULT_START_MINUTES: u32 = 9 * 60;

pub const DEFAULT_DURATION_MINUTES: u32 = 15;

/// Interview lengths offered by the settings screen
pub const DURATION_OPTIONS: [u32; 8] = [1, 5, 10, 15, 20, 30, 45, 60];

const WEEKDAYS: [&str; 7] = ["日", "月", "火", "水", "木", "金", "土"];

/// Parses a time string (HH:MM) to minutes since midnight
pub fn parse_time_to_minutes(time_str: &str) -> Option<u32> {
    let parts: Vec<&str> = time_str.trim().split(':').collect();
    if parts.len() != 2 {
        return None;
    }
    let hours: u32 = parts[0].parse().ok()?;
    let minutes: u32 = parts[1].parse().ok()?;
    if hours >= 24 || minutes >= 60 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Formats minutes since midnight to time string (HH:MM)
pub fn minutes_to_time_string(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    format!("{:02}:{:02}", hours % 24, mins)
}

/// Builds the row header for an interview starting at `start_time` lasting `duration` minutes.
pub fn calculate_time_range(start_time: &str, duration: u32) -> Option<TimeRange> {
    let start = parse_time_to_minutes(start_time)?;
    Some(TimeRange::from_start(start, duration))
}

/// Suggests where the next row should start: the end of the last row, or 09:00.
///
/// Expects `rows` sorted by start time.
pub fn next_start_time(rows: &[TimeRange]) -> u32 {
    rows.last().map(|r| r.end()).unwrap_or(DEFAULT_START_MINUTES)
}

/// Start times offered for a new row, 09:00 through 17:00.
///
/// Minutes step by `duration` within each hour and restart at :00 on the next hour.
pub fn time_options(duration: u32) -> Vec<String> {
    let step = duration.max(1) as usize;
    let mut times = Vec::new();
    for hour in 9..=17u32 {
        for minute in (0..60u32).step_by(step) {
            if hour == 17 && minute > 0 {
                continue;
            }
            times.push(minutes_to_time_string(hour * 60 + minute));
        }
    }
    times
}

/// Short weekday name used in column headers
pub fn weekday_label(date: NaiveDate) -> &'static str {
    WEEKDAYS[date.weekday().num_days_from_sunday() as usize]
}

/// Formats a calendar date as a column header, e.g. `12/01 (月)`
pub fn format_date_label(date: NaiveDate) -> String {
    format!("{:02}/{:02} ({})", date.month(), date.day(), weekday_label(date))
}
