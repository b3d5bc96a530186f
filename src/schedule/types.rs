use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::slot_utils::{
    format_date_label, minutes_to_time_string, parse_time_to_minutes, MINUTES_PER_DAY,
};
use crate::error::{Rejection, SeedError};

pub type ApplicantId = String;

/// Row header: an interview time range rendered as `HH:MM - HH:MM`.
///
/// Rows are identified by their start time alone; two ranges with the same
/// start are duplicates whatever their end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeRange {
    start: u32,
    end: u32,
}

impl TimeRange {
    pub fn from_start(start: u32, duration: u32) -> Self {
        let start = start % MINUTES_PER_DAY;
        TimeRange {
            start,
            end: (start + duration % MINUTES_PER_DAY) % MINUTES_PER_DAY,
        }
    }

    /// Minutes since midnight
    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn start_label(&self) -> String {
        minutes_to_time_string(self.start)
    }

    pub fn same_start(&self, other: &TimeRange) -> bool {
        self.start == other.start
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            minutes_to_time_string(self.start),
            minutes_to_time_string(self.end)
        )
    }
}

impl FromStr for TimeRange {
    type Err = Rejection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || Rejection::MalformedTime {
            input: s.to_string(),
        };
        let (start, end) = s.split_once(" - ").ok_or_else(malformed)?;
        let start = parse_time_to_minutes(start).ok_or_else(malformed)?;
        let end = parse_time_to_minutes(end).ok_or_else(malformed)?;
        Ok(TimeRange { start, end })
    }
}

impl TryFrom<String> for TimeRange {
    type Error = Rejection;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeRange> for String {
    fn from(range: TimeRange) -> Self {
        range.to_string()
    }
}

/// Column header: a date rendered as `MM/DD (weekday)`.
///
/// Columns sort by the `MM/DD` part and are unique by the full label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateLabel(String);

impl DateLabel {
    pub fn from_date(date: NaiveDate) -> Self {
        DateLabel(format_date_label(date))
    }

    /// The `MM/DD` part used for ordering
    pub fn sort_key(&self) -> &str {
        &self.0[..5]
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DateLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DateLabel {
    type Err = Rejection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        let malformed = || Rejection::MalformedDate {
            input: s.to_string(),
        };
        let bytes = label.as_bytes();
        if bytes.len() < 7
            || !bytes[..2].iter().all(u8::is_ascii_digit)
            || bytes[2] != b'/'
            || !bytes[3..5].iter().all(u8::is_ascii_digit)
            || bytes[5] != b' '
        {
            return Err(malformed());
        }
        let month: u32 = label[..2].parse().map_err(|_| malformed())?;
        let day: u32 = label[3..5].parse().map_err(|_| malformed())?;
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(malformed());
        }
        if label[6..].trim().is_empty() {
            return Err(malformed());
        }
        Ok(DateLabel(label.to_string()))
    }
}

impl TryFrom<String> for DateLabel {
    type Error = Rejection;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DateLabel> for String {
    fn from(label: DateLabel) -> Self {
        label.0
    }
}

/// Grid position of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotKey {
    pub row: usize,
    pub col: usize,
}

impl SlotKey {
    pub fn new(row: usize, col: usize) -> Self {
        SlotKey { row, col }
    }
}

/// Human-facing name of a slot, rendered as `<date> <time>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotLabel {
    pub date: DateLabel,
    pub time: TimeRange,
}

impl fmt::Display for SlotLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.time)
    }
}

impl FromStr for SlotLabel {
    type Err = Rejection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        // the time range is a fixed-width `HH:MM - HH:MM` suffix
        const TIME_WIDTH: usize = 13;
        if s.len() <= TIME_WIDTH + 1 || !s.is_char_boundary(s.len() - TIME_WIDTH) {
            return Err(Rejection::MalformedDate {
                input: s.to_string(),
            });
        }
        let (date, time) = s.split_at(s.len() - TIME_WIDTH);
        Ok(SlotLabel {
            date: date.parse()?,
            time: time.parse()?,
        })
    }
}

/// One immutable snapshot of the grid: headers plus the two matrices.
///
/// `assignments` and `availability` always have `rows.len()` rows of
/// `cols.len()` cells each.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleData {
    pub rows: Vec<TimeRange>,
    pub cols: Vec<DateLabel>,
    pub assignments: Vec<Vec<Option<ApplicantId>>>,
    pub availability: Vec<Vec<bool>>,
}

impl ScheduleData {
    /// Two quarter-hour rows on 11/30 and 12/01 with `app-1` booked at 09:00 on 12/01
    pub fn seed() -> Self {
        let rows = vec![TimeRange::from_start(540, 15), TimeRange::from_start(555, 15)];
        let cols = vec![
            DateLabel("11/30 (日)".to_string()),
            DateLabel("12/01 (月)".to_string()),
        ];
        let mut assignments = vec![vec![None; cols.len()]; rows.len()];
        assignments[0][1] = Some("app-1".to_string());
        let availability = vec![vec![true; cols.len()]; rows.len()];
        ScheduleData {
            rows,
            cols,
            assignments,
            availability,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.cols.is_empty()
    }

    pub fn check_row(&self, row: usize) -> Result<(), Rejection> {
        if row < self.rows.len() {
            Ok(())
        } else {
            Err(Rejection::RowOutOfRange {
                row,
                rows: self.rows.len(),
            })
        }
    }

    pub fn check_col(&self, col: usize) -> Result<(), Rejection> {
        if col < self.cols.len() {
            Ok(())
        } else {
            Err(Rejection::ColOutOfRange {
                col,
                cols: self.cols.len(),
            })
        }
    }

    pub fn check_slot(&self, key: SlotKey) -> Result<(), Rejection> {
        self.check_row(key.row)?;
        self.check_col(key.col)
    }

    pub fn occupant(&self, key: SlotKey) -> Option<&str> {
        self.assignments
            .get(key.row)
            .and_then(|row| row.get(key.col))
            .and_then(|cell| cell.as_deref())
    }

    /// Out-of-range slots count as unavailable.
    pub fn is_available(&self, key: SlotKey) -> bool {
        self.availability
            .get(key.row)
            .and_then(|row| row.get(key.col))
            .copied()
            .unwrap_or(false)
    }

    pub fn label(&self, key: SlotKey) -> Option<SlotLabel> {
        Some(SlotLabel {
            date: self.cols.get(key.col)?.clone(),
            time: *self.rows.get(key.row)?,
        })
    }

    /// First slot (row-major) holding `applicant_id`
    pub fn find_applicant(&self, applicant_id: &str) -> Option<SlotKey> {
        self.assignments.iter().enumerate().find_map(|(row, cells)| {
            cells
                .iter()
                .position(|cell| cell.as_deref() == Some(applicant_id))
                .map(|col| SlotKey { row, col })
        })
    }

    pub fn assigned_ids(&self) -> HashSet<&str> {
        self.assignments
            .iter()
            .flatten()
            .filter_map(|cell| cell.as_deref())
            .collect()
    }

    /// Applicants booked in a row, sorted by id
    pub fn occupants_in_row(&self, row: usize) -> Vec<ApplicantId> {
        let mut ids: Vec<ApplicantId> = self
            .assignments
            .get(row)
            .into_iter()
            .flatten()
            .flatten()
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    /// Applicants booked in a column, sorted by id
    pub fn occupants_in_col(&self, col: usize) -> Vec<ApplicantId> {
        let mut ids: Vec<ApplicantId> = self
            .assignments
            .iter()
            .filter_map(|cells| cells.get(col).cloned().flatten())
            .collect();
        ids.sort();
        ids
    }

    /// An unavailable slot that still holds an assignment
    pub fn needs_clearing(&self, key: SlotKey) -> bool {
        !self.is_available(key) && self.occupant(key).is_some()
    }

    pub fn orphaned_slots(&self) -> Vec<SlotKey> {
        let mut slots = Vec::new();
        for row in 0..self.rows.len() {
            for col in 0..self.cols.len() {
                let key = SlotKey { row, col };
                if self.needs_clearing(key) {
                    slots.push(key);
                }
            }
        }
        slots
    }

    /// Every slot as `<date> <time>`, dates outermost, in board order.
    pub fn all_slot_labels(&self) -> Vec<String> {
        let mut labels = Vec::with_capacity(self.rows.len() * self.cols.len());
        for date in &self.cols {
            for time in &self.rows {
                labels.push(format!("{} {}", date, time));
            }
        }
        labels
    }

    /// Checks shape, header ordering and single-slot assignment of loaded data.
    pub fn validate(&self) -> Result<(), SeedError> {
        let shape = SeedError::Shape {
            rows: self.rows.len(),
            cols: self.cols.len(),
        };
        if self.assignments.len() != self.rows.len() || self.availability.len() != self.rows.len() {
            return Err(shape);
        }
        let cols = self.cols.len();
        if self.assignments.iter().any(|r| r.len() != cols)
            || self.availability.iter().any(|r| r.len() != cols)
        {
            return Err(shape);
        }
        if self.rows.windows(2).any(|w| w[0].start() >= w[1].start()) {
            return Err(SeedError::RowOrder);
        }
        if self.cols.windows(2).any(|w| w[0].sort_key() > w[1].sort_key())
            || self.cols.iter().collect::<HashSet<_>>().len() != cols
        {
            return Err(SeedError::ColOrder);
        }
        let mut seen = HashSet::new();
        for id in self.assignments.iter().flatten().flatten() {
            if !seen.insert(id.as_str()) {
                return Err(SeedError::DuplicateAssignment { id: id.clone() });
            }
        }
        Ok(())
    }
}
