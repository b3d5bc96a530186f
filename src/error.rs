//! Error types for the interview scheduler.

use std::io;

/// Reason a schedule transition was turned away by a policy gate.
///
/// Rejections never surface as user-visible errors: the store logs them and
/// keeps the current snapshot untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("a row starting at {start} already exists")]
    DuplicateStartTime { start: String },

    #[error("date column {label} already exists")]
    DuplicateDate { label: String },

    #[error("malformed time: {input:?} (expected HH:MM)")]
    MalformedTime { input: String },

    #[error("malformed date label: {input:?} (expected MM/DD (weekday))")]
    MalformedDate { input: String },

    #[error("row {row} out of range ({rows} rows)")]
    RowOutOfRange { row: usize, rows: usize },

    #[error("column {col} out of range ({cols} columns)")]
    ColOutOfRange { col: usize, cols: usize },

    #[error("slot ({row}, {col}) is unavailable")]
    SlotUnavailable { row: usize, col: usize },

    #[error("dropped onto the slot it came from")]
    SameSlot,

    #[error("applicant {applicant} already occupies the target slot")]
    AlreadyPlaced { applicant: String },

    #[error("slot ({row}, {col}) no longer holds applicant {applicant}")]
    StaleSource {
        applicant: String,
        row: usize,
        col: usize,
    },

    #[error("roster item dropped back onto the roster")]
    RosterToRoster,

    #[error("no slot is selected")]
    NoSelection,

    #[error("no drag in progress")]
    NoDrag,

    #[error("unknown applicant {id}")]
    UnknownApplicant { id: String },

    #[error("no action awaiting confirmation")]
    NothingPending,

    #[error("the confirmed action's target no longer exists")]
    PendingTargetGone,

    #[error("the confirmed action's target changed after it was staged")]
    PendingTargetChanged,

    #[error("unsupported interview duration: {minutes} minutes")]
    UnsupportedDuration { minutes: u32 },

    #[error("a row must last between 1 and 1439 minutes, got {minutes}")]
    DurationOutOfRange { minutes: u32 },
}

/// Validation failure for an applicant create/update submission.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Name is required")]
    MissingName,

    #[error("No applicant with id {id}")]
    UnknownApplicant { id: String },
}

/// Failure while reading or writing CSV.
#[derive(Debug, thiserror::Error)]
pub enum CsvError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV is missing a {column} column")]
    MissingColumn { column: &'static str },
}

/// Failure while loading a JSON seed file.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] io::Error),

    #[error("invalid seed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("seed matrices do not match {rows} rows x {cols} columns")]
    Shape { rows: usize, cols: usize },

    #[error("seed rows are not sorted by start time or share a start time")]
    RowOrder,

    #[error("seed columns are not sorted by date or repeat a label")]
    ColOrder,

    #[error("applicant {id} is assigned to more than one slot")]
    DuplicateAssignment { id: String },
}
