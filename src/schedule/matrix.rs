//! Row/column reshaping and availability for the slot grid.
//!
//! Every function takes the current snapshot by reference and returns the
//! next one; a `Rejection` means the snapshot stays as it was.

use super::types::{DateLabel, ScheduleData, SlotKey, TimeRange};
use crate::error::Rejection;

/// Adds a time range row, keeping rows sorted by start time.
///
/// Rejected when any existing row starts at the same time, even if the
/// durations differ.
pub fn add_row(data: &ScheduleData, range: TimeRange) -> Result<ScheduleData, Rejection> {
    if data.rows.iter().any(|r| r.same_start(&range)) {
        return Err(Rejection::DuplicateStartTime {
            start: range.start_label(),
        });
    }

    let mut rows = data.rows.clone();
    rows.push(range);
    sort_time_rows(&mut rows);

    Ok(reconstruct_rows(data, rows))
}

/// Removes a row together with its assignments and availability flags.
pub fn delete_row(data: &ScheduleData, row: usize) -> Result<ScheduleData, Rejection> {
    data.check_row(row)?;

    let mut next = data.clone();
    next.rows.remove(row);
    next.assignments.remove(row);
    next.availability.remove(row);
    sort_time_rows(&mut next.rows);
    Ok(next)
}

/// Adds a date column, keeping columns sorted by `MM/DD`.
pub fn add_col(data: &ScheduleData, label: DateLabel) -> Result<ScheduleData, Rejection> {
    if data.cols.contains(&label) {
        return Err(Rejection::DuplicateDate {
            label: label.to_string(),
        });
    }

    let mut cols = data.cols.clone();
    cols.push(label);
    sort_date_cols(&mut cols);

    Ok(reconstruct_cols(data, cols))
}

pub fn delete_col(data: &ScheduleData, col: usize) -> Result<ScheduleData, Rejection> {
    data.check_col(col)?;

    let mut next = data.clone();
    next.cols.remove(col);
    for cells in &mut next.assignments {
        cells.remove(col);
    }
    for cells in &mut next.availability {
        cells.remove(col);
    }
    sort_date_cols(&mut next.cols);
    Ok(next)
}

/// Flips a slot between available and unavailable without touching its assignment.
pub fn toggle_availability(data: &ScheduleData, key: SlotKey) -> Result<ScheduleData, Rejection> {
    data.check_slot(key)?;

    let mut next = data.clone();
    let cell = &mut next.availability[key.row][key.col];
    *cell = !*cell;
    Ok(next)
}

/// Marks a slot unavailable and clears whoever was booked there, in one step.
pub fn disable_and_clear(data: &ScheduleData, key: SlotKey) -> Result<ScheduleData, Rejection> {
    data.check_slot(key)?;

    let mut next = data.clone();
    next.availability[key.row][key.col] = false;
    next.assignments[key.row][key.col] = None;
    Ok(next)
}

/// Sorts row headers by start time
pub fn sort_time_rows(rows: &mut [TimeRange]) {
    rows.sort_by_key(|r| r.start());
}

/// Sorts column headers by their `MM/DD` part
pub fn sort_date_cols(cols: &mut [DateLabel]) {
    cols.sort_by(|a, b| a.sort_key().cmp(b.sort_key()));
}

/// Rebuilds both matrices for a new row order, carrying each old row's
/// cells over to the new row with the same start time.
fn reconstruct_rows(data: &ScheduleData, rows: Vec<TimeRange>) -> ScheduleData {
    let width = data.cols.len();
    let mut assignments = Vec::with_capacity(rows.len());
    let mut availability = Vec::with_capacity(rows.len());

    for range in &rows {
        match data.rows.iter().position(|old| old.same_start(range)) {
            Some(old) => {
                assignments.push(data.assignments[old].clone());
                availability.push(data.availability[old].clone());
            }
            None => {
                assignments.push(vec![None; width]);
                availability.push(vec![true; width]);
            }
        }
    }

    ScheduleData {
        rows,
        cols: data.cols.clone(),
        assignments,
        availability,
    }
}

/// Rebuilds both matrices for a new column order, matching columns by exact label.
fn reconstruct_cols(data: &ScheduleData, cols: Vec<DateLabel>) -> ScheduleData {
    let old_index: Vec<Option<usize>> = cols
        .iter()
        .map(|label| data.cols.iter().position(|old| old == label))
        .collect();

    let assignments = data
        .assignments
        .iter()
        .map(|cells| {
            old_index
                .iter()
                .map(|old| old.and_then(|i| cells[i].clone()))
                .collect()
        })
        .collect();
    let availability = data
        .availability
        .iter()
        .map(|cells| {
            old_index
                .iter()
                .map(|old| old.map(|i| cells[i]).unwrap_or(true))
                .collect()
        })
        .collect();

    ScheduleData {
        rows: data.rows.clone(),
        cols,
        assignments,
        availability,
    }
}
