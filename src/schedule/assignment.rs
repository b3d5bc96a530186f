//! Assignment moves: swaps, click-assign, drag-and-drop and clearing.
//!
//! Every move keeps each applicant in at most one slot.

use serde::{Deserialize, Serialize};

use super::types::{ApplicantId, ScheduleData, SlotKey};
use crate::error::Rejection;

/// Where a dragged applicant was picked up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DragSource {
    Grid { row: usize, col: usize },
    Roster,
}

/// Where a dragged applicant was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DropTarget {
    Grid { row: usize, col: usize },
    Roster,
}

impl DragSource {
    pub fn slot(&self) -> Option<SlotKey> {
        match *self {
            DragSource::Grid { row, col } => Some(SlotKey { row, col }),
            DragSource::Roster => None,
        }
    }
}

impl DropTarget {
    pub fn slot(&self) -> Option<SlotKey> {
        match *self {
            DropTarget::Grid { row, col } => Some(SlotKey { row, col }),
            DropTarget::Roster => None,
        }
    }
}

/// What a drag carries from pickup to drop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragPayload {
    pub applicant_id: ApplicantId,
    pub source: DragSource,
}

/// Exchanges the contents of two slots; either side may be empty.
pub fn swap_slots(data: &ScheduleData, a: SlotKey, b: SlotKey) -> Result<ScheduleData, Rejection> {
    data.check_slot(a)?;
    data.check_slot(b)?;

    let mut next = data.clone();
    let first = next.assignments[a.row][a.col].take();
    let second = next.assignments[b.row][b.col].take();
    next.assignments[a.row][a.col] = second;
    next.assignments[b.row][b.col] = first;
    Ok(next)
}

/// Books `applicant_id` into `target`.
///
/// The previous occupant of `target` is displaced back to the roster, and
/// any other slot already holding the applicant is cleared first.
pub fn assign_to_slot(
    data: &ScheduleData,
    target: SlotKey,
    applicant_id: &str,
) -> Result<ScheduleData, Rejection> {
    data.check_slot(target)?;

    let mut next = clear_applicant(data, applicant_id);
    next.assignments[target.row][target.col] = Some(applicant_id.to_string());
    Ok(next)
}

/// Applies a completed drag.
pub fn drop_applicant(
    data: &ScheduleData,
    payload: &DragPayload,
    target: DropTarget,
) -> Result<ScheduleData, Rejection> {
    let applicant_id = payload.applicant_id.as_str();

    if let Some(source) = payload.source.slot() {
        data.check_slot(source)?;
        if data.occupant(source) != Some(applicant_id) {
            return Err(Rejection::StaleSource {
                applicant: applicant_id.to_string(),
                row: source.row,
                col: source.col,
            });
        }
    }

    let target = match target.slot() {
        Some(slot) => slot,
        None => {
            // back to the roster: only a grid pickup changes anything
            let source = payload.source.slot().ok_or(Rejection::RosterToRoster)?;
            let mut next = data.clone();
            next.assignments[source.row][source.col] = None;
            return Ok(next);
        }
    };

    data.check_slot(target)?;
    if !data.is_available(target) {
        return Err(Rejection::SlotUnavailable {
            row: target.row,
            col: target.col,
        });
    }

    let occupant = data.occupant(target).map(str::to_string);
    match payload.source.slot() {
        Some(source) if source == target => Err(Rejection::SameSlot),
        Some(source) => {
            // grid pickup: move onto an empty slot, swap with an occupied one
            let mut next = data.clone();
            next.assignments[source.row][source.col] = occupant;
            next.assignments[target.row][target.col] = Some(applicant_id.to_string());
            Ok(next)
        }
        None if occupant.as_deref() == Some(applicant_id) => Err(Rejection::AlreadyPlaced {
            applicant: applicant_id.to_string(),
        }),
        None => {
            // roster pickup overwrites; the old occupant drops out of the matrix
            let mut next = clear_applicant(data, applicant_id);
            next.assignments[target.row][target.col] = Some(applicant_id.to_string());
            Ok(next)
        }
    }
}

/// Clears every slot that references `applicant_id`.
pub fn clear_applicant(data: &ScheduleData, applicant_id: &str) -> ScheduleData {
    let mut next = data.clone();
    for cell in next.assignments.iter_mut().flatten() {
        if cell.as_deref() == Some(applicant_id) {
            *cell = None;
        }
    }
    next
}
