use serde::{Deserialize, Serialize};

use super::assignment::{
    assign_to_slot, clear_applicant, drop_applicant, swap_slots, DragPayload, DropTarget,
};
use super::matrix::{
    add_col, add_row, delete_col, delete_row, disable_and_clear, toggle_availability,
};
use super::types::{ApplicantId, DateLabel, ScheduleData, SlotKey, TimeRange};
use crate::error::Rejection;

/// Every transition the grid supports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScheduleAction {
    AddRow { range: TimeRange },
    DeleteRow { row: usize },
    AddCol { label: DateLabel },
    DeleteCol { col: usize },
    ToggleAvailability { slot: SlotKey },
    DisableAndClear { slot: SlotKey },
    Swap { from: SlotKey, to: SlotKey },
    Assign { slot: SlotKey, applicant_id: ApplicantId },
    Drop { payload: DragPayload, target: DropTarget },
    ClearApplicant { applicant_id: ApplicantId },
}

/// Computes the snapshot that follows `action`.
pub fn reduce(data: &ScheduleData, action: &ScheduleAction) -> Result<ScheduleData, Rejection> {
    match action {
        ScheduleAction::AddRow { range } => add_row(data, *range),
        ScheduleAction::DeleteRow { row } => delete_row(data, *row),
        ScheduleAction::AddCol { label } => add_col(data, label.clone()),
        ScheduleAction::DeleteCol { col } => delete_col(data, *col),
        ScheduleAction::ToggleAvailability { slot } => toggle_availability(data, *slot),
        ScheduleAction::DisableAndClear { slot } => disable_and_clear(data, *slot),
        ScheduleAction::Swap { from, to } => swap_slots(data, *from, *to),
        ScheduleAction::Assign { slot, applicant_id } => assign_to_slot(data, *slot, applicant_id),
        ScheduleAction::Drop { payload, target } => drop_applicant(data, payload, *target),
        ScheduleAction::ClearApplicant { applicant_id } => Ok(clear_applicant(data, applicant_id)),
    }
}
