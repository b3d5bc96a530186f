use serde::{Deserialize, Serialize};

use crate::error::Rejection;
use crate::schedule::{ApplicantId, DateLabel, TimeRange};

/// A destructive operation staged until the user confirms or cancels it.
///
/// Targets are named by header or id rather than by index, so the action
/// resolves against whatever the grid looks like when it is confirmed. Each
/// action also records the occupants the dialog warned about; confirming
/// after they changed is refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PendingAction {
    DeleteRow {
        range: TimeRange,
        occupants: Vec<ApplicantId>,
    },
    DeleteCol {
        label: DateLabel,
        occupants: Vec<ApplicantId>,
    },
    DisableSlot {
        range: TimeRange,
        label: DateLabel,
        occupant: ApplicantId,
    },
    DeleteApplicant {
        applicant_id: ApplicantId,
        assigned: bool,
    },
}

/// Everything a confirmation dialog needs to render, plus the staged action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    pub title: String,
    pub message: String,
    pub confirm_text: String,
    pub cancel_text: String,
    pub action: PendingAction,
}

impl Confirmation {
    pub fn delete_row(range: TimeRange, occupants: Vec<ApplicantId>) -> Self {
        Confirmation {
            title: "Delete time slot".to_string(),
            message: format!(
                "{} applicant(s) are already placed in this time slot ({}). Deleting it will \
                 unassign them and return them to the applicant list. Continue?",
                occupants.len(),
                range
            ),
            confirm_text: "Force delete".to_string(),
            cancel_text: "Cancel".to_string(),
            action: PendingAction::DeleteRow { range, occupants },
        }
    }

    pub fn delete_col(label: DateLabel, occupants: Vec<ApplicantId>) -> Self {
        Confirmation {
            title: "Delete date".to_string(),
            message: format!(
                "{} applicant(s) are already placed on this date ({}). Deleting it will \
                 unassign them and return them to the applicant list. Continue?",
                occupants.len(),
                label
            ),
            confirm_text: "Force delete".to_string(),
            cancel_text: "Cancel".to_string(),
            action: PendingAction::DeleteCol { label, occupants },
        }
    }

    pub fn disable_slot(
        range: TimeRange,
        label: DateLabel,
        occupant: ApplicantId,
        name: &str,
    ) -> Self {
        Confirmation {
            title: "Force unassign".to_string(),
            message: format!(
                "This slot ({} {}) is assigned to {}. Marking it unavailable will unassign \
                 them and return them to the applicant list. Continue?",
                label, range, name
            ),
            confirm_text: "Unassign and disable".to_string(),
            cancel_text: "Cancel (keep available)".to_string(),
            action: PendingAction::DisableSlot {
                range,
                label,
                occupant,
            },
        }
    }

    pub fn delete_applicant(applicant_id: ApplicantId, name: &str, assigned: bool) -> Self {
        let (message, confirm_text) = if assigned {
            (
                format!(
                    "{} is currently assigned to the schedule. Deleting will force-unassign \
                     them and remove their data. Continue?",
                    name
                ),
                "Force delete",
            )
        } else {
            (format!("Delete {} from the applicant list?", name), "Delete")
        };
        Confirmation {
            title: "Delete applicant".to_string(),
            message,
            confirm_text: confirm_text.to_string(),
            cancel_text: "Cancel".to_string(),
            action: PendingAction::DeleteApplicant {
                applicant_id,
                assigned,
            },
        }
    }
}

/// Result of a store operation as seen by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// State changed (snapshot, selection or drag state)
    Applied,
    /// A policy gate turned the operation away; nothing changed
    Ignored(Rejection),
    /// A destructive step was staged and waits for `confirm` or `cancel`
    NeedsConfirmation(Confirmation),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}
