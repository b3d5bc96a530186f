//! Applicant collection and the views derived from it.
//!
//! Roster membership is never stored: an applicant is unassigned exactly
//! when its id appears nowhere in the assignment matrix.

pub mod applicant;
pub mod siblings;

pub use applicant::{seed_applicants, Applicant};
pub use siblings::{unlink_sibling, DirectSiblingResolver, SiblingResolver, SiblingSummary};

use crate::schedule::{ScheduleData, SlotLabel};

/// Shown wherever an id has no matching applicant
pub const UNKNOWN_APPLICANT: &str = "Unknown Applicant";

/// Applicants not booked into any slot, in collection order
pub fn unassigned<'a>(applicants: &'a [Applicant], schedule: &ScheduleData) -> Vec<&'a Applicant> {
    let assigned = schedule.assigned_ids();
    applicants
        .iter()
        .filter(|a| !assigned.contains(a.id.as_str()))
        .collect()
}

pub fn find_applicant<'a>(applicants: &'a [Applicant], id: &str) -> Option<&'a Applicant> {
    applicants.iter().find(|a| a.id == id)
}

pub fn applicant_name<'a>(applicants: &'a [Applicant], id: &str) -> &'a str {
    find_applicant(applicants, id)
        .map(|a| a.name.as_str())
        .unwrap_or(UNKNOWN_APPLICANT)
}

/// Date and time of the slot holding `applicant_id`, or `None` while unassigned.
pub fn assignment_details(schedule: &ScheduleData, applicant_id: &str) -> Option<SlotLabel> {
    schedule
        .find_applicant(applicant_id)
        .and_then(|slot| schedule.label(slot))
}
