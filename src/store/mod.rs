//! The schedule store: the single owner of grid, roster and interaction state.
//!
//! Every grid change goes through [`reduce`], which maps the current
//! snapshot to the next one. The store only swaps snapshots, tracks the
//! click selection and drag in progress, and stages destructive actions
//! behind a confirmation.

mod pending;


pub use pending::{Confirmation, Outcome, PendingAction};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{FormError, Rejection};
use crate::form::{save_submission, ApplicantForm};
use crate::roster::{
    self, seed_applicants, unlink_sibling, Applicant, DirectSiblingResolver, SiblingResolver,
    SiblingSummary,
};
use crate::schedule::{
    calculate_time_range, minutes_to_time_string, next_start_time, parse_time_to_minutes, reduce,
    time_options, ApplicantId, DateLabel, DragPayload, DragSource, DropTarget, ScheduleAction,
    ScheduleData, SlotKey, SlotLabel, DEFAULT_DURATION_MINUTES, DURATION_OPTIONS,
    MINUTES_PER_DAY,
};

#[derive(Debug, Clone)]
pub struct ScheduleStore {
    schedule: ScheduleData,
    applicants: Vec<Applicant>,
    selected_slot: Option<SlotKey>,
    dragging: Option<DragPayload>,
    hovered: Option<DropTarget>,
    pending: Option<Confirmation>,
    interview_duration: u32,
    selected_start_time: u32,
    revision: u64,
}

/// Serializable view of the store handed to presentation layers
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub revision: u64,
    pub schedule: &'a ScheduleData,
    pub applicants: &'a [Applicant],
    pub unassigned: Vec<&'a str>,
    pub all_schedule_slots: Vec<String>,
    pub orphaned_slots: Vec<SlotKey>,
    pub selected_slot: Option<SlotKey>,
    pub dragging: Option<&'a DragPayload>,
    pub hovered: Option<DropTarget>,
    pub pending: Option<&'a Confirmation>,
    pub interview_duration: u32,
    pub duration_options: &'static [u32],
    pub next_start_time: String,
    pub time_options: Vec<String>,
}

/// Everything the applicant details view shows
#[derive(Debug, Serialize)]
pub struct ApplicantDetails<'a> {
    pub applicant: &'a Applicant,
    pub assignment: Option<SlotLabel>,
    pub siblings: Vec<SiblingSummary>,
}

impl Default for ScheduleStore {
    fn default() -> Self {
        ScheduleStore::new(ScheduleData::seed(), seed_applicants())
    }
}

impl ScheduleStore {
    pub fn new(schedule: ScheduleData, applicants: Vec<Applicant>) -> Self {
        let selected_start_time = next_start_time(&schedule.rows);
        ScheduleStore {
            schedule,
            applicants,
            selected_slot: None,
            dragging: None,
            hovered: None,
            pending: None,
            interview_duration: DEFAULT_DURATION_MINUTES,
            selected_start_time,
            revision: 0,
        }
    }

    pub fn schedule(&self) -> &ScheduleData {
        &self.schedule
    }

    pub fn applicants(&self) -> &[Applicant] {
        &self.applicants
    }

    pub fn selected_slot(&self) -> Option<SlotKey> {
        self.selected_slot
    }

    pub fn dragging(&self) -> Option<&DragPayload> {
        self.dragging.as_ref()
    }

    pub fn hovered(&self) -> Option<DropTarget> {
        self.hovered
    }

    pub fn pending(&self) -> Option<&Confirmation> {
        self.pending.as_ref()
    }

    pub fn interview_duration(&self) -> u32 {
        self.interview_duration
    }

    /// Suggested start time for the next row (HH:MM)
    pub fn next_start_time(&self) -> String {
        minutes_to_time_string(self.selected_start_time)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn unassigned(&self) -> Vec<&Applicant> {
        roster::unassigned(&self.applicants, &self.schedule)
    }

    pub fn all_schedule_slots(&self) -> Vec<String> {
        self.schedule.all_slot_labels()
    }

    pub fn applicant_name(&self, applicant_id: &str) -> &str {
        roster::applicant_name(&self.applicants, applicant_id)
    }

    pub fn assignment_details(&self, applicant_id: &str) -> Option<SlotLabel> {
        roster::assignment_details(&self.schedule, applicant_id)
    }

    pub fn applicant_details(&self, applicant_id: &str) -> Option<ApplicantDetails<'_>> {
        let applicant = roster::find_applicant(&self.applicants, applicant_id)?;
        let resolver = DirectSiblingResolver::new(&self.applicants, &self.schedule);
        Some(ApplicantDetails {
            applicant,
            assignment: self.assignment_details(applicant_id),
            siblings: resolver.siblings_of(applicant),
        })
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            revision: self.revision,
            schedule: &self.schedule,
            applicants: &self.applicants,
            unassigned: self.unassigned().iter().map(|a| a.id.as_str()).collect(),
            all_schedule_slots: self.all_schedule_slots(),
            orphaned_slots: self.schedule.orphaned_slots(),
            selected_slot: self.selected_slot,
            dragging: self.dragging.as_ref(),
            hovered: self.hovered,
            pending: self.pending.as_ref(),
            interview_duration: self.interview_duration,
            duration_options: &DURATION_OPTIONS,
            next_start_time: self.next_start_time(),
            time_options: time_options(self.interview_duration),
        }
    }

    /// Runs one grid transition and swaps in the resulting snapshot.
    pub fn apply(&mut self, action: ScheduleAction) -> Outcome {
        match reduce(&self.schedule, &action) {
            Ok(next) => {
                self.schedule = next;
                self.revision += 1;
                // A selection never rests on an unavailable slot.
                if self
                    .selected_slot
                    .is_some_and(|slot| !self.schedule.is_available(slot))
                {
                    self.selected_slot = None;
                }
                Outcome::Applied
            }
            Err(reason) => ignore(reason),
        }
    }

    // --- settings ---

    pub fn set_interview_duration(&mut self, minutes: u32) -> Outcome {
        if !DURATION_OPTIONS.contains(&minutes) {
            return ignore(Rejection::UnsupportedDuration { minutes });
        }
        self.interview_duration = minutes;
        Outcome::Applied
    }

    pub fn set_start_time(&mut self, start: &str) -> Outcome {
        match parse_time_to_minutes(start) {
            Some(minutes) => {
                self.selected_start_time = minutes;
                Outcome::Applied
            }
            None => ignore(Rejection::MalformedTime {
                input: start.to_string(),
            }),
        }
    }

    // --- rows and columns ---

    /// Adds a row lasting `duration` minutes; a row spans less than a day.
    pub fn add_row(&mut self, start: &str, duration: u32) -> Outcome {
        if duration == 0 || duration >= MINUTES_PER_DAY {
            return ignore(Rejection::DurationOutOfRange { minutes: duration });
        }
        let Some(range) = calculate_time_range(start, duration) else {
            return ignore(Rejection::MalformedTime {
                input: start.to_string(),
            });
        };
        let outcome = self.apply(ScheduleAction::AddRow { range });
        if outcome.is_applied() {
            self.after_reshape();
        }
        outcome
    }

    /// Adds a row at the selected start time using the current interview duration.
    pub fn add_row_from_selection(&mut self) -> Outcome {
        let start = minutes_to_time_string(self.selected_start_time);
        self.add_row(&start, self.interview_duration)
    }

    /// Deletes a row, staging a confirmation first when it holds assignments.
    pub fn request_delete_row(&mut self, row: usize) -> Outcome {
        if let Err(reason) = self.schedule.check_row(row) {
            return ignore(reason);
        }
        let occupants = self.schedule.occupants_in_row(row);
        if !occupants.is_empty() {
            return self.stage(Confirmation::delete_row(self.schedule.rows[row], occupants));
        }
        self.delete_row_now(row)
    }

    pub fn add_col(&mut self, label: &str) -> Outcome {
        match label.parse::<DateLabel>() {
            Ok(label) => self.add_col_label(label),
            Err(reason) => ignore(reason),
        }
    }

    pub fn add_col_from_date(&mut self, date: NaiveDate) -> Outcome {
        self.add_col_label(DateLabel::from_date(date))
    }

    /// Deletes a column, staging a confirmation first when it holds assignments.
    pub fn request_delete_col(&mut self, col: usize) -> Outcome {
        if let Err(reason) = self.schedule.check_col(col) {
            return ignore(reason);
        }
        let occupants = self.schedule.occupants_in_col(col);
        if !occupants.is_empty() {
            let label = self.schedule.cols[col].clone();
            return self.stage(Confirmation::delete_col(label, occupants));
        }
        self.delete_col_now(col)
    }

    /// Flips availability; disabling an occupied slot needs confirmation.
    pub fn toggle_slot_availability(&mut self, row: usize, col: usize) -> Outcome {
        let slot = SlotKey::new(row, col);
        if let Err(reason) = self.schedule.check_slot(slot) {
            return ignore(reason);
        }
        if self.schedule.is_available(slot) {
            if let Some(occupant) = self.schedule.occupant(slot) {
                let name = self.applicant_name(occupant).to_string();
                let occupant = occupant.to_string();
                let range = self.schedule.rows[row];
                let label = self.schedule.cols[col].clone();
                return self.stage(Confirmation::disable_slot(range, label, occupant, &name));
            }
        }
        self.apply(ScheduleAction::ToggleAvailability { slot })
    }

    // --- click protocol ---

    pub fn slot_click(&mut self, row: usize, col: usize) -> Outcome {
        let slot = SlotKey::new(row, col);
        if let Err(reason) = self.schedule.check_slot(slot) {
            return ignore(reason);
        }
        let is_selected = self.selected_slot == Some(slot);

        if !self.schedule.is_available(slot) && !is_selected {
            self.selected_slot = None;
            return Outcome::Applied;
        }

        match self.selected_slot {
            Some(from) if from != slot => {
                self.selected_slot = None;
                if !self.schedule.is_available(from) {
                    return ignore(Rejection::SlotUnavailable {
                        row: from.row,
                        col: from.col,
                    });
                }
                self.apply(ScheduleAction::Swap { from, to: slot })
            }
            Some(_) => {
                self.selected_slot = None;
                Outcome::Applied
            }
            None => {
                self.selected_slot = Some(slot);
                Outcome::Applied
            }
        }
    }

    /// Books the clicked applicant into the selected slot.
    pub fn applicant_click(&mut self, applicant_id: &str) -> Outcome {
        let Some(slot) = self.selected_slot else {
            return ignore(Rejection::NoSelection);
        };
        if roster::find_applicant(&self.applicants, applicant_id).is_none() {
            return ignore(Rejection::UnknownApplicant {
                id: applicant_id.to_string(),
            });
        }
        self.selected_slot = None;
        if !self.schedule.is_available(slot) {
            return ignore(Rejection::SlotUnavailable {
                row: slot.row,
                col: slot.col,
            });
        }
        self.apply(ScheduleAction::Assign {
            slot,
            applicant_id: applicant_id.to_string(),
        })
    }

    // --- drag and drop ---

    pub fn drag_start(&mut self, applicant_id: &str, source: DragSource) -> Outcome {
        if roster::find_applicant(&self.applicants, applicant_id).is_none() {
            return ignore(Rejection::UnknownApplicant {
                id: applicant_id.to_string(),
            });
        }
        self.dragging = Some(DragPayload {
            applicant_id: applicant_id.to_string(),
            source,
        });
        self.selected_slot = None;
        Outcome::Applied
    }

    pub fn drag_enter(&mut self, target: DropTarget) {
        self.hovered = Some(target);
    }

    pub fn drag_leave(&mut self) {
        self.hovered = None;
    }

    pub fn drag_end(&mut self) {
        self.dragging = None;
    }

    /// Completes the drag in progress onto `target`.
    pub fn drop_on(&mut self, target: DropTarget) -> Outcome {
        self.hovered = None;
        self.selected_slot = None;
        let Some(payload) = self.dragging.take() else {
            return ignore(Rejection::NoDrag);
        };
        self.apply(ScheduleAction::Drop { payload, target })
    }

    // --- applicants ---

    pub fn save_applicant(&mut self, form: ApplicantForm) -> Result<ApplicantId, FormError> {
        let id = save_submission(&mut self.applicants, form)?;
        self.revision += 1;
        Ok(id)
    }

    /// Merges imported forms, updating applicants whose student id matches.
    ///
    /// An update keeps stored values for fields the import leaves blank.
    /// Returns how many records were saved.
    pub fn import_applicants(&mut self, forms: Vec<ApplicantForm>) -> usize {
        let mut saved = 0;
        for mut form in forms {
            if form.id.is_none() && !form.student_id.trim().is_empty() {
                let student_id = form.student_id.trim();
                if let Some(existing) = self
                    .applicants
                    .iter()
                    .find(|a| a.student_id.as_deref() == Some(student_id))
                {
                    form.id = Some(existing.id.clone());
                    form.fill_blanks_from(existing);
                }
            }
            match self.save_applicant(form) {
                Ok(_) => saved += 1,
                Err(err) => debug!(%err, "skipping imported applicant"),
            }
        }
        info!(saved, "imported applicants");
        saved
    }

    /// Stages deletion of an applicant; always asks for confirmation.
    pub fn request_delete_applicant(&mut self, applicant_id: &str) -> Outcome {
        let Some(applicant) = roster::find_applicant(&self.applicants, applicant_id) else {
            return ignore(Rejection::UnknownApplicant {
                id: applicant_id.to_string(),
            });
        };
        let assigned = self.schedule.find_applicant(applicant_id).is_some();
        let confirmation =
            Confirmation::delete_applicant(applicant.id.clone(), &applicant.name, assigned);
        self.stage(confirmation)
    }

    // --- confirmation gate ---

    /// Commits the staged action.
    pub fn confirm(&mut self) -> Outcome {
        let Some(confirmation) = self.pending.take() else {
            return ignore(Rejection::NothingPending);
        };
        info!(action = ?confirmation.action, "confirmed");

        match confirmation.action {
            PendingAction::DeleteRow { range, occupants } => {
                match self.schedule.rows.iter().position(|r| r.same_start(&range)) {
                    Some(row) if self.schedule.occupants_in_row(row) == occupants => {
                        self.delete_row_now(row)
                    }
                    Some(_) => ignore(Rejection::PendingTargetChanged),
                    None => ignore(Rejection::PendingTargetGone),
                }
            }
            PendingAction::DeleteCol { label, occupants } => {
                match self.schedule.cols.iter().position(|c| *c == label) {
                    Some(col) if self.schedule.occupants_in_col(col) == occupants => {
                        self.delete_col_now(col)
                    }
                    Some(_) => ignore(Rejection::PendingTargetChanged),
                    None => ignore(Rejection::PendingTargetGone),
                }
            }
            PendingAction::DisableSlot {
                range,
                label,
                occupant,
            } => {
                let row = self.schedule.rows.iter().position(|r| r.same_start(&range));
                let col = self.schedule.cols.iter().position(|c| *c == label);
                let (Some(row), Some(col)) = (row, col) else {
                    return ignore(Rejection::PendingTargetGone);
                };
                let slot = SlotKey::new(row, col);
                if self.schedule.occupant(slot) != Some(occupant.as_str()) {
                    return ignore(Rejection::PendingTargetChanged);
                }
                self.apply(ScheduleAction::DisableAndClear { slot })
            }
            PendingAction::DeleteApplicant {
                applicant_id,
                assigned,
            } => {
                if roster::find_applicant(&self.applicants, &applicant_id).is_none() {
                    return ignore(Rejection::PendingTargetGone);
                }
                if self.schedule.find_applicant(&applicant_id).is_some() != assigned {
                    return ignore(Rejection::PendingTargetChanged);
                }
                self.delete_applicant_now(&applicant_id)
            }
        }
    }

    /// Discards the staged action without touching any state.
    pub fn cancel(&mut self) -> Outcome {
        match self.pending.take() {
            Some(confirmation) => {
                debug!(action = ?confirmation.action, "cancelled");
                Outcome::Applied
            }
            None => ignore(Rejection::NothingPending),
        }
    }

    fn stage(&mut self, confirmation: Confirmation) -> Outcome {
        self.pending = Some(confirmation.clone());
        Outcome::NeedsConfirmation(confirmation)
    }

    fn add_col_label(&mut self, label: DateLabel) -> Outcome {
        let outcome = self.apply(ScheduleAction::AddCol { label });
        if outcome.is_applied() {
            self.after_reshape();
        }
        outcome
    }

    fn delete_row_now(&mut self, row: usize) -> Outcome {
        let outcome = self.apply(ScheduleAction::DeleteRow { row });
        if outcome.is_applied() {
            self.after_reshape();
        }
        outcome
    }

    fn delete_col_now(&mut self, col: usize) -> Outcome {
        let outcome = self.apply(ScheduleAction::DeleteCol { col });
        if outcome.is_applied() {
            self.after_reshape();
        }
        outcome
    }

    fn delete_applicant_now(&mut self, applicant_id: &str) -> Outcome {
        let before = self.applicants.len();
        self.applicants.retain(|a| a.id != applicant_id);
        if self.applicants.len() == before {
            return ignore(Rejection::PendingTargetGone);
        }
        unlink_sibling(&mut self.applicants, applicant_id);
        if self
            .dragging
            .as_ref()
            .is_some_and(|d| d.applicant_id == applicant_id)
        {
            self.dragging = None;
        }
        self.apply(ScheduleAction::ClearApplicant {
            applicant_id: applicant_id.to_string(),
        })
    }

    /// Indices shift when headers change, so index-based state is dropped.
    fn after_reshape(&mut self) {
        self.selected_start_time = next_start_time(&self.schedule.rows);
        self.selected_slot = None;
        self.hovered = None;
    }
}

fn ignore(reason: Rejection) -> Outcome {
    debug!(%reason, "ignored");
    Outcome::Ignored(reason)
}
