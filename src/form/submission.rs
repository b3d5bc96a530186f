use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::FormError;
use crate::roster::Applicant;
use crate::schedule::ApplicantId;

/// Applicant create/edit form as submitted by the frontend.
///
/// `id` is absent when creating and set when editing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantForm {
    #[serde(default)]
    pub id: Option<ApplicantId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub sibling_id: Option<String>,
    #[serde(default)]
    pub sibling_class: Option<String>,
    #[serde(default)]
    pub sibling_coordination_slot: Option<String>,
    #[serde(default)]
    pub preferred_dates: Vec<String>,
    #[serde(default)]
    pub family_id: Option<String>,
}

impl From<&Applicant> for ApplicantForm {
    fn from(applicant: &Applicant) -> Self {
        ApplicantForm {
            id: Some(applicant.id.clone()),
            name: applicant.name.clone(),
            student_id: applicant.student_id.clone().unwrap_or_default(),
            sibling_id: applicant.sibling_id.clone(),
            sibling_class: applicant.sibling_class.clone(),
            sibling_coordination_slot: applicant.sibling_coordination_slot.clone(),
            preferred_dates: applicant.preferred_dates.clone(),
            family_id: applicant.family_id.clone(),
        }
    }
}

impl ApplicantForm {
    /// Fills fields the form leaves blank from a stored record.
    ///
    /// Used when an import updates an applicant it matched by student id, so
    /// columns the import lacks keep their stored values.
    pub fn fill_blanks_from(&mut self, existing: &Applicant) {
        fn keep(field: &mut Option<String>, stored: &Option<String>) {
            if field.as_deref().map_or(true, |v| v.trim().is_empty()) {
                *field = stored.clone();
            }
        }

        if self.name.trim().is_empty() {
            self.name = existing.name.clone();
        }
        keep(&mut self.sibling_id, &existing.sibling_id);
        keep(&mut self.sibling_class, &existing.sibling_class);
        keep(
            &mut self.sibling_coordination_slot,
            &existing.sibling_coordination_slot,
        );
        keep(&mut self.family_id, &existing.family_id);
        if self.preferred_dates.is_empty() {
            self.preferred_dates = existing.preferred_dates.clone();
        }
    }
}

/// Validates a form submission
pub fn validate_submission(form: &ApplicantForm) -> Result<(), FormError> {
    if form.name.trim().is_empty() {
        return Err(FormError::MissingName);
    }
    Ok(())
}

/// Saves a submission into `applicants` and returns the id of the saved record.
///
/// Creating assigns a fresh id and, when no student id was given, a
/// `NEW-<n>` placeholder. Editing replaces the record with the same id.
pub fn save_submission(
    applicants: &mut Vec<Applicant>,
    form: ApplicantForm,
) -> Result<ApplicantId, FormError> {
    validate_submission(&form)?;

    let mut record = Applicant {
        id: String::new(),
        name: form.name.trim().to_string(),
        student_id: non_blank(Some(form.student_id)),
        sibling_id: non_blank(form.sibling_id),
        sibling_class: non_blank(form.sibling_class),
        sibling_coordination_slot: non_blank(form.sibling_coordination_slot),
        preferred_dates: dedup_preserving_order(form.preferred_dates),
        family_id: non_blank(form.family_id),
    };

    match form.id {
        Some(id) => {
            let existing = applicants
                .iter_mut()
                .find(|a| a.id == id)
                .ok_or_else(|| FormError::UnknownApplicant { id: id.clone() })?;
            record.id = id.clone();
            *existing = record;
            Ok(id)
        }
        None => {
            let id = generate_applicant_id(applicants);
            record.id = id.clone();
            if record.student_id.is_none() {
                record.student_id = Some(placeholder_student_id(applicants));
            }
            applicants.push(record);
            Ok(id)
        }
    }
}

/// Fresh `app-<millis>-<hex>` id not used by any applicant
pub fn generate_applicant_id(applicants: &[Applicant]) -> ApplicantId {
    let millis = Utc::now().timestamp_millis();
    loop {
        let id = format!("app-{}-{:04x}", millis, rand::random::<u16>());
        if !applicants.iter().any(|a| a.id == id) {
            return id;
        }
    }
}

/// First `NEW-<n>` from the roster size upwards that no applicant holds
fn placeholder_student_id(applicants: &[Applicant]) -> String {
    let mut n = applicants.len() + 1;
    loop {
        let candidate = format!("NEW-{}", n);
        if !applicants
            .iter()
            .any(|a| a.student_id.as_deref() == Some(candidate.as_str()))
        {
            return candidate;
        }
        n += 1;
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn dedup_preserving_order(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::seed_applicants;

    fn form(name: &str) -> ApplicantForm {
        ApplicantForm {
            name: name.to_string(),
            ..ApplicantForm::default()
        }
    }

    #[test]
    fn blank_name_is_rejected_without_saving() {
        let mut applicants = seed_applicants();
        let err = save_submission(&mut applicants, form("   ")).unwrap_err();
        assert_eq!(err, FormError::MissingName);
        assert_eq!(applicants.len(), 4);
    }

    #[test]
    fn create_assigns_id_and_placeholder_student_id() {
        let mut applicants = seed_applicants();
        let id = save_submission(&mut applicants, form("  高橋 健  ")).unwrap();

        let saved = applicants.last().unwrap();
        assert_eq!(saved.id, id);
        assert!(id.starts_with("app-"));
        assert_eq!(saved.name, "高橋 健");
        assert_eq!(saved.student_id.as_deref(), Some("NEW-5"));
    }

    #[test]
    fn create_keeps_given_student_id() {
        let mut applicants = Vec::new();
        let mut submission = form("高橋 健");
        submission.student_id = " 1300 ".to_string();
        save_submission(&mut applicants, submission).unwrap();
        assert_eq!(applicants[0].student_id.as_deref(), Some("1300"));
    }

    #[test]
    fn edit_replaces_by_id() {
        let mut applicants = seed_applicants();
        let mut submission = ApplicantForm::from(&applicants[1]);
        submission.name = "山田 花".to_string();
        submission.sibling_id = Some(String::new());
        submission.preferred_dates = vec![
            "12/01 (月) 09:00 - 09:15".to_string(),
            "12/01 (月) 09:00 - 09:15".to_string(),
        ];

        let id = save_submission(&mut applicants, submission).unwrap();
        assert_eq!(id, "app-2");
        assert_eq!(applicants[1].name, "山田 花");
        assert_eq!(applicants[1].sibling_id, None);
        assert_eq!(applicants[1].preferred_dates.len(), 1);
        assert_eq!(applicants.len(), 4);
    }

    #[test]
    fn edit_of_unknown_id_fails() {
        let mut applicants = seed_applicants();
        let mut submission = form("誰か");
        submission.id = Some("app-99".to_string());
        assert_eq!(
            save_submission(&mut applicants, submission).unwrap_err(),
            FormError::UnknownApplicant {
                id: "app-99".to_string()
            }
        );
    }

    #[test]
    fn placeholder_student_id_skips_numbers_in_use() {
        let mut applicants = seed_applicants();
        save_submission(&mut applicants, form("高橋 健")).unwrap();
        assert_eq!(applicants[4].student_id.as_deref(), Some("NEW-5"));

        // Removing an earlier applicant brings the roster size back to 4.
        applicants.remove(0);
        save_submission(&mut applicants, form("中村 優")).unwrap();
        assert_eq!(applicants[4].student_id.as_deref(), Some("NEW-6"));
    }

    #[test]
    fn blanks_are_filled_from_stored_record() {
        let mut stored = seed_applicants().remove(1);
        stored.sibling_id = Some("app-1".to_string());
        stored.sibling_class = Some("3年A組".to_string());
        stored.preferred_dates = vec!["12/01 (月) 09:15 - 09:30".to_string()];
        stored.family_id = Some("fam-7".to_string());

        let mut imported = form("山田 花子 (更新)");
        imported.student_id = "1202".to_string();
        imported.sibling_class = Some(" ".to_string());
        imported.fill_blanks_from(&stored);

        assert_eq!(imported.name, "山田 花子 (更新)");
        assert_eq!(imported.sibling_id.as_deref(), Some("app-1"));
        assert_eq!(imported.sibling_class.as_deref(), Some("3年A組"));
        assert_eq!(imported.family_id.as_deref(), Some("fam-7"));
        assert_eq!(imported.preferred_dates, stored.preferred_dates);
    }

    #[test]
    fn generated_ids_are_unique() {
        let mut applicants = Vec::new();
        for _ in 0..20 {
            let id = generate_applicant_id(&applicants);
            applicants.push(Applicant::new(id, "x"));
        }
        let mut ids: Vec<&str> = applicants.iter().map(|a| a.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 20);
    }
}
