use serde::{Deserialize, Serialize};

use crate::schedule::ApplicantId;

/// A student waiting for (or holding) an interview slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
    pub id: ApplicantId,
    pub name: String,
    #[serde(default)]
    pub student_id: Option<String>,
    /// Id of a sibling in the same applicant collection
    #[serde(default)]
    pub sibling_id: Option<ApplicantId>,
    #[serde(default)]
    pub sibling_class: Option<String>,
    /// Slot the family asked to line up with the sibling's interview
    #[serde(default)]
    pub sibling_coordination_slot: Option<String>,
    /// Slot labels (`<date> <time>`) the applicant prefers
    #[serde(default)]
    pub preferred_dates: Vec<String>,
    #[serde(default)]
    pub family_id: Option<String>,
}

impl Applicant {
    pub fn new(id: impl Into<ApplicantId>, name: impl Into<String>) -> Self {
        Applicant {
            id: id.into(),
            name: name.into(),
            student_id: None,
            sibling_id: None,
            sibling_class: None,
            sibling_coordination_slot: None,
            preferred_dates: Vec::new(),
            family_id: None,
        }
    }
}

/// Applicants loaded when no seed file is given
pub fn seed_applicants() -> Vec<Applicant> {
    fn entry(id: &str, name: &str, student_id: &str, preferred: &[&str], family: &str) -> Applicant {
        Applicant {
            student_id: Some(student_id.to_string()),
            preferred_dates: preferred.iter().map(|s| s.to_string()).collect(),
            family_id: Some(family.to_string()),
            ..Applicant::new(id, name)
        }
    }

    vec![
        entry(
            "app-1",
            "佐藤 太郎",
            "1201",
            &["12/01 (月) 09:15 - 09:30", "11/30 (日) 14:00 - 14:15"],
            "1",
        ),
        entry(
            "app-2",
            "山田 花子",
            "1202",
            &["12/01 (月) 13:00 - 13:15", "11/30 (日) 11:00 - 11:15"],
            "2",
        ),
        entry(
            "app-3",
            "田中 一郎",
            "1203",
            &["12/01 (月) 09:00 - 09:15", "11/30 (日) 09:00 - 09:15"],
            "3",
        ),
        entry("app-4", "鈴木 美咲", "1204", &[], "4"),
    ]
}
