use serde::Serialize;

use super::applicant::Applicant;
use crate::schedule::{ScheduleData, SlotLabel};

/// What the details view shows about one sibling
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiblingSummary {
    pub id: String,
    pub name: String,
    pub class: Option<String>,
    pub coordination_slot: Option<String>,
    /// `None` while the sibling is still on the roster
    pub assignment: Option<SlotLabel>,
}

/// Looks up the siblings of an applicant.
pub trait SiblingResolver {
    fn siblings_of(&self, applicant: &Applicant) -> Vec<SiblingSummary>;
}

/// Resolves siblings through `sibling_id` references inside the applicant collection.
///
/// The link is treated as mutual: when the applicant names no sibling, the
/// first applicant that names it is returned instead. At most one sibling
/// is ever reported.
pub struct DirectSiblingResolver<'a> {
    applicants: &'a [Applicant],
    schedule: &'a ScheduleData,
}

impl<'a> DirectSiblingResolver<'a> {
    pub fn new(applicants: &'a [Applicant], schedule: &'a ScheduleData) -> Self {
        DirectSiblingResolver {
            applicants,
            schedule,
        }
    }

    fn summarize(
        &self,
        sibling: &Applicant,
        class: Option<String>,
        slot: Option<String>,
    ) -> SiblingSummary {
        SiblingSummary {
            id: sibling.id.clone(),
            name: sibling.name.clone(),
            class,
            coordination_slot: slot,
            assignment: super::assignment_details(self.schedule, &sibling.id),
        }
    }
}

impl SiblingResolver for DirectSiblingResolver<'_> {
    fn siblings_of(&self, applicant: &Applicant) -> Vec<SiblingSummary> {
        if let Some(sibling_id) = applicant.sibling_id.as_deref() {
            return self
                .applicants
                .iter()
                .find(|a| a.id == sibling_id && a.id != applicant.id)
                .map(|sibling| {
                    self.summarize(
                        sibling,
                        applicant.sibling_class.clone(),
                        applicant.sibling_coordination_slot.clone(),
                    )
                })
                .into_iter()
                .collect();
        }

        self.applicants
            .iter()
            .find(|a| {
                a.id != applicant.id && a.sibling_id.as_deref() == Some(applicant.id.as_str())
            })
            .map(|sibling| self.summarize(sibling, None, sibling.sibling_coordination_slot.clone()))
            .into_iter()
            .collect()
    }
}

/// Drops references to `removed_id` so no applicant points at a deleted sibling.
pub fn unlink_sibling(applicants: &mut [Applicant], removed_id: &str) {
    for applicant in applicants.iter_mut() {
        if applicant.sibling_id.as_deref() == Some(removed_id) {
            applicant.sibling_id = None;
            applicant.sibling_class = None;
            applicant.sibling_coordination_slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linked() -> Vec<Applicant> {
        let mut taro = Applicant::new("app-1", "佐藤 太郎");
        taro.sibling_id = Some("app-3".to_string());
        taro.sibling_class = Some("3-2".to_string());
        taro.sibling_coordination_slot = Some("12/01 (月) 09:15 - 09:30".to_string());
        vec![
            taro,
            Applicant::new("app-2", "山田 花子"),
            Applicant::new("app-3", "佐藤 次郎"),
        ]
    }

    #[test]
    fn forward_reference_reports_class_and_assignment() {
        let applicants = linked();
        let mut schedule = ScheduleData::seed();
        schedule.assignments[1][0] = Some("app-3".to_string());
        let resolver = DirectSiblingResolver::new(&applicants, &schedule);

        let siblings = resolver.siblings_of(&applicants[0]);
        assert_eq!(siblings.len(), 1);
        assert_eq!(siblings[0].name, "佐藤 次郎");
        assert_eq!(siblings[0].class.as_deref(), Some("3-2"));
        let slot = siblings[0].assignment.as_ref().unwrap();
        assert_eq!(slot.to_string(), "11/30 (日) 09:15 - 09:30");
    }

    #[test]
    fn reverse_reference_is_found() {
        let applicants = linked();
        let schedule = ScheduleData::seed();
        let resolver = DirectSiblingResolver::new(&applicants, &schedule);

        let siblings = resolver.siblings_of(&applicants[2]);
        assert_eq!(siblings.len(), 1);
        assert_eq!(siblings[0].id, "app-1");
        assert_eq!(siblings[0].class, None);
        assert_eq!(
            siblings[0].assignment.as_ref().map(ToString::to_string).as_deref(),
            Some("12/01 (月) 09:00 - 09:15")
        );
    }

    #[test]
    fn no_sibling_and_dangling_reference_yield_nothing() {
        let mut applicants = linked();
        let schedule = ScheduleData::seed();
        assert!(DirectSiblingResolver::new(&applicants, &schedule)
            .siblings_of(&applicants[1])
            .is_empty());

        applicants[0].sibling_id = Some("app-9".to_string());
        assert!(DirectSiblingResolver::new(&applicants, &schedule)
            .siblings_of(&applicants[0])
            .is_empty());
    }

    #[test]
    fn unlink_clears_sibling_fields() {
        let mut applicants = linked();
        unlink_sibling(&mut applicants, "app-3");
        assert_eq!(applicants[0].sibling_id, None);
        assert_eq!(applicants[0].sibling_class, None);
    }
}
