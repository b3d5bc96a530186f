use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;

use crate::error::CsvError;
use crate::roster::{self, Applicant};
use crate::schedule::{ScheduleData, SlotKey};

/// Cell text for an unavailable, empty slot
pub const UNAVAILABLE_CELL: &str = "(unavailable)";

/// Writes the board as CSV: a `Time` column, then one column per date.
///
/// Booked cells hold the applicant's name; empty unavailable cells hold
/// `(unavailable)` and empty available cells stay blank.
pub fn write_board_csv<W: Write>(
    schedule: &ScheduleData,
    applicants: &[Applicant],
    out: W,
) -> Result<(), CsvError> {
    let mut wtr = WriterBuilder::new().from_writer(out);

    let mut header = vec!["Time".to_string()];
    header.extend(schedule.cols.iter().map(|c| c.to_string()));
    wtr.write_record(&header)?;

    for (row, range) in schedule.rows.iter().enumerate() {
        let mut record = vec![range.to_string()];
        for col in 0..schedule.cols.len() {
            let key = SlotKey::new(row, col);
            let cell = match schedule.occupant(key) {
                Some(id) => roster::applicant_name(applicants, id).to_string(),
                None if !schedule.is_available(key) => UNAVAILABLE_CELL.to_string(),
                None => String::new(),
            };
            record.push(cell);
        }
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes every applicant with the slot they hold, or a blank assignment.
pub fn write_roster_csv<W: Write>(
    schedule: &ScheduleData,
    applicants: &[Applicant],
    out: W,
) -> Result<(), CsvError> {
    let mut wtr = WriterBuilder::new().from_writer(out);
    wtr.write_record([
        "id",
        "name",
        "student_id",
        "sibling_id",
        "sibling_class",
        "sibling_coordination_slot",
        "preferred_dates",
        "family_id",
        "assignment",
    ])?;

    for applicant in applicants {
        let assignment = roster::assignment_details(schedule, &applicant.id)
            .map(|label| label.to_string())
            .unwrap_or_default();
        wtr.write_record([
            applicant.id.as_str(),
            applicant.name.as_str(),
            applicant.student_id.as_deref().unwrap_or(""),
            applicant.sibling_id.as_deref().unwrap_or(""),
            applicant.sibling_class.as_deref().unwrap_or(""),
            applicant.sibling_coordination_slot.as_deref().unwrap_or(""),
            applicant.preferred_dates.join("; ").as_str(),
            applicant.family_id.as_deref().unwrap_or(""),
            assignment.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports the board and roster to the given CSV paths
pub fn export_to_files(
    schedule: &ScheduleData,
    applicants: &[Applicant],
    board_path: &Path,
    roster_path: &Path,
) -> Result<(), CsvError> {
    write_board_csv(schedule, applicants, File::create(board_path)?)?;
    write_roster_csv(schedule, applicants, File::create(roster_path)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::read_applicants;
    use crate::roster::seed_applicants;
    use pretty_assertions::assert_eq;

    #[test]
    fn board_csv_layout() {
        let mut schedule = ScheduleData::seed();
        schedule.availability[1][0] = false;
        let mut out = Vec::new();
        write_board_csv(&schedule, &seed_applicants(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Time,11/30 (日),12/01 (月)\n\
             09:00 - 09:15,,佐藤 太郎\n\
             09:15 - 09:30,(unavailable),\n"
        );
    }

    #[test]
    fn roster_csv_reads_back_through_import() {
        let schedule = ScheduleData::seed();
        let applicants = seed_applicants();
        let mut out = Vec::new();
        write_roster_csv(&schedule, &applicants, &mut out).unwrap();

        let text = String::from_utf8(out.clone()).unwrap();
        assert!(text.contains("app-1,佐藤 太郎,1201"));
        assert!(text.contains("12/01 (月) 09:00 - 09:15\n"));

        let forms = read_applicants(out.as_slice()).unwrap();
        assert_eq!(forms.len(), applicants.len());
        assert_eq!(forms[1].student_id, "1202");
        assert_eq!(forms[1].preferred_dates, applicants[1].preferred_dates);
    }
}
