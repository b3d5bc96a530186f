use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::roster::{self, Applicant};
use crate::schedule::{ScheduleData, SlotKey};

/// Shown instead of a board with no rows or no columns
pub const EMPTY_BOARD: &str =
    "No slots configured. Add a time range and a date to create interview slots.";

/// Formats an applicant name with their student id
pub fn format_applicant_name(student_id: Option<&str>, name: &str) -> String {
    match student_id {
        Some(id) if !id.is_empty() => format!("[{}] {}", id, name),
        _ => name.to_string(),
    }
}

fn cell_text(schedule: &ScheduleData, applicants: &[Applicant], key: SlotKey) -> String {
    match schedule.occupant(key) {
        Some(id) => match roster::find_applicant(applicants, id) {
            Some(a) => format_applicant_name(a.student_id.as_deref(), &a.name),
            None => roster::UNKNOWN_APPLICANT.to_string(),
        },
        None if !schedule.is_available(key) => "[UNAVAILABLE]".to_string(),
        None => "[EMPTY]".to_string(),
    }
}

/// Renders the board one date at a time, in the format: HH:MM - HH:MM [id] name
pub fn format_board(schedule: &ScheduleData, applicants: &[Applicant]) -> String {
    if schedule.is_empty() {
        return format!("{}\n", EMPTY_BOARD);
    }

    let mut out = String::new();
    for (col, date) in schedule.cols.iter().enumerate() {
        out.push_str(&format!("** {} **\n", date));
        for (row, range) in schedule.rows.iter().enumerate() {
            let cell = cell_text(schedule, applicants, SlotKey::new(row, col));
            out.push_str(&format!("{} {}\n", range, cell));
        }
    }
    out
}

/// Renders the applicants not placed on the board
pub fn format_unassigned(schedule: &ScheduleData, applicants: &[Applicant]) -> String {
    let unassigned = roster::unassigned(applicants, schedule);
    if unassigned.is_empty() {
        return "All applicants are assigned.\n".to_string();
    }
    let mut out = format!("Unassigned applicants ({}):\n", unassigned.len());
    for applicant in unassigned {
        let name = format_applicant_name(applicant.student_id.as_deref(), &applicant.name);
        out.push_str(&format!("  - {} (ID: {})\n", name, applicant.id));
    }
    out
}

/// Prints the board and the unassigned applicants
pub fn print_board(schedule: &ScheduleData, applicants: &[Applicant]) {
    println!("\n=== Interview Schedule ===");
    print!("{}", format_board(schedule, applicants));
    println!();
    print!("{}", format_unassigned(schedule, applicants));
}

/// Writes the rendered board to a file
pub fn write_board_to_file(
    schedule: &ScheduleData,
    applicants: &[Applicant],
    path: &Path,
) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(format_board(schedule, applicants).as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::seed_applicants;
    use pretty_assertions::assert_eq;

    #[test]
    fn name_with_and_without_student_id() {
        assert_eq!(format_applicant_name(Some("1201"), "佐藤 太郎"), "[1201] 佐藤 太郎");
        assert_eq!(format_applicant_name(None, "佐藤 太郎"), "佐藤 太郎");
    }

    #[test]
    fn board_lists_each_date() {
        let mut schedule = ScheduleData::seed();
        schedule.availability[1][1] = false;
        let text = format_board(&schedule, &seed_applicants());
        assert_eq!(
            text,
            "** 11/30 (日) **\n\
             09:00 - 09:15 [EMPTY]\n\
             09:15 - 09:30 [EMPTY]\n\
             ** 12/01 (月) **\n\
             09:00 - 09:15 [1201] 佐藤 太郎\n\
             09:15 - 09:30 [UNAVAILABLE]\n"
        );
    }

    #[test]
    fn empty_board_message() {
        let text = format_board(&ScheduleData::default(), &[]);
        assert!(text.starts_with("No slots configured"));
    }

    #[test]
    fn unassigned_listing() {
        let text = format_unassigned(&ScheduleData::seed(), &seed_applicants());
        assert!(text.starts_with("Unassigned applicants (3):"));
        assert!(text.contains("[1202] 山田 花子 (ID: app-2)"));
    }
}
