use std::collections::HashMap;
use std::io::Read;

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info};

use crate::error::CsvError;
use crate::form::ApplicantForm;
use crate::schedule::SlotLabel;

/// Column positions found in the CSV header
struct Columns {
    name: usize,
    student_id: Option<usize>,
    sibling_id: Option<usize>,
    sibling_class: Option<usize>,
    sibling_coordination_slot: Option<usize>,
    preferred_dates: Option<usize>,
    family_id: Option<usize>,
}

impl Columns {
    fn detect(headers: &StringRecord) -> Result<Self, CsvError> {
        let find = |needles: &[&str]| {
            headers.iter().position(|h| {
                let h = normalize_header(h);
                needles.iter().any(|n| h == *n)
            })
        };

        let name = find(&["name", "applicant name", "氏名", "名前"])
            .ok_or(CsvError::MissingColumn { column: "name" })?;
        Ok(Columns {
            name,
            student_id: find(&["student id", "studentid", "学籍番号"]),
            sibling_id: find(&["sibling id", "siblingid", "兄弟id"]),
            sibling_class: find(&["sibling class", "siblingclass", "兄弟クラス"]),
            sibling_coordination_slot: find(&[
                "sibling coordination slot",
                "siblingcoordinationslot",
                "兄弟調整枠",
            ]),
            preferred_dates: find(&["preferred dates", "preferreddates", "希望日時"]),
            family_id: find(&["family id", "familyid", "家族id"]),
        })
    }
}

/// Lowercases and folds `_`/`-` into spaces so `student_id` and `Student ID` match
fn normalize_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .replace(['_', '-'], " ")
}

fn field(record: &StringRecord, col: Option<usize>) -> String {
    col.and_then(|c| record.get(c))
        .unwrap_or("")
        .trim()
        .to_string()
}

fn optional(record: &StringRecord, col: Option<usize>) -> Option<String> {
    Some(field(record, col)).filter(|v| !v.is_empty())
}

/// Parses a comma or semicolon separated list of `<date> <time>` labels,
/// dropping entries that are not valid slot labels.
fn parse_preferred_dates(value: &str) -> Vec<String> {
    value
        .split([',', ';'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(|part| part.parse::<SlotLabel>().ok())
        .map(|label| label.to_string())
        .collect()
}

/// Reads applicant records from CSV.
///
/// Columns are located by header name, so their order does not matter. Rows
/// without a name are skipped. When several rows share a student id, the
/// last one wins and keeps the position of the first.
pub fn read_applicants<R: Read>(input: R) -> Result<Vec<ApplicantForm>, CsvError> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(input);
    let columns = Columns::detect(reader.headers()?)?;

    let mut forms: Vec<ApplicantForm> = Vec::new();
    let mut by_student_id: HashMap<String, usize> = HashMap::new();

    for result in reader.records() {
        let record = result?;

        let name = field(&record, Some(columns.name));
        if name.is_empty() {
            debug!(line = ?record.position().map(|p| p.line()), "skipping row without a name");
            continue;
        }

        let form = ApplicantForm {
            id: None,
            name,
            student_id: field(&record, columns.student_id),
            sibling_id: optional(&record, columns.sibling_id),
            sibling_class: optional(&record, columns.sibling_class),
            sibling_coordination_slot: optional(&record, columns.sibling_coordination_slot),
            preferred_dates: parse_preferred_dates(&field(&record, columns.preferred_dates)),
            family_id: optional(&record, columns.family_id),
        };

        if form.student_id.is_empty() {
            forms.push(form);
            continue;
        }
        match by_student_id.get(&form.student_id) {
            Some(&index) => forms[index] = form,
            None => {
                by_student_id.insert(form.student_id.clone(), forms.len());
                forms.push(form);
            }
        }
    }

    info!(count = forms.len(), "read applicants from CSV");
    Ok(forms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_are_found_by_header() {
        let csv = "\
Family ID,Student ID,Name,Preferred Dates
F-1,1300,高橋 健,\"12/01 (月) 09:00 - 09:15, 11/30 (日) 09:15 - 09:30\"
";
        let forms = read_applicants(csv.as_bytes()).unwrap();
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0].name, "高橋 健");
        assert_eq!(forms[0].student_id, "1300");
        assert_eq!(forms[0].family_id.as_deref(), Some("F-1"));
        assert_eq!(
            forms[0].preferred_dates,
            vec!["12/01 (月) 09:00 - 09:15", "11/30 (日) 09:15 - 09:30"]
        );
    }

    #[test]
    fn snake_case_and_japanese_headers() {
        let csv = "氏名,student_id,sibling_id,sibling_class\n山田 花子,1202,app-3,2-B\n";
        let forms = read_applicants(csv.as_bytes()).unwrap();
        assert_eq!(forms[0].name, "山田 花子");
        assert_eq!(forms[0].sibling_id.as_deref(), Some("app-3"));
        assert_eq!(forms[0].sibling_class.as_deref(), Some("2-B"));
    }

    #[test]
    fn missing_name_column_is_an_error() {
        let csv = "student_id\n1201\n";
        assert!(matches!(
            read_applicants(csv.as_bytes()),
            Err(CsvError::MissingColumn { column: "name" })
        ));
    }

    #[test]
    fn blank_names_are_skipped_and_duplicates_merged() {
        let csv = "name,student_id\n,1201\n佐藤 太郎,1201\n鈴木 美咲,\n佐藤 太郎 (再),1201\n";
        let forms = read_applicants(csv.as_bytes()).unwrap();
        let names: Vec<&str> = forms.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["佐藤 太郎 (再)", "鈴木 美咲"]);
    }

    #[test]
    fn invalid_preferred_dates_are_dropped() {
        assert_eq!(
            parse_preferred_dates("tomorrow; 12/01 (月) 09:00 - 09:15;"),
            vec!["12/01 (月) 09:00 - 09:15"]
        );
    }
}
