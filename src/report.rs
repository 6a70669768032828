use std::fmt::Write;

use chrono::NaiveDate;

use crate::loader::DATE_FORMAT;
use crate::models::{AlertEntry, AlertLists, CohortSummary, Population, StudentRecord};
use crate::stats;

/// Dates render the way they arrived, MM/DD/YY. `None` is the
/// empty-input sentinel.
fn display_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => date.format(DATE_FORMAT).to_string(),
        None => "no data".to_string(),
    }
}

pub fn no_data_message(name: &str) -> String {
    format!("No data available for student: {name}")
}

pub fn render_dashboard(
    summary: &CohortSummary,
    alerts: &AlertLists,
    population: &Population,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Student Performance Dashboard");
    let _ = writeln!(output);
    let _ = writeln!(output, "## Cohort Performance");

    if summary.scores_by_year.is_empty() {
        let _ = writeln!(output, "No test records loaded.");
    } else {
        let _ = writeln!(
            output,
            "| Year | Average Score | Last Test Date | Company Average Score |"
        );
        let _ = writeln!(output, "| --- | --- | --- | --- |");
        for (year, average) in &summary.scores_by_year {
            let _ = writeln!(
                output,
                "| {year} | {average:.2} | {} | {:.2} |",
                display_date(summary.last_test_date),
                summary.average_score
            );
        }
    }

    write_alert_section(
        &mut output,
        "Verbal Tutor Alerts",
        "Verbal Tutor",
        &alerts.verbal_tutor,
    );
    write_alert_section(
        &mut output,
        "Math Tutor Alerts",
        "Math Tutor",
        &alerts.math_tutor,
    );
    write_alert_section(
        &mut output,
        "Counselor Alerts",
        "Counselor",
        &alerts.counselor,
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Students");
    if population.is_empty() {
        let _ = writeln!(output, "No students on file.");
    } else {
        let _ = writeln!(output, "{}", population.names().join(", "));
    }

    output
}

fn write_alert_section(output: &mut String, title: &str, role: &str, entries: &[AlertEntry]) {
    let _ = writeln!(output);
    let _ = writeln!(output, "## {title}");
    if entries.is_empty() {
        let _ = writeln!(output, "No alerts.");
        return;
    }
    for entry in entries {
        let _ = writeln!(
            output,
            "- Student: {}, {role}: {}",
            entry.student_name, entry.contact
        );
    }
}

/// The on-demand per-student view: tests in chronological order, then
/// the two summary lines.
pub fn render_student(student: &StudentRecord) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Results for {}:", student.name);
    let _ = writeln!(output);
    let _ = writeln!(output, "| Digital | Verbal | Math | Test # | Date |");
    let _ = writeln!(output, "| --- | --- | --- | --- | --- |");
    for test in &student.tests {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} | {} |",
            test.digital_score,
            test.verbal_score,
            test.math_score,
            test.test_number,
            display_date(Some(test.test_date))
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "Average Digital Score: {:.2}",
        stats::student_average_digital_score(student)
    );
    match student.predicted_score_range {
        Some(range) => {
            let _ = writeln!(
                output,
                "Predicted Score Range: ({:.2}, {})",
                range.cohort_average, range.student_max
            );
        }
        None => {
            let _ = writeln!(output, "Predicted Score Range: no data");
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PredictedScoreRange, TestRecord};
    use std::collections::BTreeMap;

    fn test_record(month: u32, digital: i32) -> TestRecord {
        TestRecord {
            digital_score: digital,
            verbal_score: digital / 2,
            math_score: digital / 2,
            test_number: month as i32,
            test_date: NaiveDate::from_ymd_opt(2024, month, 1).unwrap(),
        }
    }

    fn alice() -> StudentRecord {
        StudentRecord {
            name: "Alice".to_string(),
            tests: vec![test_record(1, 500), test_record(2, 600)],
            verbal_tutor: "V1".to_string(),
            math_tutor: "M1".to_string(),
            counselor: "C1".to_string(),
            predicted_score_range: Some(PredictedScoreRange {
                cohort_average: 600.0,
                student_max: 600,
            }),
            score_improvement: Some(100),
        }
    }

    #[test]
    fn dashboard_lists_years_alerts_and_roster() {
        let summary = CohortSummary {
            average_score: 600.0,
            last_test_date: NaiveDate::from_ymd_opt(2024, 2, 1),
            scores_by_year: BTreeMap::from([(2024, 600.0)]),
        };
        let alerts = AlertLists {
            verbal_tutor: vec![AlertEntry {
                student_name: "Alice".to_string(),
                contact: "V1".to_string(),
            }],
            ..AlertLists::default()
        };
        let population = Population {
            students: vec![alice()],
            last_test_date: summary.last_test_date,
        };

        let rendered = render_dashboard(&summary, &alerts, &population);
        assert!(rendered.contains("| 2024 | 600.00 | 02/01/24 | 600.00 |"));
        assert!(rendered.contains("- Student: Alice, Verbal Tutor: V1"));
        assert!(rendered.contains("## Math Tutor Alerts\nNo alerts."));
        assert!(rendered.contains("## Students\nAlice"));
    }

    #[test]
    fn empty_cohort_renders_sentinels() {
        let summary = CohortSummary {
            average_score: 0.0,
            last_test_date: None,
            scores_by_year: BTreeMap::new(),
        };
        let population = Population {
            students: vec![],
            last_test_date: None,
        };

        let rendered = render_dashboard(&summary, &AlertLists::default(), &population);
        assert!(rendered.contains("No test records loaded."));
        assert!(rendered.contains("No students on file."));
    }

    #[test]
    fn student_view_has_tests_and_summary_lines() {
        let rendered = render_student(&alice());
        assert!(rendered.contains("Results for Alice:"));
        assert!(rendered.contains("| 500 | 250 | 250 | 1 | 01/01/24 |"));
        assert!(rendered.contains("Average Digital Score: 550.00"));
        assert!(rendered.contains("Predicted Score Range: (600.00, 600)"));
    }

    #[test]
    fn lookup_miss_is_informational() {
        assert_eq!(
            no_data_message("Zed"),
            "No data available for student: Zed"
        );
    }
}
