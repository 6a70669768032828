use std::io::Read;
use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use tracing::debug;

use crate::models::{Population, StudentRecord, TestRecord};

/// Test dates arrive as two-digit-year `MM/DD/YY`.
pub const DATE_FORMAT: &str = "%m/%d/%y";

/// The nine columns of a scores file, in fixed order. Deserialized by
/// position, so the header row only gets skipped, never matched by name.
#[derive(Debug, serde::Deserialize)]
struct ScoreRow {
    name: String,
    digital_score: i32,
    verbal_score: i32,
    math_score: i32,
    test_number: i32,
    test_date: String,
    verbal_tutor: String,
    math_tutor: String,
    counselor: String,
}

pub fn load_population(path: &Path) -> anyhow::Result<Population> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open scores file {}", path.display()))?;
    read_population(file)
}

/// Parse, sort, and group the scores file into a `Population`.
///
/// Rows are sorted ascending by test date across the whole file before
/// grouping; the stable sort keeps same-date rows in input order, so each
/// student's test list comes out chronological as well. A header-only file
/// yields an empty population with no last test date.
pub fn read_population(input: impl Read) -> anyhow::Result<Population> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input);

    let mut rows: Vec<(NaiveDate, ScoreRow)> = Vec::new();
    for (index, result) in reader.records().enumerate() {
        // Header is line 1, so the first data row is line 2.
        let line = index + 2;
        let record = result.with_context(|| format!("failed to read scores row at line {line}"))?;
        let row: ScoreRow = record
            .deserialize(None)
            .with_context(|| format!("malformed scores row at line {line}"))?;
        let test_date = NaiveDate::parse_from_str(&row.test_date, DATE_FORMAT).with_context(|| {
            format!(
                "invalid test date {:?} at line {line}, expected MM/DD/YY",
                row.test_date
            )
        })?;
        rows.push((test_date, row));
    }

    rows.sort_by_key(|(test_date, _)| *test_date);
    let last_test_date = rows.last().map(|(test_date, _)| *test_date);
    debug!(rows = rows.len(), "scores file read and sorted");

    let mut students: Vec<StudentRecord> = Vec::new();
    for (test_date, row) in rows {
        let test = TestRecord {
            digital_score: row.digital_score,
            verbal_score: row.verbal_score,
            math_score: row.math_score,
            test_number: row.test_number,
            test_date,
        };
        match students.iter_mut().find(|student| student.name == row.name) {
            Some(student) => student.tests.push(test),
            None => students.push(StudentRecord {
                name: row.name,
                tests: vec![test],
                // Contacts come from the student's first row; later rows
                // never reassign them.
                verbal_tutor: row.verbal_tutor,
                math_tutor: row.math_tutor,
                counselor: row.counselor,
                predicted_score_range: None,
                score_improvement: None,
            }),
        }
    }

    debug!(students = students.len(), "population grouped");
    Ok(Population {
        students,
        last_test_date,
    })
}
