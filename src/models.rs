use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

/// One row of the scores file, date already parsed.
#[derive(Debug, Clone, Serialize)]
pub struct TestRecord {
    pub digital_score: i32,
    pub verbal_score: i32,
    pub math_score: i32,
    pub test_number: i32,
    pub test_date: NaiveDate,
}

/// A student's tests plus the support contacts captured from their
/// first row. The derived fields stay `None` until enrichment runs.
#[derive(Debug, Clone, Serialize)]
pub struct StudentRecord {
    pub name: String,
    /// Chronological, never empty for a populated student.
    pub tests: Vec<TestRecord>,
    pub verbal_tutor: String,
    pub math_tutor: String,
    pub counselor: String,
    pub predicted_score_range: Option<PredictedScoreRange>,
    pub score_improvement: Option<i32>,
}

/// Not a confidence interval: the lower bound is the cohort-wide
/// average, the upper bound the student's own best digital score.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PredictedScoreRange {
    pub cohort_average: f64,
    pub student_max: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CohortSummary {
    pub average_score: f64,
    pub last_test_date: Option<NaiveDate>,
    pub scores_by_year: BTreeMap<i32, f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertEntry {
    pub student_name: String,
    pub contact: String,
}

/// Alert routing, one list per contact role. A student shows up in a
/// list only when that contact field is populated for them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AlertLists {
    pub verbal_tutor: Vec<AlertEntry>,
    pub math_tutor: Vec<AlertEntry>,
    pub counselor: Vec<AlertEntry>,
}

/// The whole cohort for one run. Students keep first-appearance order
/// (after the global date sort) so the roster reads in test order.
/// `last_test_date` is `None` when the input had no data rows.
#[derive(Debug, Clone, Serialize)]
pub struct Population {
    pub students: Vec<StudentRecord>,
    pub last_test_date: Option<NaiveDate>,
}

impl Population {
    /// Exact-match, case-sensitive lookup on the raw name.
    pub fn get(&self, name: &str) -> Option<&StudentRecord> {
        self.students.iter().find(|student| student.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.students.iter().map(|student| student.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }
}
