use std::collections::BTreeMap;

use chrono::Datelike;
use tracing::debug;

use crate::models::{CohortSummary, Population, PredictedScoreRange, StudentRecord};

pub fn max_digital_score(student: &StudentRecord) -> i32 {
    student
        .tests
        .iter()
        .map(|test| test.digital_score)
        .max()
        .unwrap_or(0)
}

/// Mean digital score over every test of every student, 0.0 for an
/// empty cohort.
pub fn cohort_average_digital_score(population: &Population) -> f64 {
    let mut total: i64 = 0;
    let mut count: usize = 0;
    for student in &population.students {
        for test in &student.tests {
            total += i64::from(test.digital_score);
            count += 1;
        }
    }
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

/// Best score minus first score. Never negative: the maximum is at
/// least the first test's score.
pub fn score_improvement(student: &StudentRecord) -> i32 {
    match student.tests.first() {
        Some(first) => max_digital_score(student) - first.digital_score,
        None => 0,
    }
}

pub fn student_average_digital_score(student: &StudentRecord) -> f64 {
    if student.tests.is_empty() {
        return 0.0;
    }
    let total: i64 = student
        .tests
        .iter()
        .map(|test| i64::from(test.digital_score))
        .sum();
    total as f64 / student.tests.len() as f64
}

/// Attach the cohort-derived fields to every student. Needs the whole
/// population loaded first, since the range's lower bound is the global
/// average. Returns that average for the summarizer.
pub fn enrich(population: &mut Population) -> f64 {
    let cohort_average = cohort_average_digital_score(population);
    for student in &mut population.students {
        student.predicted_score_range = Some(PredictedScoreRange {
            cohort_average,
            student_max: max_digital_score(student),
        });
        student.score_improvement = Some(score_improvement(student));
    }
    debug!(
        students = population.students.len(),
        cohort_average, "population enriched"
    );
    cohort_average
}

/// Bucket every test by calendar year and average each bucket.
pub fn summarize_cohort(population: &Population, cohort_average: f64) -> CohortSummary {
    let mut buckets: BTreeMap<i32, Vec<i32>> = BTreeMap::new();
    for student in &population.students {
        for test in &student.tests {
            buckets
                .entry(test.test_date.year())
                .or_default()
                .push(test.digital_score);
        }
    }

    let scores_by_year = buckets
        .into_iter()
        .map(|(year, scores)| {
            let mean = if scores.is_empty() {
                0.0
            } else {
                scores.iter().map(|&score| i64::from(score)).sum::<i64>() as f64
                    / scores.len() as f64
            };
            (year, mean)
        })
        .collect();

    CohortSummary {
        average_score: cohort_average,
        last_test_date: population.last_test_date,
        scores_by_year,
    }
}
