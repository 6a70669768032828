use tracing::debug;

use crate::models::{AlertEntry, AlertLists, Population, StudentRecord};

/// Students gaining less than this between their first and latest test
/// get routed to their support contacts.
pub const IMPROVEMENT_ALERT_THRESHOLD: i32 = 10;

/// Flag declining or flat students into the three contact lists.
/// Students with fewer than two tests have no trend and are skipped.
pub fn generate_alerts(population: &Population) -> AlertLists {
    let mut alerts = AlertLists::default();
    for student in &population.students {
        if needs_alert(student) {
            route_to_contacts(&mut alerts, student);
        }
    }
    debug!(
        verbal = alerts.verbal_tutor.len(),
        math = alerts.math_tutor.len(),
        counselor = alerts.counselor.len(),
        "alerts generated"
    );
    alerts
}

fn needs_alert(student: &StudentRecord) -> bool {
    if student.tests.len() < 2 {
        return false;
    }
    let (first, last) = match (student.tests.first(), student.tests.last()) {
        (Some(first), Some(last)) => (first.digital_score, last.digital_score),
        _ => return false,
    };
    if last < first {
        // Declined outright.
        return true;
    }
    last - first < IMPROVEMENT_ALERT_THRESHOLD
}

fn route_to_contacts(alerts: &mut AlertLists, student: &StudentRecord) {
    if !student.verbal_tutor.is_empty() {
        alerts.verbal_tutor.push(AlertEntry {
            student_name: student.name.clone(),
            contact: student.verbal_tutor.clone(),
        });
    }
    if !student.math_tutor.is_empty() {
        alerts.math_tutor.push(AlertEntry {
            student_name: student.name.clone(),
            contact: student.math_tutor.clone(),
        });
    }
    if !student.counselor.is_empty() {
        alerts.counselor.push(AlertEntry {
            student_name: student.name.clone(),
            contact: student.counselor.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TestRecord;
    use chrono::NaiveDate;

    fn test_record(month: u32, digital: i32) -> TestRecord {
        TestRecord {
            digital_score: digital,
            verbal_score: 250,
            math_score: 250,
            test_number: 1,
            test_date: NaiveDate::from_ymd_opt(2024, month, 1).unwrap(),
        }
    }

    fn student(name: &str, scores: &[i32], contacts: (&str, &str, &str)) -> StudentRecord {
        StudentRecord {
            name: name.to_string(),
            tests: scores
                .iter()
                .enumerate()
                .map(|(index, &digital)| test_record(index as u32 + 1, digital))
                .collect(),
            verbal_tutor: contacts.0.to_string(),
            math_tutor: contacts.1.to_string(),
            counselor: contacts.2.to_string(),
            predicted_score_range: None,
            score_improvement: None,
        }
    }

    fn population(students: Vec<StudentRecord>) -> Population {
        Population {
            students,
            last_test_date: NaiveDate::from_ymd_opt(2024, 12, 1),
        }
    }

    #[test]
    fn declining_student_lands_in_all_three_lists() {
        let cohort = population(vec![student("Alice", &[500, 495], ("V1", "M1", "C1"))]);
        let alerts = generate_alerts(&cohort);

        assert_eq!(alerts.verbal_tutor.len(), 1);
        assert_eq!(alerts.math_tutor.len(), 1);
        assert_eq!(alerts.counselor.len(), 1);
        assert_eq!(alerts.verbal_tutor[0].student_name, "Alice");
        assert_eq!(alerts.verbal_tutor[0].contact, "V1");
    }

    #[test]
    fn empty_contact_fields_skip_their_lists() {
        let cohort = population(vec![student("Bob", &[500, 495], ("", "M2", "C2"))]);
        let alerts = generate_alerts(&cohort);

        assert!(alerts.verbal_tutor.is_empty());
        assert_eq!(alerts.math_tutor.len(), 1);
        assert_eq!(alerts.counselor.len(), 1);
    }

    #[test]
    fn single_test_student_is_never_flagged() {
        let cohort = population(vec![student("Bob", &[700], ("V2", "M2", "C2"))]);
        let alerts = generate_alerts(&cohort);

        assert!(alerts.verbal_tutor.is_empty());
        assert!(alerts.math_tutor.is_empty());
        assert!(alerts.counselor.is_empty());
    }

    #[test]
    fn flat_improvement_below_threshold_is_flagged() {
        let cohort = population(vec![student("Alice", &[500, 509], ("V1", "M1", "C1"))]);
        let alerts = generate_alerts(&cohort);
        assert_eq!(alerts.counselor.len(), 1);
    }

    #[test]
    fn improvement_at_threshold_is_not_flagged() {
        let cohort = population(vec![student("Alice", &[500, 510], ("V1", "M1", "C1"))]);
        let alerts = generate_alerts(&cohort);
        assert!(alerts.counselor.is_empty());
    }

    #[test]
    fn trend_uses_first_and_last_not_max() {
        // Peaks in the middle, then falls back below the first score.
        let cohort = population(vec![student("Alice", &[500, 650, 480], ("V1", "M1", "C1"))]);
        let alerts = generate_alerts(&cohort);
        assert_eq!(alerts.verbal_tutor.len(), 1);
    }
}
