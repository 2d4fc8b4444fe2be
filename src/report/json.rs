//! JSON screening report

use super::{missing_data_frequency, StatusCounts, TrialMetadata, NO_PATIENTS_MESSAGE};
use crate::domain::criteria::Assessment;
use crate::domain::Result;
use serde::Serialize;
use serde_json::{json, Map, Value};

#[derive(Serialize)]
struct JsonReport<'a> {
    trial: &'a str,
    screening_date: String,
    summary: StatusCounts,
    /// Element name to number of patients
    missing_data_frequency: Map<String, Value>,
    assessments: &'a [Assessment],
}

/// Render the report as a pretty-printed JSON document
///
/// # Errors
///
/// Returns `ScreenerError::Serialization` if encoding fails.
pub fn render(assessments: &[Assessment], trial: &TrialMetadata) -> Result<String> {
    if assessments.is_empty() {
        return Ok(serde_json::to_string_pretty(
            &json!({ "message": NO_PATIENTS_MESSAGE }),
        )?);
    }

    let missing_data_frequency = missing_data_frequency(assessments)
        .into_iter()
        .map(|(element, count)| (element, Value::from(count)))
        .collect();

    let report = JsonReport {
        trial: &trial.name,
        screening_date: trial.screening_date.format("%Y-%m-%d").to_string(),
        summary: StatusCounts::from_assessments(assessments),
        missing_data_frequency,
        assessments,
    };

    Ok(serde_json::to_string_pretty(&report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::criteria::{Criterion, CriterionKind, PendingAssessment};
    use crate::domain::ids::PatientId;
    use chrono::NaiveDate;

    fn trial() -> TrialMetadata {
        TrialMetadata::new(
            "Phase II Advanced NSCLC Study",
            NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        )
    }

    #[test]
    fn test_empty_report_message() {
        let rendered = render(&[], &trial()).unwrap();
        let value: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value, json!({ "message": "No patients assessed." }));
    }

    #[test]
    fn test_report_document() {
        let mut pending = PendingAssessment::new(PatientId::new("1001").unwrap());
        pending.push(Criterion::unknown(
            "Age ≥18 years",
            CriterionKind::Inclusion,
            "Birth date not available",
            "Patient birth date",
        ));
        let assessments = vec![pending.finalize()];

        let rendered = render(&assessments, &trial()).unwrap();
        let value: Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value["trial"], "Phase II Advanced NSCLC Study");
        assert_eq!(value["screening_date"], "2025-03-14");
        assert_eq!(
            value["summary"],
            json!({ "total": 1, "eligible": 0, "not_eligible": 0, "potentially_eligible": 1 })
        );
        assert_eq!(value["missing_data_frequency"]["Patient birth date"], 1);
        assert_eq!(value["assessments"][0]["patient_id"], "1001");
        assert_eq!(value["assessments"][0]["criteria"][0]["outcome"], "UNKNOWN");
    }
}
