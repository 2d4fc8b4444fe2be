//! Status aggregation over a finished criterion list
//!
//! First applicable rule wins:
//!
//! 1. no criteria: potentially eligible, "No criteria evaluated"
//! 2. first inclusion criterion not met: not eligible
//! 3. first exclusion criterion not met: not eligible
//! 4. any unknown: potentially eligible, with the missing data of every
//!    unknown criterion followed by its name
//! 5. otherwise eligible

use crate::domain::criteria::{Criterion, CriterionKind, CriterionOutcome, EligibilityStatus};
use serde::{Deserialize, Serialize};

/// Aggregated status fields of an assessment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub status: EligibilityStatus,
    pub reason: Option<String>,
    /// Deduplicated, in first-seen order
    pub missing_data: Vec<String>,
}

impl StatusSummary {
    fn new(status: EligibilityStatus, reason: Option<String>) -> Self {
        Self {
            status,
            reason,
            missing_data: Vec::new(),
        }
    }
}

/// Computes the overall status for a list of criteria
pub fn aggregate(criteria: &[Criterion]) -> StatusSummary {
    if criteria.is_empty() {
        return StatusSummary::new(
            EligibilityStatus::PotentiallyEligible,
            Some("No criteria evaluated".to_string()),
        );
    }

    if let Some(failed) = first_not_met(criteria, CriterionKind::Inclusion) {
        return StatusSummary::new(
            EligibilityStatus::NotEligible,
            Some(format!("Inclusion criterion not met: {}", failed.name())),
        );
    }

    if let Some(present) = first_not_met(criteria, CriterionKind::Exclusion) {
        return StatusSummary::new(
            EligibilityStatus::NotEligible,
            Some(format!("Exclusion criterion present: {}", present.name())),
        );
    }

    let mut missing_data: Vec<String> = Vec::new();
    for criterion in criteria
        .iter()
        .filter(|c| c.outcome() == CriterionOutcome::Unknown)
    {
        let elements = criterion
            .missing_data()
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(criterion.name()));
        for element in elements {
            if !missing_data.iter().any(|seen| seen == element) {
                missing_data.push(element.to_string());
            }
        }
    }

    if missing_data.is_empty() {
        StatusSummary::new(EligibilityStatus::Eligible, None)
    } else {
        StatusSummary {
            status: EligibilityStatus::PotentiallyEligible,
            reason: None,
            missing_data,
        }
    }
}

fn first_not_met(criteria: &[Criterion], kind: CriterionKind) -> Option<&Criterion> {
    criteria
        .iter()
        .find(|c| c.kind() == kind && c.outcome() == CriterionOutcome::NotMet)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inclusion_met(name: &str) -> Criterion {
        Criterion::met(name, CriterionKind::Inclusion, "ok")
    }

    fn all_met() -> Vec<Criterion> {
        vec![
            inclusion_met("Age ≥18 years"),
            inclusion_met("NSCLC Diagnosis"),
            inclusion_met("Stage IIIB/IV Disease"),
            inclusion_met("ECOG Performance Status 0-2"),
            inclusion_met("Hemoglobin ≥9.0 g/dL"),
            inclusion_met("Absolute Neutrophil Count ≥1,500/µL"),
            inclusion_met("Platelet Count ≥100,000/µL"),
            Criterion::met("No Prior Therapy", CriterionKind::Exclusion, "ok"),
            Criterion::met("No Active Brain Metastases", CriterionKind::Exclusion, "ok"),
        ]
    }

    #[test]
    fn test_empty_is_potentially_eligible() {
        let summary = aggregate(&[]);
        assert_eq!(summary.status, EligibilityStatus::PotentiallyEligible);
        assert_eq!(summary.reason.as_deref(), Some("No criteria evaluated"));
        assert!(summary.missing_data.is_empty());
    }

    #[test]
    fn test_all_met_is_eligible() {
        let summary = aggregate(&all_met());
        assert_eq!(summary.status, EligibilityStatus::Eligible);
        assert!(summary.reason.is_none());
        assert!(summary.missing_data.is_empty());
    }

    #[test]
    fn test_inclusion_not_met() {
        let mut criteria = all_met();
        criteria[0] = Criterion::not_met(
            "Age ≥18 years",
            CriterionKind::Inclusion,
            "Age: 17 years (under 18)",
        );
        let summary = aggregate(&criteria);
        assert_eq!(summary.status, EligibilityStatus::NotEligible);
        assert_eq!(
            summary.reason.as_deref(),
            Some("Inclusion criterion not met: Age ≥18 years")
        );
    }

    #[test]
    fn test_exclusion_present() {
        let mut criteria = all_met();
        criteria[7] = Criterion::not_met(
            "No Prior Therapy",
            CriterionKind::Exclusion,
            "Prior therapy found",
        );
        let summary = aggregate(&criteria);
        assert_eq!(summary.status, EligibilityStatus::NotEligible);
        assert_eq!(
            summary.reason.as_deref(),
            Some("Exclusion criterion present: No Prior Therapy")
        );
    }

    #[test]
    fn test_inclusion_failure_wins_over_exclusion_and_unknown() {
        let mut criteria = all_met();
        criteria[1] = Criterion::unknown(
            "NSCLC Diagnosis",
            CriterionKind::Inclusion,
            "No condition data available",
            "Condition/diagnosis information",
        );
        criteria[4] = Criterion::not_met("Hemoglobin ≥9.0 g/dL", CriterionKind::Inclusion, "low");
        criteria[8] = Criterion::not_met(
            "No Active Brain Metastases",
            CriterionKind::Exclusion,
            "Active brain metastases found",
        );
        let summary = aggregate(&criteria);
        assert_eq!(
            summary.reason.as_deref(),
            Some("Inclusion criterion not met: Hemoglobin ≥9.0 g/dL")
        );
        assert!(summary.missing_data.is_empty());
    }

    #[test]
    fn test_unknown_collects_missing_data_and_names() {
        let mut criteria = all_met();
        criteria[0] = Criterion::unknown(
            "Age ≥18 years",
            CriterionKind::Inclusion,
            "Birth date not available",
            "Patient birth date",
        );
        criteria[7] = Criterion::unknown(
            "No Prior Therapy",
            CriterionKind::Exclusion,
            "Medication history not available",
            "Medication history",
        );

        let summary = aggregate(&criteria);
        assert_eq!(summary.status, EligibilityStatus::PotentiallyEligible);
        assert!(summary.reason.is_none());
        assert_eq!(
            summary.missing_data,
            vec![
                "Patient birth date".to_string(),
                "Age ≥18 years".to_string(),
                "Medication history".to_string(),
                "No Prior Therapy".to_string(),
            ]
        );
    }

    #[test]
    fn test_missing_data_deduplicated_in_order() {
        let criteria = vec![
            Criterion::unknown("A", CriterionKind::Inclusion, "", "Shared"),
            Criterion::unknown("B", CriterionKind::Inclusion, "", "Shared"),
        ];
        let summary = aggregate(&criteria);
        assert_eq!(
            summary.missing_data,
            vec!["Shared".to_string(), "A".to_string(), "B".to_string()]
        );
    }
}
