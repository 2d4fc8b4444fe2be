//! Criterion outcomes and patient assessments
//!
//! Evaluation is two-phase. Criteria are pushed onto a [`PendingAssessment`]
//! one at a time, then [`PendingAssessment::finalize`] runs the status
//! aggregation exactly once and yields an immutable [`Assessment`].

use crate::core::aggregate::{aggregate, StatusSummary};
use crate::domain::ids::PatientId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a criterion must hold or must not hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CriterionKind {
    Inclusion,
    Exclusion,
}

/// Three-state result of evaluating one criterion
///
/// For exclusion criteria `Met` means the excluding condition is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CriterionOutcome {
    Met,
    NotMet,
    Unknown,
}

impl CriterionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CriterionOutcome::Met => "MET",
            CriterionOutcome::NotMet => "NOT_MET",
            CriterionOutcome::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for CriterionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One evaluated eligibility rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    name: String,
    kind: CriterionKind,
    outcome: CriterionOutcome,
    detail: String,
    missing_data: Vec<String>,
}

impl Criterion {
    pub fn met(name: &str, kind: CriterionKind, detail: impl Into<String>) -> Self {
        Self::with_outcome(name, kind, CriterionOutcome::Met, detail)
    }

    pub fn not_met(name: &str, kind: CriterionKind, detail: impl Into<String>) -> Self {
        Self::with_outcome(name, kind, CriterionOutcome::NotMet, detail)
    }

    /// An `Unknown` outcome naming the data element that could not be located
    pub fn unknown(
        name: &str,
        kind: CriterionKind,
        detail: impl Into<String>,
        missing: impl Into<String>,
    ) -> Self {
        let mut criterion = Self::with_outcome(name, kind, CriterionOutcome::Unknown, detail);
        criterion.missing_data.push(missing.into());
        criterion
    }

    fn with_outcome(
        name: &str,
        kind: CriterionKind,
        outcome: CriterionOutcome,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            name: name.to_string(),
            kind,
            outcome,
            detail: detail.into(),
            missing_data: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CriterionKind {
        self.kind
    }

    pub fn outcome(&self) -> CriterionOutcome {
        self.outcome
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Named missing data elements; empty unless the outcome is `Unknown`
    pub fn missing_data(&self) -> &[String] {
        &self.missing_data
    }

    pub fn is_inclusion(&self) -> bool {
        self.kind == CriterionKind::Inclusion
    }
}

/// Overall eligibility of one patient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EligibilityStatus {
    Eligible,
    NotEligible,
    PotentiallyEligible,
}

impl EligibilityStatus {
    /// Label used in the text report
    pub fn label(&self) -> &'static str {
        match self {
            EligibilityStatus::Eligible => "ELIGIBLE",
            EligibilityStatus::NotEligible => "NOT ELIGIBLE",
            EligibilityStatus::PotentiallyEligible => "POTENTIALLY ELIGIBLE - DATA MISSING",
        }
    }
}

impl fmt::Display for EligibilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Assessment under construction; status fields do not exist yet
#[derive(Debug, Clone)]
pub struct PendingAssessment {
    patient_id: PatientId,
    criteria: Vec<Criterion>,
}

impl PendingAssessment {
    pub fn new(patient_id: PatientId) -> Self {
        Self {
            patient_id,
            criteria: Vec::new(),
        }
    }

    pub fn push(&mut self, criterion: Criterion) {
        self.criteria.push(criterion);
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    /// Aggregates the criteria and freezes the assessment
    pub fn finalize(self) -> Assessment {
        let summary = aggregate(&self.criteria);
        Assessment {
            patient_id: self.patient_id,
            criteria: self.criteria,
            summary,
        }
    }
}

/// Finalized, immutable screening outcome for one patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    patient_id: PatientId,
    criteria: Vec<Criterion>,
    #[serde(flatten)]
    summary: StatusSummary,
}

impl Assessment {
    pub fn patient_id(&self) -> &PatientId {
        &self.patient_id
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn inclusion_criteria(&self) -> impl Iterator<Item = &Criterion> {
        self.criteria.iter().filter(|c| c.is_inclusion())
    }

    pub fn exclusion_criteria(&self) -> impl Iterator<Item = &Criterion> {
        self.criteria.iter().filter(|c| !c.is_inclusion())
    }

    pub fn status(&self) -> EligibilityStatus {
        self.summary.status
    }

    pub fn ineligibility_reason(&self) -> Option<&str> {
        self.summary.reason.as_deref()
    }

    pub fn missing_data_elements(&self) -> &[String] {
        &self.summary.missing_data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_carries_missing_data() {
        let criterion = Criterion::unknown(
            "Age ≥18 years",
            CriterionKind::Inclusion,
            "Birth date not available",
            "Patient birth date",
        );
        assert_eq!(criterion.outcome(), CriterionOutcome::Unknown);
        assert_eq!(criterion.missing_data(), ["Patient birth date".to_string()]);
    }

    #[test]
    fn test_met_has_no_missing_data() {
        let criterion = Criterion::met("Age ≥18 years", CriterionKind::Inclusion, "Age: 40 years");
        assert!(criterion.missing_data().is_empty());
        assert!(criterion.is_inclusion());
        assert_eq!(criterion.detail(), "Age: 40 years");
    }

    #[test]
    fn test_finalize_runs_aggregation() {
        let mut pending = PendingAssessment::new(PatientId::new("7").unwrap());
        pending.push(Criterion::not_met(
            "Age ≥18 years",
            CriterionKind::Inclusion,
            "Age: 12 years (under 18)",
        ));
        let assessment = pending.finalize();

        assert_eq!(assessment.status(), EligibilityStatus::NotEligible);
        assert_eq!(
            assessment.ineligibility_reason(),
            Some("Inclusion criterion not met: Age ≥18 years")
        );
        assert_eq!(assessment.criteria().len(), 1);
    }

    #[test]
    fn test_outcome_serializes_screaming_case() {
        let json = serde_json::to_string(&CriterionOutcome::NotMet).unwrap();
        assert_eq!(json, "\"NOT_MET\"");
        let json = serde_json::to_string(&EligibilityStatus::PotentiallyEligible).unwrap();
        assert_eq!(json, "\"POTENTIALLY_ELIGIBLE\"");
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(EligibilityStatus::Eligible.to_string(), "ELIGIBLE");
        assert_eq!(
            EligibilityStatus::PotentiallyEligible.label(),
            "POTENTIALLY ELIGIBLE - DATA MISSING"
        );
    }
}
