//! Screening run summary

use crate::core::screening::scheduler::DroppedUnit;
use crate::domain::criteria::{Assessment, EligibilityStatus};
use std::time::Duration;
use uuid::Uuid;

/// Result of one screening run
#[derive(Debug)]
pub struct ScreeningSummary {
    /// Identifier attached to the run's log lines
    pub run_id: Uuid,

    /// Number of candidate patients found by discovery
    pub candidates: usize,

    /// Finished assessments, in completion order
    pub assessments: Vec<Assessment>,

    /// Candidates whose unit failed
    pub dropped: Vec<DroppedUnit>,

    pub duration: Duration,
}

impl ScreeningSummary {
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            candidates: 0,
            assessments: Vec::new(),
            dropped: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// True when discovery found nobody to screen
    pub fn has_no_candidates(&self) -> bool {
        self.candidates == 0
    }

    /// Number of assessments with the given status
    pub fn count(&self, status: EligibilityStatus) -> usize {
        self.assessments
            .iter()
            .filter(|a| a.status() == status)
            .count()
    }

    pub fn eligible(&self) -> usize {
        self.count(EligibilityStatus::Eligible)
    }

    pub fn not_eligible(&self) -> usize {
        self.count(EligibilityStatus::NotEligible)
    }

    pub fn potentially_eligible(&self) -> usize {
        self.count(EligibilityStatus::PotentiallyEligible)
    }

    /// True if every candidate produced an assessment
    pub fn is_complete(&self) -> bool {
        self.dropped.is_empty()
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            run_id = %self.run_id,
            candidates = self.candidates,
            assessed = self.assessments.len(),
            eligible = self.eligible(),
            not_eligible = self.not_eligible(),
            potentially_eligible = self.potentially_eligible(),
            dropped = self.dropped.len(),
            duration_ms = self.duration.as_millis() as u64,
            "Screening run summary"
        );

        for unit in &self.dropped {
            tracing::warn!(
                run_id = %self.run_id,
                patient_id = %unit.patient_id,
                reason = %unit.reason,
                "Patient missing from report"
            );
        }
    }
}
