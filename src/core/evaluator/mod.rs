//! Criteria evaluator
//!
//! Applies the nine trial criteria to an assembled [`PatientRecord`]. Every
//! criterion is independent and the output order is fixed: the seven
//! inclusion criteria, then the two exclusion criteria.
//!
//! Evaluation is a pure function of the record and the evaluator's reference
//! date, so the same record always yields the same criteria.
//!
//! ```rust,no_run
//! use trial_screener::config::ScreeningConfig;
//! use trial_screener::core::evaluator::CriteriaEvaluator;
//! # fn example(record: trial_screener::domain::PatientRecord) -> trial_screener::domain::Result<()> {
//! let evaluator = CriteriaEvaluator::new(&ScreeningConfig::default())?;
//! let assessment = evaluator.assess(&record);
//! println!("{}", assessment.status().label());
//! # Ok(())
//! # }
//! ```

mod codes;
mod demographics;
mod diagnosis;
mod exclusions;
mod labs;
mod performance;

pub use codes::{
    LOINC_ECOG, LOINC_HEMOGLOBIN, LOINC_NEUTROPHILS, LOINC_PLATELETS, SNOMED_BRAIN_METASTASES,
    SNOMED_LUNG_CANCER, SNOMED_NSCLC,
};

use crate::config::{MissingMedicationPolicy, ScreeningConfig};
use crate::domain::criteria::{Assessment, Criterion, PendingAssessment};
use crate::domain::record::PatientRecord;
use crate::domain::result::Result;
use chrono::{NaiveDate, Utc};
use diagnosis::StagePatterns;

/// Criterion names as they appear in assessments and reports
pub mod names {
    pub const AGE: &str = "Age ≥18 years";
    pub const DIAGNOSIS: &str = "NSCLC Diagnosis";
    pub const STAGE: &str = "Stage IIIB/IV Disease";
    pub const ECOG: &str = "ECOG Performance Status 0-2";
    pub const HEMOGLOBIN: &str = "Hemoglobin ≥9.0 g/dL";
    pub const NEUTROPHILS: &str = "Absolute Neutrophil Count ≥1,500/µL";
    pub const PLATELETS: &str = "Platelet Count ≥100,000/µL";
    pub const PRIOR_THERAPY: &str = "No Prior Therapy";
    pub const BRAIN_METASTASES: &str = "No Active Brain Metastases";

    /// Every criterion in evaluation order
    pub const ALL: [&str; 9] = [
        AGE,
        DIAGNOSIS,
        STAGE,
        ECOG,
        HEMOGLOBIN,
        NEUTROPHILS,
        PLATELETS,
        PRIOR_THERAPY,
        BRAIN_METASTASES,
    ];
}

/// Evaluates eligibility criteria against patient records
#[derive(Debug, Clone)]
pub struct CriteriaEvaluator {
    lab_recency_days: u32,
    procedure_recency_days: u32,
    missing_medication_policy: MissingMedicationPolicy,
    reference_date: NaiveDate,
    stage_patterns: StagePatterns,
}

impl CriteriaEvaluator {
    /// Creates an evaluator dated today (UTC)
    ///
    /// # Errors
    ///
    /// Returns `ScreenerError::Configuration` if a stage pattern fails to compile.
    pub fn new(config: &ScreeningConfig) -> Result<Self> {
        Ok(Self {
            lab_recency_days: config.lab_recency_days,
            procedure_recency_days: config.procedure_recency_days,
            missing_medication_policy: config.missing_medication_policy,
            reference_date: Utc::now().date_naive(),
            stage_patterns: StagePatterns::new()?,
        })
    }

    /// Pins the date ages and recency windows are measured against
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = date;
        self
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    /// Evaluates all nine criteria in their fixed order
    pub fn evaluate(&self, record: &PatientRecord) -> Vec<Criterion> {
        let today = self.reference_date;
        vec![
            demographics::evaluate_age(record, today),
            diagnosis::evaluate_diagnosis(record),
            diagnosis::evaluate_stage(record, &self.stage_patterns),
            performance::evaluate_ecog(record),
            labs::evaluate_lab(record, &labs::HEMOGLOBIN, today, self.lab_recency_days),
            labs::evaluate_lab(record, &labs::NEUTROPHILS, today, self.lab_recency_days),
            labs::evaluate_lab(record, &labs::PLATELETS, today, self.lab_recency_days),
            exclusions::evaluate_prior_therapy(record, self.missing_medication_policy),
            exclusions::evaluate_brain_metastases(record, today, self.procedure_recency_days),
        ]
    }

    /// Evaluates the record and aggregates the result into an assessment
    pub fn assess(&self, record: &PatientRecord) -> Assessment {
        let mut pending = PendingAssessment::new(record.patient_id().clone());
        for criterion in self.evaluate(record) {
            pending.push(criterion);
        }

        let assessment = pending.finalize();
        tracing::debug!(
            patient_id = %assessment.patient_id(),
            status = assessment.status().label(),
            "Patient assessed"
        );
        assessment
    }
}
