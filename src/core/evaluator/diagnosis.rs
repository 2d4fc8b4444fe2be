//! Diagnosis and disease stage inclusion criteria

use super::codes::{LUNG_CANCER_CODES, NSCLC_TERMS};
use super::names;
use crate::domain::criteria::{Criterion, CriterionKind};
use crate::domain::errors::ScreenerError;
use crate::domain::record::PatientRecord;
use crate::domain::resources::Condition;
use crate::domain::result::Result;
use regex::Regex;

/// Compiled stage patterns
///
/// Advanced-stage matching is an unanchored search, so "Stage IVA" and
/// "metastatic NSCLC" both count.
#[derive(Debug, Clone)]
pub(super) struct StagePatterns {
    stage_iiib: Regex,
    stage_iv: Regex,
    stage_in_text: Regex,
}

impl StagePatterns {
    pub(super) fn new() -> Result<Self> {
        Ok(Self {
            stage_iiib: compile(r"(?i)(stage\s*)?(IIIB|3B|three\s*B)")?,
            stage_iv: compile(r"(?i)(stage\s*)?(IV|4|four|metastatic)")?,
            stage_in_text: compile(r"(?i)stage\s*([IV]+|[0-4])([A-C])?")?,
        })
    }

    pub(super) fn is_advanced(&self, stage: &str) -> bool {
        self.stage_iiib.is_match(stage) || self.stage_iv.is_match(stage)
    }

    /// Stage string for a condition: the first stage summary, else a
    /// "stage ..." phrase inside the diagnosis text
    pub(super) fn extract(&self, condition: &Condition) -> Option<String> {
        let structured = condition
            .stage
            .first()
            .and_then(|stage| stage.summary.as_ref())
            .and_then(|summary| summary.label());
        if let Some(stage) = structured {
            return Some(stage.to_string());
        }

        let code = condition.code.as_ref()?;
        code.text
            .iter()
            .chain(code.coding.iter().filter_map(|c| c.display.as_ref()))
            .find_map(|text| self.stage_in_text.find(text))
            .map(|m| m.as_str().to_string())
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| ScreenerError::Configuration(format!("Invalid stage pattern: {e}")))
}

/// True if the condition is coded or described as NSCLC
///
/// Staging reads only these conditions, so a stage on another cancer
/// never counts.
pub(super) fn is_nsclc(condition: &Condition) -> bool {
    condition
        .code
        .as_ref()
        .map(|code| code.has_any_code(LUNG_CANCER_CODES) || code.mentions_any(NSCLC_TERMS))
        .unwrap_or(false)
}

pub(super) fn evaluate_diagnosis(record: &PatientRecord) -> Criterion {
    let conditions = record.conditions();
    if conditions.is_empty() {
        return Criterion::unknown(
            names::DIAGNOSIS,
            CriterionKind::Inclusion,
            "No condition data available",
            "Condition/diagnosis information",
        );
    }

    match conditions.iter().find(|c| is_nsclc(c)) {
        Some(condition) => {
            let label = condition
                .code
                .as_ref()
                .and_then(|code| code.label())
                .unwrap_or("Non-small cell lung cancer");
            Criterion::met(
                names::DIAGNOSIS,
                CriterionKind::Inclusion,
                format!("Confirmed NSCLC: {label}"),
            )
        }
        None => Criterion::not_met(
            names::DIAGNOSIS,
            CriterionKind::Inclusion,
            "No NSCLC diagnosis found in patient records",
        ),
    }
}

pub(super) fn evaluate_stage(record: &PatientRecord, patterns: &StagePatterns) -> Criterion {
    let mut nsclc = record.conditions().iter().filter(|c| is_nsclc(c)).peekable();

    if nsclc.peek().is_none() {
        return Criterion::unknown(
            names::STAGE,
            CriterionKind::Inclusion,
            "No NSCLC conditions found for staging",
            "Disease staging information",
        );
    }

    // The first NSCLC condition with a readable stage decides
    match nsclc.find_map(|c| patterns.extract(c)) {
        Some(stage) if patterns.is_advanced(&stage) => Criterion::met(
            names::STAGE,
            CriterionKind::Inclusion,
            format!("Stage: {stage}"),
        ),
        Some(stage) => Criterion::not_met(
            names::STAGE,
            CriterionKind::Inclusion,
            format!("Stage: {stage} (requires Stage IIIB or IV)"),
        ),
        None => Criterion::unknown(
            names::STAGE,
            CriterionKind::Inclusion,
            "Staging information not available",
            "Disease stage",
        ),
    }
}
