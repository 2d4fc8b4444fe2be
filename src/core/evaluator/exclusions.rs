//! Exclusion criteria: prior systemic therapy and active brain metastases

use super::codes::{
    ACTIVE_STATUS_CODES, ADVANCED_DISEASE_REASONS, BRAIN_METASTASES_TERMS, BRAIN_PROCEDURE_TERMS,
    CHEMOTHERAPY_AGENTS, GENERIC_THERAPY_TERMS, IMMUNOTHERAPY_AGENTS, SNOMED_BRAIN_METASTASES,
    TARGETED_AGENTS,
};
use super::names;
use crate::config::MissingMedicationPolicy;
use crate::domain::criteria::{Criterion, CriterionKind};
use crate::domain::record::PatientRecord;
use crate::domain::resources::{Condition, MedicationStatement, Procedure};
use chrono::NaiveDate;

pub(super) fn evaluate_prior_therapy(
    record: &PatientRecord,
    policy: MissingMedicationPolicy,
) -> Criterion {
    let medications = record.medications();
    if medications.is_empty() {
        return match policy {
            MissingMedicationPolicy::Unknown => Criterion::unknown(
                names::PRIOR_THERAPY,
                CriterionKind::Exclusion,
                "Medication history not available",
                "Medication history",
            ),
            MissingMedicationPolicy::AssumeNoTherapy => Criterion::met(
                names::PRIOR_THERAPY,
                CriterionKind::Exclusion,
                "No medication history available (assumed no prior therapy)",
            ),
        };
    }

    let prior = medications
        .iter()
        .find(|m| is_systemic_therapy(m) && indicates_advanced_disease(m));

    match prior {
        Some(medication) => {
            let name = medication
                .medication_codeable_concept
                .as_ref()
                .and_then(|c| c.label())
                .unwrap_or("Unknown medication");
            Criterion::not_met(
                names::PRIOR_THERAPY,
                CriterionKind::Exclusion,
                format!("Prior systemic therapy found: {name}"),
            )
        }
        None => Criterion::met(
            names::PRIOR_THERAPY,
            CriterionKind::Exclusion,
            "No prior systemic therapy for advanced disease found",
        ),
    }
}

fn is_systemic_therapy(medication: &MedicationStatement) -> bool {
    let Some(concept) = medication.medication_codeable_concept.as_ref() else {
        return false;
    };
    [
        CHEMOTHERAPY_AGENTS,
        IMMUNOTHERAPY_AGENTS,
        TARGETED_AGENTS,
        GENERIC_THERAPY_TERMS,
    ]
    .iter()
    .any(|terms| concept.mentions_any(terms))
}

/// Systemic therapy counts as given for advanced disease
///
/// A reason such as "metastatic" confirms it; without one the therapy is
/// still assumed to target advanced disease.
fn indicates_advanced_disease(medication: &MedicationStatement) -> bool {
    let confirmed = medication
        .reason_code
        .iter()
        .any(|reason| reason.mentions_any(ADVANCED_DISEASE_REASONS));
    tracing::debug!(
        medication_id = medication.id.as_deref().unwrap_or("-"),
        confirmed_by_reason = confirmed,
        "Systemic therapy attributed to advanced disease"
    );
    true
}

pub(super) fn evaluate_brain_metastases(
    record: &PatientRecord,
    today: NaiveDate,
    procedure_recency_days: u32,
) -> Criterion {
    let conditions = record.conditions();
    let procedures = record.procedures();

    if conditions.is_empty() && procedures.is_empty() {
        return Criterion::unknown(
            names::BRAIN_METASTASES,
            CriterionKind::Exclusion,
            "Condition and procedure data not available",
            "Brain metastases information",
        );
    }

    if conditions
        .iter()
        .any(|c| is_brain_metastases(c) && is_active(c))
    {
        return Criterion::not_met(
            names::BRAIN_METASTASES,
            CriterionKind::Exclusion,
            "Active brain metastases found",
        );
    }

    let recent_treatment = procedures.iter().find(|p| {
        is_brain_metastases_procedure(p) && is_recent_procedure(p, today, procedure_recency_days)
    });
    if let Some(procedure) = recent_treatment {
        let name = procedure
            .code
            .as_ref()
            .and_then(|c| c.label())
            .unwrap_or("Unknown procedure");
        return Criterion::not_met(
            names::BRAIN_METASTASES,
            CriterionKind::Exclusion,
            format!("Recent brain metastases treatment found: {name}"),
        );
    }

    Criterion::met(
        names::BRAIN_METASTASES,
        CriterionKind::Exclusion,
        "No active brain metastases found",
    )
}

fn is_brain_metastases(condition: &Condition) -> bool {
    condition
        .code
        .as_ref()
        .map(|code| {
            code.has_any_code(&[SNOMED_BRAIN_METASTASES]) || code.mentions_any(BRAIN_METASTASES_TERMS)
        })
        .unwrap_or(false)
}

/// A condition without a clinical status is treated as active
fn is_active(condition: &Condition) -> bool {
    match condition.clinical_status.as_ref() {
        None => true,
        Some(status) => status
            .coding
            .iter()
            .filter_map(|c| c.code.as_deref())
            .any(|code| {
                ACTIVE_STATUS_CODES
                    .iter()
                    .any(|active| code.eq_ignore_ascii_case(active))
            }),
    }
}

fn is_brain_metastases_procedure(procedure: &Procedure) -> bool {
    let Some(code) = procedure.code.as_ref() else {
        return false;
    };
    let text = code.searchable_text();
    if BRAIN_PROCEDURE_TERMS.iter().any(|term| text.contains(term)) {
        return true;
    }
    let site = ["brain", "cranial", "cerebral"]
        .iter()
        .any(|t| text.contains(t));
    site && text.contains("met")
}

/// A procedure without a performed date is treated as recent
fn is_recent_procedure(procedure: &Procedure, today: NaiveDate, window_days: u32) -> bool {
    match procedure.performed_on() {
        None => true,
        Some(date) => {
            let age = (today - date).num_days();
            (0..=i64::from(window_days)).contains(&age)
        }
    }
}
