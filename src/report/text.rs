//! Plain-text screening report

use super::{missing_data_frequency, StatusCounts, TrialMetadata, NO_PATIENTS_MESSAGE};
use crate::domain::criteria::{Assessment, Criterion, CriterionOutcome};

const SEPARATOR: &str =
    "================================================================================";
const SUB_SEPARATOR: &str =
    "--------------------------------------------------------------------------------";

/// Render the full text report
pub fn render(assessments: &[Assessment], trial: &TrialMetadata) -> String {
    if assessments.is_empty() {
        return NO_PATIENTS_MESSAGE.to_string();
    }

    let mut report = String::new();

    report.push_str(&format!("{SEPARATOR}\n"));
    report.push_str("CLINICAL TRIAL ELIGIBILITY SCREENING REPORT\n");
    report.push_str(&format!("Trial: {}\n", trial.name));
    report.push_str(&format!(
        "Date: {}\n",
        trial.screening_date.format("%Y-%m-%d")
    ));
    report.push_str(&format!("{SEPARATOR}\n\n"));

    report.push_str("PATIENT SCREENING RESULTS\n");
    report.push_str(&format!("{SUB_SEPARATOR}\n\n"));

    for assessment in assessments {
        report.push_str(&format_assessment(assessment));
        report.push_str(&format!("\n{SUB_SEPARATOR}\n\n"));
    }

    report.push_str(&format_summary(assessments));
    report.push('\n');
    report.push_str(&format_missing_data(assessments));
    report.push_str(&format!("{SEPARATOR}\n"));

    report
}

fn format_assessment(assessment: &Assessment) -> String {
    let mut block = String::new();

    block.push_str(&format!("Patient ID: {}\n", assessment.patient_id()));
    block.push_str(&format!("Overall Status: {}", assessment.status().label()));
    if let Some(reason) = assessment.ineligibility_reason().filter(|r| !r.is_empty()) {
        block.push_str(&format!("\nReason: {reason}"));
    }
    block.push_str("\n\n");

    let inclusion: Vec<&Criterion> = assessment.inclusion_criteria().collect();
    if !inclusion.is_empty() {
        block.push_str("Inclusion Criteria:\n");
        for criterion in inclusion {
            block.push_str(&format_criterion(criterion));
        }
        block.push('\n');
    }

    let exclusion: Vec<&Criterion> = assessment.exclusion_criteria().collect();
    if !exclusion.is_empty() {
        block.push_str("Exclusion Criteria:\n");
        for criterion in exclusion {
            block.push_str(&format_criterion(criterion));
        }
        block.push('\n');
    }

    let missing = assessment.missing_data_elements();
    if !missing.is_empty() {
        block.push_str(&format!("Missing Data: {}\n", missing.join(", ")));
    }

    block
}

fn format_criterion(criterion: &Criterion) -> String {
    let mut line = format!(
        "  {} {}: {}",
        symbol(criterion.outcome()),
        criterion.name(),
        criterion.outcome()
    );
    if !criterion.detail().is_empty() {
        line.push_str(&format!(" ({})", criterion.detail()));
    }
    line.push('\n');
    line
}

fn symbol(outcome: CriterionOutcome) -> &'static str {
    match outcome {
        CriterionOutcome::Met => "✓",
        CriterionOutcome::NotMet => "✗",
        CriterionOutcome::Unknown => "?",
    }
}

fn format_summary(assessments: &[Assessment]) -> String {
    let counts = StatusCounts::from_assessments(assessments);
    let mut summary = String::new();

    summary.push_str(&format!("{SEPARATOR}\nSUMMARY\n{SEPARATOR}\n\n"));
    summary.push_str(&format!("Total Patients Screened: {}\n", counts.total));
    summary.push_str(&format!("  - Eligible: {}\n", counts.eligible));
    summary.push_str(&format!("  - Not Eligible: {}\n", counts.not_eligible));
    summary.push_str(&format!(
        "  - Potentially Eligible (Data Missing): {}\n",
        counts.potentially_eligible
    ));

    summary
}

fn format_missing_data(assessments: &[Assessment]) -> String {
    let frequency = missing_data_frequency(assessments);
    if frequency.is_empty() {
        return String::new();
    }

    let mut section = String::from("\nCommon Missing Data Elements:\n");
    for (element, count) in frequency {
        let noun = if count == 1 { "patient" } else { "patients" };
        section.push_str(&format!("  - {element}: {count} {noun}\n"));
    }
    section
}
