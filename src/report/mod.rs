//! Report rendering
//!
//! Turns finished assessments into a human-readable text report or a JSON
//! document. Rendering is pure formatting and never looks at the FHIR server.
//!
//! ```rust
//! use trial_screener::report::{render, ReportFormat, TrialMetadata};
//!
//! let trial = TrialMetadata::new("Phase II Advanced NSCLC Study", chrono::Utc::now().date_naive());
//! let report = render(&[], &trial, ReportFormat::Text).unwrap();
//! assert_eq!(report, "No patients assessed.");
//! ```

pub mod json;
pub mod text;

use crate::domain::criteria::{Assessment, EligibilityStatus};
use crate::domain::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Message rendered when there is nothing to report
pub const NO_PATIENTS_MESSAGE: &str = "No patients assessed.";

/// Output format of the screening report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            _ => Err(format!("Invalid report format: {s}. Must be 'text' or 'json'")),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

/// Trial details printed in the report header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialMetadata {
    pub name: String,
    pub screening_date: NaiveDate,
}

impl TrialMetadata {
    pub fn new(name: impl Into<String>, screening_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            screening_date,
        }
    }
}

/// Render assessments in the requested format
///
/// # Errors
///
/// Returns `ScreenerError::Serialization` if the JSON document cannot be encoded.
pub fn render(
    assessments: &[Assessment],
    trial: &TrialMetadata,
    format: ReportFormat,
) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(text::render(assessments, trial)),
        ReportFormat::Json => json::render(assessments, trial),
    }
}

/// Status counts over a set of assessments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub eligible: usize,
    pub not_eligible: usize,
    pub potentially_eligible: usize,
}

impl StatusCounts {
    pub fn from_assessments(assessments: &[Assessment]) -> Self {
        let mut counts = Self {
            total: assessments.len(),
            ..Self::default()
        };
        for assessment in assessments {
            match assessment.status() {
                EligibilityStatus::Eligible => counts.eligible += 1,
                EligibilityStatus::NotEligible => counts.not_eligible += 1,
                EligibilityStatus::PotentiallyEligible => counts.potentially_eligible += 1,
            }
        }
        counts
    }
}

/// How many patients name each missing data element, most frequent first
///
/// Ties are ordered by element name.
pub fn missing_data_frequency(assessments: &[Assessment]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for element in assessments.iter().flat_map(|a| a.missing_data_elements()) {
        *counts.entry(element.as_str()).or_default() += 1;
    }

    let mut frequency: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(element, count)| (element.to_string(), count))
        .collect();
    frequency.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    frequency
}
