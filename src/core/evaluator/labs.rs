//! Laboratory threshold inclusion criteria
//!
//! Hemoglobin, absolute neutrophil count and platelet count share one
//! evaluation path parameterized by a [`LabRule`]: locate the latest result,
//! check it is recent enough, normalize the unit, then compare.

use super::codes::{LOINC_HEMOGLOBIN, LOINC_NEUTROPHILS, LOINC_PLATELETS};
use super::names;
use crate::domain::criteria::{Criterion, CriterionKind};
use crate::domain::record::PatientRecord;
use crate::domain::resources::{Observation, Quantity};
use chrono::NaiveDate;

/// Unit normalization applied before the threshold comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum UnitScaling {
    /// g/L becomes g/dL
    GramsPerDeciliter,
    /// Explicit thousands units are expanded
    Thousands,
    /// Thousands units are expanded; a unitless value below 1,000 is assumed to be in thousands
    ThousandsOrUnitless,
}

/// One lab threshold criterion
#[derive(Debug, Clone, Copy)]
pub(super) struct LabRule {
    pub name: &'static str,
    pub loinc: &'static str,
    /// Detail prefix, e.g. "Hemoglobin"
    pub label: &'static str,
    pub threshold: f64,
    pub scaling: UnitScaling,
    /// Decimal places printed for the value
    pub precision: usize,
    /// Unit printed after the value
    pub unit: &'static str,
    /// Threshold as printed in a NotMet detail
    pub requirement: &'static str,
    pub missing_result: &'static str,
    pub missing_value: &'static str,
    pub missing_recent: &'static str,
}

pub(super) const HEMOGLOBIN: LabRule = LabRule {
    name: names::HEMOGLOBIN,
    loinc: LOINC_HEMOGLOBIN,
    label: "Hemoglobin",
    threshold: 9.0,
    scaling: UnitScaling::GramsPerDeciliter,
    precision: 1,
    unit: " g/dL",
    requirement: "≥9.0",
    missing_result: "Hemoglobin lab result",
    missing_value: "Hemoglobin value",
    missing_recent: "Recent hemoglobin lab result",
};

pub(super) const NEUTROPHILS: LabRule = LabRule {
    name: names::NEUTROPHILS,
    loinc: LOINC_NEUTROPHILS,
    label: "Neutrophil count",
    threshold: 1_500.0,
    scaling: UnitScaling::Thousands,
    precision: 0,
    unit: "/µL",
    requirement: "≥1,500",
    missing_result: "Absolute neutrophil count lab result",
    missing_value: "Neutrophil count value",
    missing_recent: "Recent neutrophil count lab result",
};

pub(super) const PLATELETS: LabRule = LabRule {
    name: names::PLATELETS,
    loinc: LOINC_PLATELETS,
    label: "Platelet count",
    threshold: 100_000.0,
    scaling: UnitScaling::ThousandsOrUnitless,
    precision: 0,
    unit: "/µL",
    requirement: "≥100,000",
    missing_result: "Platelet count lab result",
    missing_value: "Platelet count value",
    missing_recent: "Recent platelet count lab result",
};

const THOUSANDS_UNITS: &[&str] = &[
    "10*3", "10^3", "k/ul", "x10^3", "thou", "10*9/l", "10^9/l",
];

/// Values below this with no unit are read as thousands
const UNITLESS_THOUSANDS_CEILING: f64 = 1_000.0;

pub(super) fn evaluate_lab(
    record: &PatientRecord,
    rule: &LabRule,
    today: NaiveDate,
    recency_days: u32,
) -> Criterion {
    let Some(observation) = record.latest_observation(rule.loinc) else {
        return Criterion::unknown(
            rule.name,
            CriterionKind::Inclusion,
            format!("{} result not available", rule.label),
            rule.missing_result,
        );
    };

    let observed_on = observation.recorded_at().map(|at| at.date_naive());
    if !is_recent(observed_on, today, recency_days) {
        return Criterion::unknown(
            rule.name,
            CriterionKind::Inclusion,
            format!("{} result is older than {recency_days} days", rule.label),
            rule.missing_recent,
        );
    }

    let Some(value) = normalized_value(observation, rule.scaling) else {
        return Criterion::unknown(
            rule.name,
            CriterionKind::Inclusion,
            format!("{} value could not be extracted", rule.label),
            rule.missing_value,
        );
    };

    let date = observed_on
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unknown date".to_string());
    let detail = format!(
        "{}: {:.*}{} on {}",
        rule.label, rule.precision, value, rule.unit, date
    );

    if value >= rule.threshold {
        Criterion::met(rule.name, CriterionKind::Inclusion, detail)
    } else {
        Criterion::not_met(
            rule.name,
            CriterionKind::Inclusion,
            format!("{detail} (requires {})", rule.requirement),
        )
    }
}

/// A window of zero disables the check; results dated after `today` never count
fn is_recent(observed_on: Option<NaiveDate>, today: NaiveDate, recency_days: u32) -> bool {
    if recency_days == 0 {
        return true;
    }
    match observed_on {
        Some(date) => {
            let age = (today - date).num_days();
            (0..=i64::from(recency_days)).contains(&age)
        }
        None => false,
    }
}

fn normalized_value(observation: &Observation, scaling: UnitScaling) -> Option<f64> {
    let quantity = observation.value_quantity.as_ref()?;
    let value = quantity.value.filter(|v| v.is_finite())?;
    Some(scale(value, quantity, scaling))
}

fn scale(value: f64, quantity: &Quantity, scaling: UnitScaling) -> f64 {
    let unit = quantity.unit_label();
    match scaling {
        UnitScaling::GramsPerDeciliter => match unit {
            Some(u) if u.trim().eq_ignore_ascii_case("g/L") => value / 10.0,
            _ => value,
        },
        UnitScaling::Thousands => match unit {
            Some(u) if is_thousands_unit(u) => value * 1_000.0,
            _ => value,
        },
        UnitScaling::ThousandsOrUnitless => match unit {
            Some(u) if is_thousands_unit(u) => value * 1_000.0,
            None if value < UNITLESS_THOUSANDS_CEILING => value * 1_000.0,
            _ => value,
        },
    }
}

fn is_thousands_unit(unit: &str) -> bool {
    let unit: String = unit
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    THOUSANDS_UNITS.iter().any(|u| unit.contains(u))
}
