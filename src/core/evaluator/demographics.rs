//! Age inclusion criterion

use super::names;
use crate::domain::criteria::{Criterion, CriterionKind};
use crate::domain::record::PatientRecord;
use chrono::{Datelike, NaiveDate};

const MINIMUM_AGE: i32 = 18;

pub(super) fn evaluate_age(record: &PatientRecord, today: NaiveDate) -> Criterion {
    let Some(birth_date) = record.birth_date() else {
        return Criterion::unknown(
            names::AGE,
            CriterionKind::Inclusion,
            "Birth date not available",
            "Patient birth date",
        );
    };

    let age = whole_years_between(birth_date, today);
    if age >= MINIMUM_AGE {
        Criterion::met(names::AGE, CriterionKind::Inclusion, format!("Age: {age} years"))
    } else {
        Criterion::not_met(
            names::AGE,
            CriterionKind::Inclusion,
            format!("Age: {age} years (under {MINIMUM_AGE})"),
        )
    }
}

/// Completed years from `from` to `to`; negative when `from` is later
pub(super) fn whole_years_between(from: NaiveDate, to: NaiveDate) -> i32 {
    let mut years = to.year() - from.year();
    if (to.month(), to.day()) < (from.month(), from.day()) {
        years -= 1;
    }
    years
}
