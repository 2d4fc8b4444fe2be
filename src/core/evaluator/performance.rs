//! ECOG performance status inclusion criterion

use super::codes::LOINC_ECOG;
use super::names;
use crate::domain::criteria::{Criterion, CriterionKind};
use crate::domain::record::PatientRecord;
use crate::domain::resources::Observation;

pub(super) fn evaluate_ecog(record: &PatientRecord) -> Criterion {
    let Some(observation) = record.latest_observation(LOINC_ECOG) else {
        return Criterion::unknown(
            names::ECOG,
            CriterionKind::Inclusion,
            "ECOG performance status not recorded",
            "ECOG performance status",
        );
    };

    let Some(score) = ecog_score(observation) else {
        return Criterion::unknown(
            names::ECOG,
            CriterionKind::Inclusion,
            "ECOG value could not be extracted",
            "ECOG performance status value",
        );
    };

    match score {
        0..=2 => Criterion::met(names::ECOG, CriterionKind::Inclusion, format!("ECOG: {score}")),
        3..=5 => Criterion::not_met(
            names::ECOG,
            CriterionKind::Inclusion,
            format!("ECOG: {score} (requires 0-2)"),
        ),
        _ => Criterion::unknown(
            names::ECOG,
            CriterionKind::Inclusion,
            format!("ECOG: {score} (invalid value)"),
            "ECOG performance status value",
        ),
    }
}

/// valueInteger, else the first coding in valueCodeableConcept with an integer code
fn ecog_score(observation: &Observation) -> Option<i64> {
    observation.value_integer.or_else(|| {
        observation
            .value_codeable_concept
            .as_ref()?
            .coding
            .iter()
            .filter_map(|c| c.code.as_deref())
            .find_map(|code| code.trim().parse().ok())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::resources::{CodeableConcept, Coding};

    #[test]
    fn test_ecog_score_sources() {
        let direct = Observation {
            value_integer: Some(1),
            ..Default::default()
        };
        assert_eq!(ecog_score(&direct), Some(1));

        let coded = Observation {
            value_codeable_concept: Some(CodeableConcept {
                coding: vec![
                    Coding::new("http://loinc.org", "LA9622-7"),
                    Coding::new("http://example.org/ecog", "2"),
                ],
                text: None,
            }),
            ..Default::default()
        };
        assert_eq!(ecog_score(&coded), Some(2));

        assert_eq!(ecog_score(&Observation::default()), None);
    }
}
