//! Patient record assembler
//!
//! Issues the five per-patient fetches concurrently and merges them into one
//! [`PatientRecord`]. Each fetch is best-effort: a failure leaves that part
//! of the record empty.

use crate::adapters::fhir::SearchQuery;
use crate::core::fetch::ResilientFetcher;
use crate::domain::ids::PatientId;
use crate::domain::record::PatientRecord;
use crate::domain::resources::{
    Condition, FromResource, MedicationStatement, Observation, Patient, Procedure, ResourceType,
};
use crate::domain::result::Result;
use std::collections::HashSet;

const PAGE_SIZE: usize = 100;
const VITALS_PAGE_SIZE: usize = 50;

/// Below this many observations an unfiltered search is merged in
const MIN_OBSERVATIONS: usize = 10;

/// Below this many medication statements an unfiltered search is merged in
const MIN_MEDICATIONS: usize = 5;

/// Builds patient records from the FHIR server
#[derive(Clone)]
pub struct RecordAssembler {
    fetcher: ResilientFetcher,
}

impl RecordAssembler {
    pub fn new(fetcher: ResilientFetcher) -> Self {
        Self { fetcher }
    }

    /// Fetches everything the evaluator needs for one patient
    ///
    /// Retrieval failures never fail this call; they show up as missing
    /// data in the record.
    ///
    /// # Errors
    ///
    /// Only on a record precondition violation (`ScreenerError::InvalidInput`).
    pub async fn assemble(&self, patient_id: &PatientId) -> Result<PatientRecord> {
        tracing::debug!(patient_id = %patient_id, "Assembling patient record");

        let (demographics, conditions, observations, medications, procedures) = tokio::join!(
            self.fetcher.read::<Patient>(patient_id.as_str()),
            self.conditions(patient_id),
            self.observations(patient_id),
            self.medications(patient_id),
            self.procedures(patient_id),
        );

        tracing::debug!(
            patient_id = %patient_id,
            has_demographics = demographics.is_some(),
            conditions = conditions.len(),
            observations = observations.len(),
            medications = medications.len(),
            procedures = procedures.len(),
            "Patient record assembled"
        );

        PatientRecord::builder()
            .patient_id(patient_id.clone())
            .demographics(demographics)
            .conditions(conditions)
            .observations(observations)
            .medications(medications)
            .procedures(procedures)
            .build()
    }

    async fn conditions(&self, patient_id: &PatientId) -> Vec<Condition> {
        let query = patient_query(ResourceType::Condition, patient_id)
            .param("_sort", "-onset-date")
            .page_size(PAGE_SIZE);
        self.fetcher.search_all(&query).await
    }

    async fn observations(&self, patient_id: &PatientId) -> Vec<Observation> {
        let labs = patient_query(ResourceType::Observation, patient_id)
            .param("category", "laboratory")
            .param("_sort", "-date")
            .page_size(PAGE_SIZE);
        let vitals = patient_query(ResourceType::Observation, patient_id)
            .param("category", "vital-signs,exam,survey")
            .param("_sort", "-date")
            .page_size(VITALS_PAGE_SIZE);

        let mut observations: Vec<Observation> = self.fetcher.search_all(&labs).await;
        observations.extend(self.fetcher.search_all::<Observation>(&vitals).await);

        if observations.len() < MIN_OBSERVATIONS {
            let unfiltered = patient_query(ResourceType::Observation, patient_id)
                .param("_sort", "-date")
                .page_size(PAGE_SIZE);
            let extra = self.fetcher.search_all(&unfiltered).await;
            merge_by_id(&mut observations, extra);
        }

        observations
    }

    async fn medications(&self, patient_id: &PatientId) -> Vec<MedicationStatement> {
        let filtered = patient_query(ResourceType::MedicationStatement, patient_id)
            .param("status", "active,completed,intended,on-hold")
            .page_size(PAGE_SIZE);

        let mut medications: Vec<MedicationStatement> = self.fetcher.search_all(&filtered).await;

        if medications.len() < MIN_MEDICATIONS {
            let unfiltered =
                patient_query(ResourceType::MedicationStatement, patient_id).page_size(PAGE_SIZE);
            let extra = self.fetcher.search_all(&unfiltered).await;
            merge_by_id(&mut medications, extra);
        }

        medications
    }

    async fn procedures(&self, patient_id: &PatientId) -> Vec<Procedure> {
        let query = patient_query(ResourceType::Procedure, patient_id)
            .param("_sort", "-date")
            .page_size(PAGE_SIZE);
        self.fetcher.search_all(&query).await
    }
}

fn patient_query(resource_type: ResourceType, patient_id: &PatientId) -> SearchQuery {
    SearchQuery::new(resource_type).param("patient", patient_id.as_str())
}

/// Appends resources whose id is not already present; id-less ones always go in
fn merge_by_id<T: FromResource>(existing: &mut Vec<T>, additional: Vec<T>) {
    let mut seen: HashSet<String> = existing
        .iter()
        .filter_map(|r| r.resource_id().map(str::to_string))
        .collect();

    for resource in additional {
        match resource.resource_id() {
            Some(id) if seen.contains(id) => continue,
            Some(id) => {
                seen.insert(id.to_string());
            }
            None => {}
        }
        existing.push(resource);
    }
}
