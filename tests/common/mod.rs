//! Shared fixtures for integration tests: an in-memory FHIR server and
//! resource builders.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use trial_screener::adapters::fhir::{FhirResult, Page, PageToken, ResourceAccessPort, SearchQuery};
use trial_screener::config::ScreenerConfig;
use trial_screener::domain::resources::Reference;
use trial_screener::domain::{FhirError, Resource, ResourceType};

/// In-memory FHIR server honouring the handful of search parameters the
/// screener sends. Reads, searches and the capability endpoint can be
/// scripted to fail.
#[derive(Default)]
pub struct FakeFhirServer {
    resources: Vec<Resource>,
    read_failures: Mutex<HashMap<String, VecDeque<FhirError>>>,
    broken_patients: HashSet<String>,
    capabilities_error: Option<FhirError>,
    capability_failures: Mutex<VecDeque<FhirError>>,
    search_failures: Vec<(String, FhirError)>,
    pub capability_calls: AtomicUsize,
    pub read_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
    pub queries: Mutex<Vec<String>>,
}

impl FakeFhirServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resources(mut self, resources: Vec<Resource>) -> Self {
        self.resources.extend(resources);
        self
    }

    /// The next reads of `Patient/{id}` fail with these errors, in order
    pub fn fail_reads(self, id: &str, errors: Vec<FhirError>) -> Self {
        self.read_failures
            .lock()
            .unwrap()
            .insert(id.to_string(), errors.into());
        self
    }

    /// Every read of `Patient/{id}` panics
    pub fn panic_on_read(mut self, id: &str) -> Self {
        self.broken_patients.insert(id.to_string());
        self
    }

    pub fn unreachable(mut self) -> Self {
        self.capabilities_error = Some(FhirError::Transient("connection refused".to_string()));
        self
    }

    /// The next capability checks fail with these errors, in order
    pub fn flaky_capabilities(self, errors: Vec<FhirError>) -> Self {
        *self.capability_failures.lock().unwrap() = errors.into();
        self
    }

    /// Every search whose query string contains `pattern` fails
    pub fn fail_searches(mut self, pattern: &str, error: FhirError) -> Self {
        self.search_failures.push((pattern.to_string(), error));
        self
    }

    pub fn capability_checks(&self) -> usize {
        self.capability_calls.load(Ordering::SeqCst)
    }

    /// Query strings sent so far, in order
    pub fn sent_queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    pub fn reads(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    pub fn searches(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    fn matches(resource: &Resource, query: &SearchQuery) -> bool {
        if resource.resource_type() != Some(query.resource_type()) {
            return false;
        }

        if let Some(patient) = query.param_value("patient") {
            let expected = format!("Patient/{patient}");
            if subject(resource).and_then(|s| s.reference.as_deref()) != Some(expected.as_str()) {
                return false;
            }
        }

        match resource {
            Resource::Condition(condition) => {
                if let Some(codes) = query.param_value("code") {
                    let codes: Vec<&str> = codes.split(',').collect();
                    if !condition
                        .code
                        .as_ref()
                        .map(|c| c.has_any_code(&codes))
                        .unwrap_or(false)
                    {
                        return false;
                    }
                }
                if let Some(term) = query.param_value("code:text") {
                    if !condition
                        .code
                        .as_ref()
                        .map(|c| c.searchable_text().contains(&term.to_lowercase()))
                        .unwrap_or(false)
                    {
                        return false;
                    }
                }
                true
            }
            Resource::Observation(observation) => match query.param_value("category") {
                Some(categories) => {
                    let wanted: Vec<&str> = categories.split(',').collect();
                    observation.category.iter().any(|c| c.has_any_code(&wanted))
                }
                None => true,
            },
            Resource::MedicationStatement(medication) => match query.param_value("status") {
                Some(statuses) => medication
                    .status
                    .as_deref()
                    .map(|s| statuses.split(',').any(|w| w == s))
                    .unwrap_or(false),
                None => true,
            },
            _ => true,
        }
    }
}

fn subject(resource: &Resource) -> Option<&Reference> {
    match resource {
        Resource::Condition(r) => r.subject.as_ref(),
        Resource::Observation(r) => r.subject.as_ref(),
        Resource::MedicationStatement(r) => r.subject.as_ref(),
        Resource::Procedure(r) => r.subject.as_ref(),
        _ => None,
    }
}

#[async_trait]
impl ResourceAccessPort for FakeFhirServer {
    async fn read(&self, resource_type: ResourceType, id: &str) -> FhirResult<Resource> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);

        if self.broken_patients.contains(id) {
            panic!("patient {id} is corrupt");
        }
        if let Some(queue) = self.read_failures.lock().unwrap().get_mut(id) {
            if let Some(error) = queue.pop_front() {
                return Err(error);
            }
        }

        self.resources
            .iter()
            .find(|r| {
                r.resource_type() == Some(resource_type)
                    && matches!(r, Resource::Patient(p) if p.id.as_deref() == Some(id))
            })
            .cloned()
            .ok_or_else(|| FhirError::NotFound(format!("{resource_type}/{id}")))
    }

    async fn search(&self, query: &SearchQuery) -> FhirResult<Page> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let rendered = query.to_string();
        self.queries.lock().unwrap().push(rendered.clone());

        if let Some((_, error)) = self
            .search_failures
            .iter()
            .find(|(pattern, _)| rendered.contains(pattern.as_str()))
        {
            return Err(error.clone());
        }

        let mut found: Vec<Resource> = self
            .resources
            .iter()
            .filter(|r| Self::matches(r, query))
            .cloned()
            .collect();
        if let Some(count) = query.count() {
            found.truncate(count);
        }
        Ok(Page::last(found))
    }

    async fn next_page(&self, token: &PageToken) -> FhirResult<Page> {
        Err(FhirError::Fatal(format!("unexpected continuation {token}")))
    }

    async fn capabilities(&self) -> FhirResult<()> {
        self.capability_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self.capability_failures.lock().unwrap().pop_front() {
            return Err(error);
        }
        match &self.capabilities_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    fn base_url(&self) -> &str {
        "memory://fhir"
    }
}

pub fn resource(value: Value) -> Resource {
    serde_json::from_value(value).expect("fixture must be a valid resource")
}

/// A FHIR date `days` before today
pub fn days_ago(days: i64) -> String {
    (Utc::now().date_naive() - Duration::days(days)).to_string()
}

pub fn patient(id: &str, birth_date: &str) -> Resource {
    resource(json!({"resourceType": "Patient", "id": id, "birthDate": birth_date}))
}

pub fn nsclc_condition(patient_id: &str, stage: &str) -> Resource {
    resource(json!({
        "resourceType": "Condition",
        "id": format!("{patient_id}-nsclc"),
        "clinicalStatus": {"coding": [{"code": "active"}]},
        "code": {
            "coding": [{"system": "http://snomed.info/sct", "code": "254637007"}],
            "text": "Non-small cell lung cancer"
        },
        "subject": {"reference": format!("Patient/{patient_id}")},
        "stage": [{"summary": {"text": stage}}]
    }))
}

pub fn condition_with_text(id: &str, patient_id: &str, text: &str) -> Resource {
    resource(json!({
        "resourceType": "Condition",
        "id": id,
        "code": {"text": text},
        "subject": {"reference": format!("Patient/{patient_id}")}
    }))
}

pub fn observation(
    patient_id: &str,
    loinc: &str,
    category: &str,
    value: Value,
    date: &str,
) -> Resource {
    let mut body = json!({
        "resourceType": "Observation",
        "id": format!("{patient_id}-{loinc}"),
        "status": "final",
        "category": [{"coding": [{"code": category}]}],
        "code": {"coding": [{"system": "http://loinc.org", "code": loinc}]},
        "subject": {"reference": format!("Patient/{patient_id}")},
        "effectiveDateTime": date
    });
    if let (Some(map), Some(extra)) = (body.as_object_mut(), value.as_object()) {
        map.extend(extra.clone());
    }
    resource(body)
}

pub fn medication(patient_id: &str, name: &str) -> Resource {
    resource(json!({
        "resourceType": "MedicationStatement",
        "id": format!("{patient_id}-{}", name.to_lowercase()),
        "status": "active",
        "medicationCodeableConcept": {"text": name},
        "subject": {"reference": format!("Patient/{patient_id}")}
    }))
}

/// A patient meeting every criterion with recent labs
pub fn eligible_patient(id: &str) -> Vec<Resource> {
    let recent = days_ago(10);
    vec![
        patient(id, "1960-05-01"),
        nsclc_condition(id, "Stage IV"),
        observation(id, "89247-1", "survey", json!({"valueInteger": 1}), &recent),
        observation(
            id,
            "718-7",
            "laboratory",
            json!({"valueQuantity": {"value": 12.5, "unit": "g/dL"}}),
            &recent,
        ),
        observation(
            id,
            "751-8",
            "laboratory",
            json!({"valueQuantity": {"value": 3.2, "unit": "10*3/uL"}}),
            &recent,
        ),
        observation(
            id,
            "777-3",
            "laboratory",
            json!({"valueQuantity": {"value": 250.0, "unit": "10*3/uL"}}),
            &recent,
        ),
        medication(id, "Acetaminophen"),
    ]
}

/// Config with instant retries so tests never wait on backoff
pub fn fast_config() -> ScreenerConfig {
    let mut config = ScreenerConfig::default();
    config.fhir.retry.backoff_ms = vec![0];
    config
}
