//! FHIR R4 resource model
//!
//! Serde models for the subset of FHIR R4 the screener reads, plus the
//! [`Resource`] discriminated union returned by the resource access port.
//! Unknown JSON fields are ignored; unknown resource types decode to
//! [`Resource::Unsupported`].
//!
//! Callers never match on [`Resource`] themselves. The fetcher resolves the
//! union once through [`FromResource`] and hands out concrete types.

use crate::domain::ids::PatientId;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// LOINC coding system URI
pub const LOINC_SYSTEM: &str = "http://loinc.org";

/// Resource types the screener fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    Patient,
    Condition,
    Observation,
    MedicationStatement,
    Procedure,
}

impl ResourceType {
    /// Returns the FHIR resource type name as used in REST paths
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Patient => "Patient",
            ResourceType::Condition => "Condition",
            ResourceType::Observation => "Observation",
            ResourceType::MedicationStatement => "MedicationStatement",
            ResourceType::Procedure => "Procedure",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Coding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Coding {
    /// Creates a coding with a system and code
    pub fn new(system: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            code: Some(code.into()),
            display: None,
        }
    }

    /// Sets the display text
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }
}

/// A concept expressed as codings and/or free text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeableConcept {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<Coding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CodeableConcept {
    /// Creates a concept holding only free text
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            coding: Vec::new(),
            text: Some(text.into()),
        }
    }

    /// Creates a concept from a single coding
    pub fn from_coding(coding: Coding) -> Self {
        Self {
            coding: vec![coding],
            text: None,
        }
    }

    /// Sets the free text
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// True if any coding carries one of the given codes, regardless of system
    pub fn has_any_code(&self, codes: &[&str]) -> bool {
        self.coding
            .iter()
            .filter_map(|c| c.code.as_deref())
            .any(|code| codes.contains(&code))
    }

    /// True if a coding matches both the system and the code
    pub fn has_system_code(&self, system: &str, code: &str) -> bool {
        self.coding
            .iter()
            .any(|c| c.system.as_deref() == Some(system) && c.code.as_deref() == Some(code))
    }

    /// Lower-cased free text followed by every coding display, space separated
    pub fn searchable_text(&self) -> String {
        let mut text = self.text.as_deref().unwrap_or_default().to_lowercase();
        for display in self.coding.iter().filter_map(|c| c.display.as_deref()) {
            text.push(' ');
            text.push_str(&display.to_lowercase());
        }
        text
    }

    /// True if the free text or any display contains one of the lower-case terms
    pub fn mentions_any(&self, terms: &[&str]) -> bool {
        let text = self.searchable_text();
        terms.iter().any(|term| text.contains(term))
    }

    /// Human label: the free text, else the first coding display
    pub fn label(&self) -> Option<&str> {
        self.text
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.coding.iter().find_map(|c| c.display.as_deref()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Reference {
    /// Reference to a patient (`Patient/{id}`)
    pub fn patient(id: &PatientId) -> Self {
        Self {
            reference: Some(id.reference()),
            display: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Period {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Quantity {
    /// Creates a quantity with a value and an optional human unit
    pub fn new(value: f64, unit: Option<&str>) -> Self {
        Self {
            value: Some(value),
            unit: unit.map(str::to_string),
            system: None,
            code: None,
        }
    }

    /// The human unit, else the coded (UCUM) unit, ignoring blanks
    pub fn unit_label(&self) -> Option<&str> {
        self.unit
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .or_else(|| self.code.as_deref().filter(|u| !u.trim().is_empty()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

impl Patient {
    /// Parsed birth date; partial dates resolve to their first day
    pub fn date_of_birth(&self) -> Option<NaiveDate> {
        self.birth_date.as_deref().and_then(parse_fhir_date)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionStage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<CodeableConcept>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinical_status: Option<CodeableConcept>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeableConcept>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stage: Vec<ConditionStage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onset_date_time: Option<String>,
}

impl Condition {
    /// Patient id taken from `subject.reference`
    pub fn subject_patient_id(&self) -> Option<PatientId> {
        self.subject
            .as_ref()
            .and_then(|s| s.reference.as_deref())
            .and_then(PatientId::from_reference)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub category: Vec<CodeableConcept>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeableConcept>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_period: Option<Period>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_quantity: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_integer: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_codeable_concept: Option<CodeableConcept>,
}

impl Observation {
    /// True if the observation is coded with the given LOINC code
    pub fn has_loinc_code(&self, code: &str) -> bool {
        self.code
            .as_ref()
            .map(|c| c.has_system_code(LOINC_SYSTEM, code))
            .unwrap_or(false)
    }

    /// Clinically relevant time: effective[x], else `issued`
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        self.effective_date_time
            .as_deref()
            .and_then(parse_fhir_instant)
            .or_else(|| {
                self.effective_period
                    .as_ref()
                    .and_then(|p| p.start.as_deref())
                    .and_then(parse_fhir_instant)
            })
            .or_else(|| self.issued.as_deref().and_then(parse_fhir_instant))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationStatement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medication_codeable_concept: Option<CodeableConcept>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reason_code: Vec<CodeableConcept>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Procedure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeableConcept>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performed_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performed_period: Option<Period>,
}

impl Procedure {
    /// Date the procedure was performed: performedDateTime, else the period end or start
    pub fn performed_on(&self) -> Option<NaiveDate> {
        self.performed_date_time
            .as_deref()
            .and_then(parse_fhir_date)
            .or_else(|| {
                self.performed_period.as_ref().and_then(|p| {
                    p.end
                        .as_deref()
                        .and_then(parse_fhir_date)
                        .or_else(|| p.start.as_deref().and_then(parse_fhir_date))
                })
            })
    }
}

/// Any resource returned by the access port
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "resourceType")]
pub enum Resource {
    Patient(Patient),
    Condition(Condition),
    Observation(Observation),
    MedicationStatement(MedicationStatement),
    Procedure(Procedure),
    /// Resource types the screener does not read (OperationOutcome, Encounter, ...)
    #[serde(other)]
    Unsupported,
}

impl Resource {
    /// The resource type, or `None` for unsupported resources
    pub fn resource_type(&self) -> Option<ResourceType> {
        match self {
            Resource::Patient(_) => Some(ResourceType::Patient),
            Resource::Condition(_) => Some(ResourceType::Condition),
            Resource::Observation(_) => Some(ResourceType::Observation),
            Resource::MedicationStatement(_) => Some(ResourceType::MedicationStatement),
            Resource::Procedure(_) => Some(ResourceType::Procedure),
            Resource::Unsupported => None,
        }
    }
}

/// Conversion from the [`Resource`] union into one concrete resource type
pub trait FromResource: Sized + Send + 'static {
    /// The resource type this conversion accepts
    const RESOURCE_TYPE: ResourceType;

    /// Returns the concrete resource, or `None` for any other variant
    fn from_resource(resource: Resource) -> Option<Self>;

    /// Logical id of the resource, if present
    fn resource_id(&self) -> Option<&str>;
}

macro_rules! impl_from_resource {
    ($($ty:ident),* $(,)?) => {
        $(
            impl FromResource for $ty {
                const RESOURCE_TYPE: ResourceType = ResourceType::$ty;

                fn from_resource(resource: Resource) -> Option<Self> {
                    match resource {
                        Resource::$ty(inner) => Some(inner),
                        _ => None,
                    }
                }

                fn resource_id(&self) -> Option<&str> {
                    self.id.as_deref()
                }
            }

            impl From<$ty> for Resource {
                fn from(value: $ty) -> Self {
                    Resource::$ty(value)
                }
            }
        )*
    };
}

impl_from_resource!(Patient, Condition, Observation, MedicationStatement, Procedure);

/// Parses a FHIR `date` or `dateTime` into a calendar date
///
/// Accepts `YYYY`, `YYYY-MM`, `YYYY-MM-DD` and any date-time whose first ten
/// characters are a full date. Partial dates resolve to their first day.
pub fn parse_fhir_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    match value.len() {
        4 => value
            .parse::<i32>()
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1)),
        7 => NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d").ok(),
        n if n >= 10 => value
            .get(..10)
            .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()),
        _ => None,
    }
}

/// Parses a FHIR `dateTime`/`instant` into UTC; bare dates map to midnight UTC
pub fn parse_fhir_instant(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            parse_fhir_date(value)
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| Utc.from_utc_datetime(&naive))
        })
}
