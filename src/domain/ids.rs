//! Domain identifier types with validation
//!
//! Patient identifiers are opaque handles produced by discovery. The newtype
//! keeps them from being mixed up with resource ids of other types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Patient identifier newtype wrapper
///
/// Holds the logical id part of a FHIR `Patient` resource, without the
/// resource type prefix or version suffix.
///
/// # Examples
///
/// ```
/// use trial_screener::domain::ids::PatientId;
/// use std::str::FromStr;
///
/// let id = PatientId::from_str("592810").unwrap();
/// assert_eq!(id.as_str(), "592810");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(String);

impl PatientId {
    /// Creates a new PatientId from a string
    ///
    /// # Returns
    ///
    /// Returns `Ok(PatientId)` if the ID is valid, `Err` otherwise
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err("Patient ID cannot be empty".to_string());
        }
        if trimmed.contains('/') {
            return Err(format!("Patient ID must not contain '/': {trimmed}"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Extracts the patient id from a FHIR reference
    ///
    /// Accepts relative (`Patient/123`), absolute
    /// (`https://server/baseR4/Patient/123`) and versioned
    /// (`Patient/123/_history/2`) references. References to other resource
    /// types yield `None`.
    pub fn from_reference(reference: &str) -> Option<Self> {
        let segments: Vec<&str> = reference
            .trim()
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        let position = segments.iter().rposition(|s| *s == "Patient")?;
        let id = segments.get(position + 1)?;
        Self::new(*id).ok()
    }

    /// Returns the patient ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns the FHIR search reference for this patient (`Patient/{id}`)
    pub fn reference(&self) -> String {
        format!("Patient/{}", self.0)
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PatientId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for PatientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
