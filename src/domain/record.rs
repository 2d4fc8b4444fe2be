//! Assembled patient record
//!
//! A [`PatientRecord`] is built once per candidate by the record assembler and
//! is read-only afterwards. Missing data is represented by empty sequences or
//! an absent demographic summary, never by an error.

use crate::domain::errors::ScreenerError;
use crate::domain::ids::PatientId;
use crate::domain::resources::{Condition, MedicationStatement, Observation, Patient, Procedure};
use crate::domain::result::Result;
use chrono::NaiveDate;

/// Everything known about one candidate patient
#[derive(Debug, Clone, PartialEq)]
pub struct PatientRecord {
    patient_id: PatientId,
    demographics: Option<Patient>,
    conditions: Vec<Condition>,
    observations: Vec<Observation>,
    medications: Vec<MedicationStatement>,
    procedures: Vec<Procedure>,
}

impl PatientRecord {
    /// Starts a builder for a record
    pub fn builder() -> PatientRecordBuilder {
        PatientRecordBuilder::default()
    }

    pub fn patient_id(&self) -> &PatientId {
        &self.patient_id
    }

    /// The demographic summary, if it could be retrieved
    pub fn demographics(&self) -> Option<&Patient> {
        self.demographics.as_ref()
    }

    /// Birth date from the demographic summary
    pub fn birth_date(&self) -> Option<NaiveDate> {
        self.demographics.as_ref().and_then(Patient::date_of_birth)
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn medications(&self) -> &[MedicationStatement] {
        &self.medications
    }

    pub fn procedures(&self) -> &[Procedure] {
        &self.procedures
    }

    /// Most recent observation with the given LOINC code
    ///
    /// Observations without a usable timestamp are not considered. On equal
    /// timestamps the later one in record order wins.
    pub fn latest_observation(&self, loinc_code: &str) -> Option<&Observation> {
        self.observations
            .iter()
            .filter(|obs| obs.has_loinc_code(loinc_code))
            .filter_map(|obs| obs.recorded_at().map(|at| (at, obs)))
            .max_by_key(|(at, _)| *at)
            .map(|(_, obs)| obs)
    }
}

/// Builder for [`PatientRecord`]
#[derive(Debug, Default)]
pub struct PatientRecordBuilder {
    patient_id: Option<PatientId>,
    demographics: Option<Patient>,
    conditions: Vec<Condition>,
    observations: Vec<Observation>,
    medications: Vec<MedicationStatement>,
    procedures: Vec<Procedure>,
}

impl PatientRecordBuilder {
    pub fn patient_id(mut self, id: PatientId) -> Self {
        self.patient_id = Some(id);
        self
    }

    pub fn demographics(mut self, patient: Option<Patient>) -> Self {
        self.demographics = patient;
        self
    }

    pub fn conditions(mut self, conditions: Vec<Condition>) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn observations(mut self, observations: Vec<Observation>) -> Self {
        self.observations = observations;
        self
    }

    pub fn medications(mut self, medications: Vec<MedicationStatement>) -> Self {
        self.medications = medications;
        self
    }

    pub fn procedures(mut self, procedures: Vec<Procedure>) -> Self {
        self.procedures = procedures;
        self
    }

    /// Builds the record
    ///
    /// # Errors
    ///
    /// Returns `ScreenerError::InvalidInput` if no patient id was set.
    pub fn build(self) -> Result<PatientRecord> {
        let patient_id = self.patient_id.ok_or_else(|| {
            ScreenerError::InvalidInput("patient record requires a patient id".to_string())
        })?;

        Ok(PatientRecord {
            patient_id,
            demographics: self.demographics,
            conditions: self.conditions,
            observations: self.observations,
            medications: self.medications,
            procedures: self.procedures,
        })
    }
}
