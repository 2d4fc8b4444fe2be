//! Domain layer: core types shared by every other layer
//!
//! Contains the error taxonomy, identifier newtypes, the FHIR resource model,
//! the assembled patient record and the criterion/assessment types.

pub mod criteria;
pub mod errors;
pub mod ids;
pub mod record;
pub mod resources;
pub mod result;

pub use criteria::{
    Assessment, Criterion, CriterionKind, CriterionOutcome, EligibilityStatus, PendingAssessment,
};
pub use errors::{FhirError, ScreenerError};
pub use ids::PatientId;
pub use record::{PatientRecord, PatientRecordBuilder};
pub use resources::{FromResource, Resource, ResourceType};
pub use result::Result;
