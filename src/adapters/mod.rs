//! External system integrations.
//!
//! - [`fhir`] - FHIR R4 server access (port trait, reqwest implementation, client wrapper)
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind a trait so the core can be
//! tested with in-memory implementations.
//!
//! ```rust,no_run
//! use trial_screener::adapters::fhir::FhirClient;
//! use trial_screener::config::FhirConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = FhirClient::new(&FhirConfig::default())?;
//! client.health_check().await?;
//! # Ok(())
//! # }
//! ```

pub mod fhir;
