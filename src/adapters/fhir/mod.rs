//! FHIR adapter implementation
//!
//! The [`ResourceAccessPort`] trait is the only surface the core depends on.
//! [`FhirHttpClient`] implements it over reqwest; [`FhirClient`] shares a port
//! across workers and runs the startup health check.

pub mod client;
pub mod http;
pub mod models;
pub mod port;

pub use client::FhirClient;
pub use http::FhirHttpClient;
pub use models::{Bundle, BundleEntry, BundleLink};
pub use port::{FhirResult, Page, PageToken, ResourceAccessPort, SearchQuery};
