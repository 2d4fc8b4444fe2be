//! Domain error types
//!
//! This module defines the error hierarchy for the screener. Errors are
//! domain-specific and never expose third-party HTTP client types.

use thiserror::Error;

/// Main screener error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum ScreenerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// FHIR resource access errors
    #[error("FHIR error: {0}")]
    Fhir(#[from] FhirError),

    /// Precondition violation by a caller; never retried or downgraded
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Network/connection errors surfaced at startup
    #[error("Connection error: {0}")]
    Connection(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Failure classes reported by the resource access port
///
/// `NotFound` is an expected absence and is never retried. `Transient` and
/// `Fatal` are both retried by the fetcher and then downgraded to "no data";
/// they differ only in how they are logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FhirError {
    /// The requested resource does not exist
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Connectivity or protocol-level failure
    #[error("Transient failure: {0}")]
    Transient(String),

    /// Any other failure from the server or the response body
    #[error("Fatal failure: {0}")]
    Fatal(String),
}

impl FhirError {
    /// Returns true for the expected-absence class
    pub fn is_not_found(&self) -> bool {
        matches!(self, FhirError::NotFound(_))
    }

    /// Short label used as a structured logging field
    pub fn class(&self) -> &'static str {
        match self {
            FhirError::NotFound(_) => "not_found",
            FhirError::Transient(_) => "transient",
            FhirError::Fatal(_) => "fatal",
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for ScreenerError {
    fn from(err: std::io::Error) -> Self {
        ScreenerError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for ScreenerError {
    fn from(err: serde_json::Error) -> Self {
        ScreenerError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ScreenerError {
    fn from(err: toml::de::Error) -> Self {
        ScreenerError::Configuration(format!("TOML parse error: {err}"))
    }
}
