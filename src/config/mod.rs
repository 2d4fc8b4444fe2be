//! Configuration management for the screener.
//!
//! Configuration comes from an optional TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - Defaults for every section and key
//! - `SCREENER_<SECTION>_<KEY>` environment overrides
//! - Validation on load
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//! max_patients = 100
//!
//! [fhir]
//! base_url = "https://hapi.fhir.org/baseR4"
//! timeout_seconds = 30
//!
//! [fhir.retry]
//! max_attempts = 3
//! backoff_ms = [1000, 2000, 4000]
//!
//! [screening]
//! worker_pool_size = 10
//! lab_recency_days = 90
//! missing_medication_policy = "unknown"
//!
//! [trial]
//! name = "Phase II Advanced NSCLC Study"
//!
//! [report]
//! format = "text"
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use trial_screener::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("screener.toml")?;
//! println!("FHIR server: {}", config.fhir.base_url);
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;

pub use loader::{load_config, load_config_or_default, DEFAULT_CONFIG_FILE};
pub use schema::{
    ApplicationConfig, DiscoveryConfig, FhirConfig, LoggingConfig, MissingMedicationPolicy,
    ReportConfig, RetryConfig, ScreenerConfig, ScreeningConfig, TrialConfig,
};
