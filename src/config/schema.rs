//! Configuration schema types
//!
//! Every section is optional in the TOML file; missing sections and keys take
//! the defaults defined here.

use crate::report::ReportFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Root configuration structure mapped from `screener.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScreenerConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// FHIR server connection
    #[serde(default)]
    pub fhir: FhirConfig,

    /// Candidate discovery
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Criteria evaluation and scheduling
    #[serde(default)]
    pub screening: ScreeningConfig,

    /// Trial metadata used in reports
    #[serde(default)]
    pub trial: TrialConfig,

    /// Report output
    #[serde(default)]
    pub report: ReportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ScreenerConfig {
    /// Validates every section
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.fhir.validate()?;
        self.discovery.validate()?;
        self.screening.validate()?;
        self.trial.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Candidate count used when the command line gives none
    #[serde(default = "default_max_patients")]
    pub max_patients: usize,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        if self.max_patients == 0 {
            return Err("application.max_patients must be > 0".to_string());
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            max_patients: default_max_patients(),
        }
    }
}

/// Retry policy for remote calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per remote call, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// Delay before attempt n+1 is `backoff_ms[n-1]`; the last value is reused
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: Vec<u64>,
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 || self.max_attempts > 10 {
            return Err("fhir.retry.max_attempts must be between 1 and 10".to_string());
        }
        if self.max_attempts > 1 && self.backoff_ms.is_empty() {
            return Err("fhir.retry.backoff_ms cannot be empty when retries are enabled".to_string());
        }
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

/// FHIR server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FhirConfig {
    /// Base URL of the FHIR R4 server
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// TLS certificate verification enabled
    #[serde(default = "default_true")]
    pub tls_verify: bool,

    /// Retry policy
    #[serde(default)]
    pub retry: RetryConfig,
}

impl FhirConfig {
    fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("fhir.base_url cannot be empty".to_string());
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("fhir.base_url must start with http:// or https://".to_string());
        }
        if self.timeout_seconds == 0 {
            return Err("fhir.timeout_seconds must be > 0".to_string());
        }
        self.retry.validate()
    }
}

impl Default for FhirConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
            tls_verify: true,
            retry: RetryConfig::default(),
        }
    }
}

/// Candidate discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// SNOMED CT codes searched by the code strategy
    #[serde(default = "default_condition_codes")]
    pub condition_codes: Vec<String>,

    /// Free-text diagnosis phrases, one query each
    #[serde(default = "default_text_terms")]
    pub text_terms: Vec<String>,

    /// Lower-case keywords used to filter the broad batch
    #[serde(default = "default_broad_keywords")]
    pub broad_keywords: Vec<String>,

    /// Code search page size relative to the requested maximum
    #[serde(default = "default_code_search_multiplier")]
    pub code_search_multiplier: usize,

    /// Broad search page size relative to the requested maximum
    #[serde(default = "default_broad_search_multiplier")]
    pub broad_search_multiplier: usize,
}

impl DiscoveryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.condition_codes.is_empty() {
            return Err("discovery.condition_codes cannot be empty".to_string());
        }
        if self.code_search_multiplier == 0 || self.broad_search_multiplier == 0 {
            return Err("discovery search multipliers must be > 0".to_string());
        }
        Ok(())
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            condition_codes: default_condition_codes(),
            text_terms: default_text_terms(),
            broad_keywords: default_broad_keywords(),
            code_search_multiplier: default_code_search_multiplier(),
            broad_search_multiplier: default_broad_search_multiplier(),
        }
    }
}

/// What the prior-therapy exclusion concludes when no medication data exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingMedicationPolicy {
    /// Report the criterion as unknown
    #[default]
    Unknown,
    /// Treat the patient as having had no prior therapy
    AssumeNoTherapy,
}

impl FromStr for MissingMedicationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unknown" => Ok(Self::Unknown),
            "assume_no_therapy" => Ok(Self::AssumeNoTherapy),
            other => Err(format!(
                "Invalid missing_medication_policy '{other}'. Must be one of: unknown, assume_no_therapy"
            )),
        }
    }
}

impl fmt::Display for MissingMedicationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("unknown"),
            Self::AssumeNoTherapy => f.write_str("assume_no_therapy"),
        }
    }
}

/// Criteria evaluation and scheduling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningConfig {
    /// Number of patients screened concurrently
    #[serde(default = "default_worker_pool_size")]
    pub worker_pool_size: usize,

    /// Maximum age of a lab result in days; 0 disables the check
    #[serde(default = "default_lab_recency_days")]
    pub lab_recency_days: u32,

    /// Window in days for brain-directed procedures
    #[serde(default = "default_procedure_recency_days")]
    pub procedure_recency_days: u32,

    /// Outcome of the prior-therapy exclusion without medication data
    #[serde(default)]
    pub missing_medication_policy: MissingMedicationPolicy,
}

impl ScreeningConfig {
    fn validate(&self) -> Result<(), String> {
        if self.worker_pool_size == 0 || self.worker_pool_size > 100 {
            return Err("screening.worker_pool_size must be between 1 and 100".to_string());
        }
        if self.procedure_recency_days == 0 {
            return Err("screening.procedure_recency_days must be > 0".to_string());
        }
        Ok(())
    }
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            worker_pool_size: default_worker_pool_size(),
            lab_recency_days: default_lab_recency_days(),
            procedure_recency_days: default_procedure_recency_days(),
            missing_medication_policy: MissingMedicationPolicy::default(),
        }
    }
}

/// Trial metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialConfig {
    /// Trial name printed in reports
    #[serde(default = "default_trial_name")]
    pub name: String,
}

impl TrialConfig {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("trial.name cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            name: default_trial_name(),
        }
    }
}

/// Report output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output format (text or json)
    #[serde(default)]
    pub format: ReportFormat,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when file logging is enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_patients() -> usize {
    100
}

fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    "https://hapi.fhir.org/baseR4".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_max_attempts() -> usize {
    3
}

fn default_backoff_ms() -> Vec<u64> {
    vec![1000, 2000, 4000]
}

fn default_condition_codes() -> Vec<String> {
    [
        "254637007",
        "424132000",
        "93880001",
        "162573006",
        "254632001",
        "423121009",
        "35917007",
        "94222008",
        "315058005",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_text_terms() -> Vec<String> {
    [
        "lung cancer",
        "non-small cell lung cancer",
        "NSCLC",
        "lung carcinoma",
        "pulmonary carcinoma",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_broad_keywords() -> Vec<String> {
    ["lung", "pulmonary", "bronch", "respiratory", "thoracic"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_code_search_multiplier() -> usize {
    3
}

fn default_broad_search_multiplier() -> usize {
    5
}

fn default_worker_pool_size() -> usize {
    10
}

fn default_lab_recency_days() -> u32 {
    90
}

fn default_procedure_recency_days() -> u32 {
    365
}

fn default_trial_name() -> String {
    "Phase II Advanced NSCLC Study".to_string()
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: ScreenerConfig = toml::from_str("").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.fhir.base_url, "https://hapi.fhir.org/baseR4");
        assert_eq!(config.fhir.retry.max_attempts, 3);
        assert_eq!(config.fhir.retry.backoff_ms, vec![1000, 2000, 4000]);
        assert_eq!(config.discovery.condition_codes.len(), 9);
        assert_eq!(config.screening.worker_pool_size, 10);
        assert_eq!(config.screening.lab_recency_days, 90);
        assert_eq!(
            config.screening.missing_medication_policy,
            MissingMedicationPolicy::Unknown
        );
        assert_eq!(config.report.format, ReportFormat::Text);
        assert!(!config.logging.local_enabled);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: ScreenerConfig = toml::from_str(
            r#"
[screening]
worker_pool_size = 4
missing_medication_policy = "assume_no_therapy"

[report]
format = "json"
"#,
        )
        .unwrap();

        assert_eq!(config.screening.worker_pool_size, 4);
        assert_eq!(config.screening.procedure_recency_days, 365);
        assert_eq!(
            config.screening.missing_medication_policy,
            MissingMedicationPolicy::AssumeNoTherapy
        );
        assert_eq!(config.report.format, ReportFormat::Json);
    }

    #[test]
    fn test_validate_log_level() {
        let mut config = ScreenerConfig::default();
        config.application.log_level = "verbose".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.contains("Invalid log_level"));
    }

    #[test]
    fn test_validate_base_url_scheme() {
        let mut config = ScreenerConfig::default();
        config.fhir.base_url = "ftp://example.org".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_worker_pool_bounds() {
        let mut config = ScreenerConfig::default();
        config.screening.worker_pool_size = 0;
        assert!(config.validate().is_err());
        config.screening.worker_pool_size = 101;
        assert!(config.validate().is_err());
        config.screening.worker_pool_size = 100;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_retry() {
        let mut config = ScreenerConfig::default();
        config.fhir.retry.max_attempts = 0;
        assert!(config.validate().is_err());

        config.fhir.retry.max_attempts = 1;
        config.fhir.retry.backoff_ms.clear();
        assert!(config.validate().is_ok());

        config.fhir.retry.max_attempts = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rotation() {
        let mut config = ScreenerConfig::default();
        config.logging.local_rotation = "weekly".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_medication_policy_from_str() {
        assert_eq!(
            "ASSUME_NO_THERAPY".parse::<MissingMedicationPolicy>().unwrap(),
            MissingMedicationPolicy::AssumeNoTherapy
        );
        assert!("maybe".parse::<MissingMedicationPolicy>().is_err());
        assert_eq!(MissingMedicationPolicy::Unknown.to_string(), "unknown");
    }
}
