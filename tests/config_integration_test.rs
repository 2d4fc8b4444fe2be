//! Integration tests for configuration loading and validation
//!
//! Tests touching environment variables hold `ENV_MUTEX`.

use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;
use trial_screener::config::{load_config, load_config_or_default, MissingMedicationPolicy};
use trial_screener::report::ReportFormat;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn cleanup_env_vars() {
    for name in [
        "SCREENER_APPLICATION_LOG_LEVEL",
        "SCREENER_APPLICATION_MAX_PATIENTS",
        "SCREENER_FHIR_BASE_URL",
        "SCREENER_SCREENING_WORKER_POOL_SIZE",
        "SCREENER_SCREENING_MISSING_MEDICATION_POLICY",
        "SCREENER_REPORT_FORMAT",
        "TEST_FHIR_BASE_URL",
    ] {
        std::env::remove_var(name);
    }
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
[application]
log_level = "debug"
max_patients = 25

[fhir]
base_url = "https://fhir.example.org/r4"
timeout_seconds = 10

[fhir.retry]
max_attempts = 4
backoff_ms = [100, 200]

[discovery]
condition_codes = ["254637007"]
text_terms = ["NSCLC"]

[screening]
worker_pool_size = 4
lab_recency_days = 30
procedure_recency_days = 60
missing_medication_policy = "assume_no_therapy"

[trial]
name = "Lung Study B"

[report]
format = "json"

[logging]
local_enabled = false
local_rotation = "hourly"
"#,
    );

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.application.max_patients, 25);
    assert_eq!(config.fhir.base_url, "https://fhir.example.org/r4");
    assert_eq!(config.fhir.timeout_seconds, 10);
    assert_eq!(config.fhir.retry.max_attempts, 4);
    assert_eq!(config.fhir.retry.backoff_ms, vec![100, 200]);
    assert_eq!(config.discovery.condition_codes, vec!["254637007"]);
    assert_eq!(config.screening.worker_pool_size, 4);
    assert_eq!(config.screening.lab_recency_days, 30);
    assert_eq!(config.screening.procedure_recency_days, 60);
    assert_eq!(
        config.screening.missing_medication_policy,
        MissingMedicationPolicy::AssumeNoTherapy
    );
    assert_eq!(config.trial.name, "Lung Study B");
    assert_eq!(config.report.format, ReportFormat::Json);
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_minimal_config_uses_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config("[trial]\nname = \"Minimal\"\n");
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.max_patients, 100);
    assert_eq!(config.fhir.base_url, "https://hapi.fhir.org/baseR4");
    assert_eq!(config.fhir.retry.max_attempts, 3);
    assert_eq!(config.screening.worker_pool_size, 10);
    assert_eq!(config.screening.lab_recency_days, 90);
    assert_eq!(config.report.format, ReportFormat::Text);
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("TEST_FHIR_BASE_URL", "https://from-env.example.org/r4");

    let file = write_config(
        r#"
[fhir]
base_url = "${TEST_FHIR_BASE_URL}"
"#,
    );
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.fhir.base_url, "https://from-env.example.org/r4");
    cleanup_env_vars();
}

#[test]
fn test_missing_substitution_variable_fails() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
[fhir]
base_url = "${TEST_FHIR_BASE_URL}"
"#,
    );
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("TEST_FHIR_BASE_URL"));
}

#[test]
fn test_env_overrides_take_precedence() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("SCREENER_FHIR_BASE_URL", "http://localhost:8080/fhir");
    std::env::set_var("SCREENER_SCREENING_WORKER_POOL_SIZE", "3");
    std::env::set_var("SCREENER_SCREENING_MISSING_MEDICATION_POLICY", "assume_no_therapy");
    std::env::set_var("SCREENER_REPORT_FORMAT", "json");

    let file = write_config("[screening]\nworker_pool_size = 8\n");
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.fhir.base_url, "http://localhost:8080/fhir");
    assert_eq!(config.screening.worker_pool_size, 3);
    assert_eq!(
        config.screening.missing_medication_policy,
        MissingMedicationPolicy::AssumeNoTherapy
    );
    assert_eq!(config.report.format, ReportFormat::Json);
    cleanup_env_vars();
}

#[test]
fn test_invalid_override_is_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("SCREENER_APPLICATION_MAX_PATIENTS", "lots");

    let result = load_config_or_default(None);
    cleanup_env_vars();

    let err = result.unwrap_err();
    assert!(err.to_string().contains("SCREENER_APPLICATION_MAX_PATIENTS"));
}

#[test]
fn test_validation_errors() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let cases = [
        "[fhir]\nbase_url = \"ftp://fhir.example.org\"\n",
        "[fhir]\ntimeout_seconds = 0\n",
        "[fhir.retry]\nmax_attempts = 0\n",
        "[screening]\nworker_pool_size = 0\n",
        "[application]\nlog_level = \"verbose\"\n",
        "[logging]\nlocal_rotation = \"size\"\n",
    ];

    for contents in cases {
        let file = write_config(contents);
        let err = load_config(file.path()).unwrap_err();
        assert!(
            err.to_string().contains("validation failed"),
            "expected validation failure for {contents:?}, got {err}"
        );
    }
}

#[test]
fn test_missing_file() {
    let result = load_config("/nonexistent/screener.toml");
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("not found"));
}

#[test]
fn test_malformed_toml() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config("[fhir\nbase_url = ");
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse TOML"));
}
