//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{MissingMedicationPolicy, ScreenerConfig};
use crate::domain::errors::ScreenerError;
use crate::domain::result::Result;
use crate::report::ReportFormat;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Config file used when `SCREENER_CONFIG` is not set
pub const DEFAULT_CONFIG_FILE: &str = "screener.toml";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into ScreenerConfig
/// 4. Applies environment variable overrides (SCREENER_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns `ScreenerError::Configuration` if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use trial_screener::config::loader::load_config;
///
/// let config = load_config("screener.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<ScreenerConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ScreenerError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ScreenerError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let config: ScreenerConfig = toml::from_str(&contents)
        .map_err(|e| ScreenerError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    finish(config)
}

/// Loads configuration from an optional path, falling back to defaults
///
/// With `None`, `screener.toml` in the working directory is used if it
/// exists; otherwise built-in defaults are used. Environment overrides and
/// validation apply in both cases.
pub fn load_config_or_default(path: Option<&Path>) -> Result<ScreenerConfig> {
    match path {
        Some(path) => load_config(path),
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                load_config(default_path)
            } else {
                tracing::debug!("No configuration file found, using defaults");
                finish(ScreenerConfig::default())
            }
        }
    }
}

fn finish(mut config: ScreenerConfig) -> Result<ScreenerConfig> {
    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        ScreenerError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| ScreenerError::Configuration(format!("Invalid placeholder pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(ScreenerError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        ScreenerError::Configuration(format!("Invalid value '{}' for {}", value, name))
    })
}

/// Applies environment variable overrides using the SCREENER_* prefix
///
/// Variables follow the pattern SCREENER_<SECTION>_<KEY>, for example
/// SCREENER_FHIR_BASE_URL or SCREENER_SCREENING_WORKER_POOL_SIZE.
fn apply_env_overrides(config: &mut ScreenerConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("SCREENER_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("SCREENER_APPLICATION_MAX_PATIENTS") {
        config.application.max_patients =
            parse_override("SCREENER_APPLICATION_MAX_PATIENTS", &val)?;
    }

    // FHIR overrides
    if let Ok(val) = std::env::var("SCREENER_FHIR_BASE_URL") {
        config.fhir.base_url = val;
    }
    if let Ok(val) = std::env::var("SCREENER_FHIR_TIMEOUT_SECONDS") {
        config.fhir.timeout_seconds = parse_override("SCREENER_FHIR_TIMEOUT_SECONDS", &val)?;
    }
    if let Ok(val) = std::env::var("SCREENER_FHIR_TLS_VERIFY") {
        config.fhir.tls_verify = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("SCREENER_FHIR_RETRY_MAX_ATTEMPTS") {
        config.fhir.retry.max_attempts =
            parse_override("SCREENER_FHIR_RETRY_MAX_ATTEMPTS", &val)?;
    }

    // Screening overrides
    if let Ok(val) = std::env::var("SCREENER_SCREENING_WORKER_POOL_SIZE") {
        config.screening.worker_pool_size =
            parse_override("SCREENER_SCREENING_WORKER_POOL_SIZE", &val)?;
    }
    if let Ok(val) = std::env::var("SCREENER_SCREENING_LAB_RECENCY_DAYS") {
        config.screening.lab_recency_days =
            parse_override("SCREENER_SCREENING_LAB_RECENCY_DAYS", &val)?;
    }
    if let Ok(val) = std::env::var("SCREENER_SCREENING_MISSING_MEDICATION_POLICY") {
        config.screening.missing_medication_policy = val
            .parse::<MissingMedicationPolicy>()
            .map_err(ScreenerError::Configuration)?;
    }

    // Trial and report overrides
    if let Ok(val) = std::env::var("SCREENER_TRIAL_NAME") {
        config.trial.name = val;
    }
    if let Ok(val) = std::env::var("SCREENER_REPORT_FORMAT") {
        config.report.format = val
            .parse::<ReportFormat>()
            .map_err(ScreenerError::Configuration)?;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("SCREENER_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("SCREENER_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("SCREENER_LOADER_TEST_VAR", "test_value");
        let input = "base_url = \"${SCREENER_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "base_url = \"test_value\"\n");
        std::env::remove_var("SCREENER_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("SCREENER_LOADER_MISSING_VAR");
        let input = "base_url = \"${SCREENER_LOADER_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("SCREENER_LOADER_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        std::env::remove_var("SCREENER_LOADER_COMMENTED_VAR");
        let input = "# base_url = \"${SCREENER_LOADER_COMMENTED_VAR}\"\nname = \"x\"";
        let result = substitute_env_vars(input).unwrap();
        assert!(result.contains("${SCREENER_LOADER_COMMENTED_VAR}"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent-screener.toml");
        assert!(matches!(result, Err(ScreenerError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[fhir]
base_url = "https://fhir.example.org/r4"
timeout_seconds = 10

[fhir.retry]
max_attempts = 2
backoff_ms = [50]

[trial]
name = "Local Study"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.fhir.base_url, "https://fhir.example.org/r4");
        assert_eq!(config.fhir.retry.max_attempts, 2);
        assert_eq!(config.fhir.retry.backoff_ms, vec![50]);
        assert_eq!(config.trial.name, "Local Study");
        assert_eq!(config.screening.worker_pool_size, 10);
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"[fhir\nbase_url = ").unwrap();
        temp_file.flush().unwrap();

        let err = load_config(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML"));
    }

    #[test]
    fn test_load_config_validation_failure() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[screening]\nworker_pool_size = 0\n")
            .unwrap();
        temp_file.flush().unwrap();

        let err = load_config(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("validation failed"));
    }
}
