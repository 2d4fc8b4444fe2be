//! Logging and observability
//!
//! Structured logging via `tracing`, set up by [`init_logging`], plus a few
//! macros for events that are emitted from several places with the same
//! field names.
//!
//! # Example
//!
//! ```no_run
//! use trial_screener::logging::init_logging;
//! use trial_screener::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(patient_id = "592810", "Screening patient");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a screening run
///
/// # Example
///
/// ```no_run
/// use trial_screener::log_screening_start;
///
/// log_screening_start!(42, 10);
/// ```
#[macro_export]
macro_rules! log_screening_start {
    ($candidates:expr, $workers:expr) => {
        tracing::info!(
            candidates = $candidates,
            workers = $workers,
            "Starting screening"
        );
    };
}

/// Log the completion of a screening run
///
/// # Example
///
/// ```no_run
/// use trial_screener::log_screening_complete;
/// use std::time::Duration;
///
/// log_screening_complete!(40, 2, Duration::from_secs(12));
/// ```
#[macro_export]
macro_rules! log_screening_complete {
    ($assessed:expr, $dropped:expr, $duration:expr) => {
        tracing::info!(
            assessed = $assessed,
            dropped = $dropped,
            duration_ms = $duration.as_millis() as u64,
            "Screening completed"
        );
    };
}

/// Log a patient whose screening unit failed and was dropped
///
/// # Example
///
/// ```no_run
/// use trial_screener::log_unit_dropped;
///
/// log_unit_dropped!("592810", "task panicked");
/// ```
#[macro_export]
macro_rules! log_unit_dropped {
    ($patient_id:expr, $reason:expr) => {
        tracing::error!(
            patient_id = %$patient_id,
            reason = %$reason,
            "Screening unit failed, patient dropped from results"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use trial_screener::log_error_with_context;
/// use trial_screener::domain::ScreenerError;
///
/// let error = ScreenerError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use trial_screener::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, 1000u64, "Condition search", "connection reset");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $delay_ms:expr, $operation:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            delay_ms = $delay_ms,
            operation = %$operation,
            reason = %$reason,
            "Retrying operation"
        );
    };
}
