//! Screening command implementation
//!
//! Runs one screening pass and prints the report to stdout.

use crate::cli::Cli;
use crate::config::ScreenerConfig;
use crate::core::screening::ScreeningCoordinator;
use crate::domain::ScreenerError;
use crate::report::{render, TrialMetadata};

/// Printed instead of a report when discovery finds nobody
pub const NO_CANDIDATES_MESSAGE: &str = "No lung cancer patients found for screening.";

/// Execute a screening run
///
/// Returns the process exit code: 0 on completion (including zero
/// candidates), 2 when the configuration cannot be turned into a client,
/// 4 when the FHIR server is unreachable, 5 on any other failure.
pub async fn execute(cli: &Cli, config: &ScreenerConfig) -> anyhow::Result<i32> {
    let max_patients = cli.resolve_max_patients(config.application.max_patients);
    tracing::info!(max_patients, "Starting screening command");

    let coordinator = match ScreeningCoordinator::new(config) {
        Ok(c) => c,
        Err(e) => {
            crate::log_error_with_context!(&e, "Failed to create screening coordinator");
            eprintln!("Failed to initialize screening: {e}");
            return Ok(2);
        }
    };

    let summary = match coordinator.execute_screening(max_patients).await {
        Ok(s) => s,
        Err(e @ ScreenerError::Connection(_)) => {
            tracing::error!(error = %e, "FHIR server unreachable");
            eprintln!("Cannot reach FHIR server: {e}");
            return Ok(4);
        }
        Err(e) => {
            tracing::error!(error = %e, "Screening failed");
            eprintln!("Screening failed: {e}");
            return Ok(5);
        }
    };

    summary.log_summary();

    if summary.has_no_candidates() {
        println!("{NO_CANDIDATES_MESSAGE}");
        return Ok(0);
    }

    let trial = TrialMetadata::new(config.trial.name.clone(), coordinator.reference_date());
    let report = render(&summary.assessments, &trial, config.report.format)?;
    println!("{report}");

    if !summary.is_complete() {
        eprintln!(
            "Warning: {} patient(s) could not be screened and are missing from the report",
            summary.dropped.len()
        );
    }

    Ok(0)
}
