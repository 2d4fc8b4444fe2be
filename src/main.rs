// Trial Screener - FHIR Clinical Trial Eligibility Screener
// Copyright (c) 2025 Trial Screener Contributors
// Licensed under the MIT License

use clap::Parser;
use std::process;
use trial_screener::cli::{self, Cli};
use trial_screener::config::load_config_or_default;
use trial_screener::logging::init_logging;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config_path = cli::config_path_from_env();
    let config = match load_config_or_default(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            process::exit(2);
        }
    };

    let guard = match init_logging(&config.application.log_level, &config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Trial Screener - FHIR Clinical Trial Eligibility Screener"
    );

    let exit_code = match cli::screen::execute(&cli, &config).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5
        }
    };

    // Flush file logs before exiting
    drop(guard);
    process::exit(exit_code);
}
