// Trial Screener - FHIR Clinical Trial Eligibility Screener
// Copyright (c) 2025 Trial Screener Contributors
// Licensed under the MIT License

//! # Trial Screener - FHIR Clinical Trial Eligibility Screener
//!
//! Screens patients held on a FHIR R4 server against the eligibility
//! criteria of a Phase II advanced non-small cell lung cancer (NSCLC) trial.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Discovering** candidate patients with escalating condition searches
//! - **Assembling** each candidate's record with bounded retry and pagination
//! - **Evaluating** nine inclusion and exclusion criteria as Met, NotMet or Unknown
//! - **Reporting** the results as text or JSON
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Fetcher, discovery, assembler, evaluator, aggregator and scheduler
//! - [`adapters`] - FHIR server access behind the [`adapters::fhir::ResourceAccessPort`] trait
//! - [`domain`] - Error taxonomy, identifiers, FHIR resources, records and assessments
//! - [`report`] - Text and JSON report rendering
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use trial_screener::config::load_config;
//! use trial_screener::core::screening::ScreeningCoordinator;
//! use trial_screener::report::{render, TrialMetadata};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("screener.toml")?;
//!     let coordinator = ScreeningCoordinator::new(&config)?;
//!
//!     let summary = coordinator.execute_screening(100).await?;
//!
//!     let trial = TrialMetadata::new(config.trial.name.clone(), coordinator.reference_date());
//!     println!("{}", render(&summary.assessments, &trial, config.report.format)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Missing Data
//!
//! Retrieval failures never abort a screening run. `NotFound` answers and
//! exhausted retries become empty parts of the patient record, which the
//! evaluator reports as `Unknown` criteria naming the missing element. A
//! patient with `Unknown` but no failed criteria is reported as potentially
//! eligible.
//!
//! ## Error Handling
//!
//! Fallible operations return [`domain::Result`], an alias over
//! [`domain::ScreenerError`]:
//!
//! ```rust,no_run
//! use trial_screener::domain::ScreenerError;
//!
//! fn example() -> Result<(), ScreenerError> {
//!     let _config = trial_screener::config::load_config("screener.toml")?;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
pub mod report;
