//! Core screening logic
//!
//! # Modules
//!
//! - [`fetch`] - resilient fetcher: bounded retry and pagination over the port
//! - [`discovery`] - candidate discovery with escalating search strategies
//! - [`assembler`] - per-patient record assembly
//! - [`evaluator`] - the nine eligibility criteria
//! - [`aggregate`] - overall status from evaluated criteria
//! - [`screening`] - scheduler, coordinator and run summary
//!
//! # Screening Workflow
//!
//! 1. **Health check**: confirm the FHIR server answers `GET /metadata`
//! 2. **Discover**: collect candidate patient ids (single task)
//! 3. **Assemble**: fetch each candidate's record (bounded concurrency)
//! 4. **Evaluate**: apply the criteria and aggregate the status
//! 5. **Report**: hand the assessments to [`crate::report`]
//!
//! # Example
//!
//! ```rust,no_run
//! use trial_screener::config::load_config;
//! use trial_screener::core::screening::ScreeningCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("screener.toml")?;
//! let coordinator = ScreeningCoordinator::new(&config)?;
//!
//! let summary = coordinator.execute_screening(100).await?;
//! summary.log_summary();
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod assembler;
pub mod discovery;
pub mod evaluator;
pub mod fetch;
pub mod screening;
