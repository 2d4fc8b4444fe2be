//! Screening coordinator - orchestrates one screening run
//!
//! Wires the FHIR client, fetcher, discovery, assembler, evaluator and
//! scheduler together and runs them in order: health check, discovery,
//! then concurrent screening of the discovered candidates.

use crate::adapters::fhir::{FhirClient, ResourceAccessPort};
use crate::config::ScreenerConfig;
use crate::core::assembler::RecordAssembler;
use crate::core::discovery::PatientDiscovery;
use crate::core::evaluator::CriteriaEvaluator;
use crate::core::fetch::{ResilientFetcher, RetryPolicy};
use crate::core::screening::scheduler::ScreeningScheduler;
use crate::core::screening::summary::ScreeningSummary;
use crate::domain::{Result, ScreenerError};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Screening coordinator
pub struct ScreeningCoordinator {
    client: FhirClient,
    fetcher: ResilientFetcher,
    discovery: PatientDiscovery,
    assembler: Arc<RecordAssembler>,
    evaluator: Arc<CriteriaEvaluator>,
    scheduler: ScreeningScheduler,
}

impl ScreeningCoordinator {
    /// Create a coordinator talking to the configured FHIR server
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or the evaluator cannot be built.
    pub fn new(config: &ScreenerConfig) -> Result<Self> {
        let client = FhirClient::new(&config.fhir)?;
        Self::with_client(client, config)
    }

    /// Create a coordinator over an existing port
    pub fn from_port(port: Arc<dyn ResourceAccessPort>, config: &ScreenerConfig) -> Result<Self> {
        Self::with_client(FhirClient::from_port(port), config)
    }

    fn with_client(client: FhirClient, config: &ScreenerConfig) -> Result<Self> {
        let fetcher = ResilientFetcher::new(
            client.port(),
            RetryPolicy::from_config(&config.fhir.retry),
        );

        Ok(Self {
            discovery: PatientDiscovery::new(fetcher.clone(), config.discovery.clone()),
            assembler: Arc::new(RecordAssembler::new(fetcher.clone())),
            fetcher,
            evaluator: Arc::new(CriteriaEvaluator::new(&config.screening)?),
            scheduler: ScreeningScheduler::new(config.screening.worker_pool_size),
            client,
        })
    }

    /// Date ages and recency windows are measured against
    pub fn reference_date(&self) -> chrono::NaiveDate {
        self.evaluator.reference_date()
    }

    /// Capability check under the retry policy
    ///
    /// Fails only once every attempt has failed.
    async fn check_server(&self) -> Result<()> {
        let port = self.client.port();
        let reachable = self
            .fetcher
            .execute("health check", || port.capabilities())
            .await;

        match reachable {
            Some(()) => {
                tracing::info!(
                    base_url = self.client.base_url(),
                    "FHIR server health check passed"
                );
                Ok(())
            }
            None => Err(ScreenerError::Connection(format!(
                "FHIR server at {} did not answer its capability endpoint after {} attempt(s)",
                self.client.base_url(),
                self.fetcher.policy().max_attempts()
            ))),
        }
    }

    /// Execute one screening run
    ///
    /// This is the main entry point. It:
    /// 1. Checks the FHIR server answers its capability endpoint, retrying
    ///    under the fetch retry policy
    /// 2. Discovers up to `max_patients` candidates
    /// 3. Assembles and assesses every candidate concurrently
    ///
    /// # Errors
    ///
    /// Only the health check can fail the run (`ScreenerError::Connection`).
    /// Retrieval problems after that become missing data, and failed
    /// candidates are listed in [`ScreeningSummary::dropped`].
    pub async fn execute_screening(&self, max_patients: usize) -> Result<ScreeningSummary> {
        let start_time = Instant::now();
        let mut summary = ScreeningSummary::new(Uuid::new_v4());

        tracing::info!(
            run_id = %summary.run_id,
            base_url = self.client.base_url(),
            max_patients,
            "Starting screening run"
        );

        self.check_server().await?;

        let candidates = self.discovery.discover(max_patients).await;
        summary.candidates = candidates.len();

        if candidates.is_empty() {
            tracing::warn!(run_id = %summary.run_id, "No candidate patients found");
            return Ok(summary.with_duration(start_time.elapsed()));
        }

        crate::log_screening_start!(candidates.len(), self.scheduler.width());

        let outcome = self
            .scheduler
            .screen(
                candidates,
                Arc::clone(&self.assembler),
                Arc::clone(&self.evaluator),
            )
            .await;
        summary.assessments = outcome.assessments;
        summary.dropped = outcome.dropped;

        let summary = summary.with_duration(start_time.elapsed());
        crate::log_screening_complete!(
            summary.assessments.len(),
            summary.dropped.len(),
            summary.duration
        );
        Ok(summary)
    }
}
