//! Resilient fetcher
//!
//! Wraps the resource access port with bounded retry and full pagination.
//! Nothing raised by the port escapes this layer: `NotFound` means "no data"
//! straight away, other failures are retried and then also become "no data".

use crate::adapters::fhir::{FhirResult, Page, ResourceAccessPort, SearchQuery};
use crate::config::RetryConfig;
use crate::domain::errors::FhirError;
use crate::domain::resources::{FromResource, Resource};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Attempt limit and backoff schedule for one remote call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: usize,
    backoff: Vec<Duration>,
}

impl RetryPolicy {
    /// `max_attempts` counts the first call; zero is treated as one
    pub fn new(max_attempts: usize, backoff: Vec<Duration>) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            config
                .backoff_ms
                .iter()
                .map(|ms| Duration::from_millis(*ms))
                .collect(),
        )
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Delay after the given failed attempt (1-based); the last entry repeats
    pub fn delay_after(&self, attempt: usize) -> Duration {
        let index = attempt.saturating_sub(1);
        self.backoff
            .get(index)
            .or_else(|| self.backoff.last())
            .copied()
            .unwrap_or_default()
    }
}

impl Default for RetryPolicy {
    /// Three attempts with 1s, 2s, 4s delays
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

/// Port wrapper that never fails
///
/// Cloning is cheap; the port is shared behind an `Arc`.
#[derive(Clone)]
pub struct ResilientFetcher {
    port: Arc<dyn ResourceAccessPort>,
    policy: RetryPolicy,
}

impl ResilientFetcher {
    pub fn new(port: Arc<dyn ResourceAccessPort>, policy: RetryPolicy) -> Self {
        Self { port, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Runs `operation` under the retry policy
    ///
    /// Returns `None` on `NotFound` (after one call) or once every attempt
    /// has failed.
    pub async fn execute<T, F, Fut>(&self, description: &str, operation: F) -> Option<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = FhirResult<T>>,
    {
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;
            match operation().await {
                Ok(value) => return Some(value),
                Err(FhirError::NotFound(message)) => {
                    tracing::debug!(
                        operation = %description,
                        reason = %message,
                        "Resource not found, treating as no data"
                    );
                    return None;
                }
                Err(e) => {
                    if attempt >= max_attempts {
                        tracing::error!(
                            operation = %description,
                            attempts = attempt,
                            class = e.class(),
                            error = %e,
                            "Remote call failed after all retries, treating as no data"
                        );
                        return None;
                    }

                    let delay = self.policy.delay_after(attempt);
                    crate::log_retry_attempt!(
                        attempt,
                        max_attempts,
                        delay.as_millis() as u64,
                        description,
                        e
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Reads one resource by id
    pub async fn read<T: FromResource>(&self, id: &str) -> Option<T> {
        let description = format!("read {}/{}", T::RESOURCE_TYPE, id);
        let resource = self
            .execute(&description, || self.port.read(T::RESOURCE_TYPE, id))
            .await?;

        let resolved = T::from_resource(resource);
        if resolved.is_none() {
            tracing::warn!(
                operation = %description,
                "Server returned a different resource type"
            );
        }
        resolved
    }

    /// First page of a search, without following continuation links
    pub async fn search_page(&self, query: &SearchQuery) -> Option<Page> {
        let description = format!("search {query}");
        self.execute(&description, || self.port.search(query)).await
    }

    /// Resources of type `T` on the first page of a search
    pub async fn search_first<T: FromResource>(&self, query: &SearchQuery) -> Vec<T> {
        match self.search_page(query).await {
            Some(page) => resolve(page.resources),
            None => Vec::new(),
        }
    }

    /// Every resource of type `T` across all pages of a search
    ///
    /// A failing page ends pagination; everything collected before it is
    /// kept.
    pub async fn search_all<T: FromResource>(&self, query: &SearchQuery) -> Vec<T> {
        match self.search_page(query).await {
            Some(first) => {
                let description = format!("search {query}");
                resolve(self.collect_pages(first, &description).await)
            }
            None => Vec::new(),
        }
    }

    /// Follows continuation tokens from `first`, concatenating page contents
    pub async fn collect_pages(&self, first: Page, description: &str) -> Vec<Resource> {
        let mut resources = first.resources;
        let mut next = first.next;
        let mut pages = 1usize;

        while let Some(token) = next.take() {
            let page_description = format!("{description} (page {})", pages + 1);
            match self
                .execute(&page_description, || self.port.next_page(&token))
                .await
            {
                Some(page) => {
                    pages += 1;
                    resources.extend(page.resources);
                    next = page.next;
                }
                None => {
                    tracing::warn!(
                        operation = %description,
                        pages,
                        collected = resources.len(),
                        "Pagination stopped early, keeping partial results"
                    );
                }
            }
        }

        tracing::debug!(
            operation = %description,
            pages,
            count = resources.len(),
            "Pagination complete"
        );
        resources
    }
}

/// Resolves the union into one concrete type, dropping other variants
fn resolve<T: FromResource>(resources: Vec<Resource>) -> Vec<T> {
    let total = resources.len();
    let resolved: Vec<T> = resources.into_iter().filter_map(T::from_resource).collect();
    if resolved.len() < total {
        tracing::debug!(
            expected = %T::RESOURCE_TYPE,
            skipped = total - resolved.len(),
            "Ignoring resources of other types in search results"
        );
    }
    resolved
}
