//! Candidate patient discovery
//!
//! Builds the set of candidate patient ids with up to three search
//! strategies, each run only while the set is still below the requested
//! maximum:
//!
//! 1. condition search by SNOMED code
//! 2. one free-text condition search per configured phrase
//! 3. a broad condition batch filtered locally by keyword
//!
//! Only the first page of each search is read. The set never grows past the
//! maximum, and ordering carries no ranking.

use crate::adapters::fhir::SearchQuery;
use crate::config::DiscoveryConfig;
use crate::core::fetch::ResilientFetcher;
use crate::domain::ids::PatientId;
use crate::domain::resources::{Condition, ResourceType};
use std::collections::BTreeSet;
use std::fmt;

/// Search strategy used by [`PatientDiscovery`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryStrategy {
    /// Conditions with one of the configured codes
    CodeSearch,
    /// Conditions whose text matches a configured phrase
    TextSearch,
    /// Any conditions, filtered by keyword on this side
    BroadSearch,
}

impl DiscoveryStrategy {
    /// All strategies in escalation order
    pub const ALL: [DiscoveryStrategy; 3] = [
        DiscoveryStrategy::CodeSearch,
        DiscoveryStrategy::TextSearch,
        DiscoveryStrategy::BroadSearch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiscoveryStrategy::CodeSearch => "code",
            DiscoveryStrategy::TextSearch => "text",
            DiscoveryStrategy::BroadSearch => "broad",
        }
    }
}

impl fmt::Display for DiscoveryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Finds candidate patients for screening
pub struct PatientDiscovery {
    fetcher: ResilientFetcher,
    config: DiscoveryConfig,
}

impl PatientDiscovery {
    pub fn new(fetcher: ResilientFetcher, config: DiscoveryConfig) -> Self {
        Self { fetcher, config }
    }

    /// Runs every strategy in escalation order
    pub async fn discover(&self, max_count: usize) -> BTreeSet<PatientId> {
        self.discover_with(&DiscoveryStrategy::ALL, max_count).await
    }

    /// Runs the given strategies in order until `max_count` ids are known
    pub async fn discover_with(
        &self,
        strategies: &[DiscoveryStrategy],
        max_count: usize,
    ) -> BTreeSet<PatientId> {
        let mut ids = BTreeSet::new();
        tracing::info!(max_count, "Searching for lung cancer patients");

        for strategy in strategies {
            if ids.len() >= max_count {
                break;
            }
            let before = ids.len();

            match strategy {
                DiscoveryStrategy::CodeSearch => self.search_by_code(&mut ids, max_count).await,
                DiscoveryStrategy::TextSearch => self.search_by_text(&mut ids, max_count).await,
                DiscoveryStrategy::BroadSearch => self.search_broad(&mut ids, max_count).await,
            }

            tracing::info!(
                strategy = %strategy,
                added = ids.len() - before,
                total = ids.len(),
                "Discovery strategy finished"
            );
        }

        tracing::info!(total = ids.len(), "Candidate discovery complete");
        ids
    }

    async fn search_by_code(&self, ids: &mut BTreeSet<PatientId>, max_count: usize) {
        let query = SearchQuery::new(ResourceType::Condition)
            .param("code", self.config.condition_codes.join(","))
            .page_size(max_count.saturating_mul(self.config.code_search_multiplier));

        let conditions: Vec<Condition> = self.fetcher.search_first(&query).await;
        collect_subjects(conditions.iter(), ids, max_count);
    }

    async fn search_by_text(&self, ids: &mut BTreeSet<PatientId>, max_count: usize) {
        for term in &self.config.text_terms {
            if ids.len() >= max_count {
                break;
            }

            let query = SearchQuery::new(ResourceType::Condition)
                .param("code:text", term.as_str())
                .page_size(max_count);

            // A failed term yields nothing and the next term is tried
            let conditions: Vec<Condition> = self.fetcher.search_first(&query).await;
            tracing::debug!(term = %term, matches = conditions.len(), "Text search finished");
            collect_subjects(conditions.iter(), ids, max_count);
        }
    }

    async fn search_broad(&self, ids: &mut BTreeSet<PatientId>, max_count: usize) {
        let query = SearchQuery::new(ResourceType::Condition)
            .page_size(max_count.saturating_mul(self.config.broad_search_multiplier));

        let conditions: Vec<Condition> = self.fetcher.search_first(&query).await;
        let keywords: Vec<String> = self
            .config
            .broad_keywords
            .iter()
            .map(|k| k.to_lowercase())
            .collect();

        let related = conditions
            .iter()
            .filter(|condition| is_potentially_lung_related(condition, &keywords));
        collect_subjects(related, ids, max_count);
    }
}

fn is_potentially_lung_related(condition: &Condition, keywords: &[String]) -> bool {
    let Some(code) = condition.code.as_ref() else {
        return false;
    };
    let text = code.searchable_text();
    keywords.iter().any(|k| text.contains(k.as_str()))
}

fn collect_subjects<'a>(
    conditions: impl Iterator<Item = &'a Condition>,
    ids: &mut BTreeSet<PatientId>,
    max_count: usize,
) {
    for condition in conditions {
        if ids.len() >= max_count {
            break;
        }
        if let Some(id) = condition.subject_patient_id() {
            ids.insert(id);
        }
    }
}
