//! Resource access port
//!
//! This module defines the `ResourceAccessPort` trait that abstracts the wire
//! client used to talk to a FHIR server. The core only sees this trait, so it
//! can run against the reqwest implementation or an in-memory fake.

use crate::domain::errors::FhirError;
use crate::domain::resources::{Resource, ResourceType};
use async_trait::async_trait;
use std::fmt;

/// Result type for port operations
pub type FhirResult<T> = std::result::Result<T, FhirError>;

/// Opaque continuation token for the next page of a search
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageToken(String);

impl PageToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    /// Resources in server order
    pub resources: Vec<Resource>,
    /// Token for the following page, if any
    pub next: Option<PageToken>,
}

impl Page {
    pub fn new(resources: Vec<Resource>, next: Option<PageToken>) -> Self {
        Self { resources, next }
    }

    /// A page with no continuation
    pub fn last(resources: Vec<Resource>) -> Self {
        Self {
            resources,
            next: None,
        }
    }
}

/// A search against one resource type
///
/// # Example
///
/// ```
/// use trial_screener::adapters::fhir::SearchQuery;
/// use trial_screener::domain::ResourceType;
///
/// let query = SearchQuery::new(ResourceType::Condition)
///     .param("patient", "123")
///     .page_size(100);
/// assert_eq!(query.to_string(), "Condition?patient=123&_count=100");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    resource_type: ResourceType,
    params: Vec<(String, String)>,
    page_size: Option<usize>,
}

impl SearchQuery {
    pub fn new(resource_type: ResourceType) -> Self {
        Self {
            resource_type,
            params: Vec::new(),
            page_size: None,
        }
    }

    /// Adds a search parameter; repeated names are kept in order
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Sets `_count`
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// The requested `_count`, if set
    pub fn count(&self) -> Option<usize> {
        self.page_size
    }

    /// Value of the first parameter with the given name
    pub fn param_value(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// All query pairs including `_count`
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = self.params.clone();
        if let Some(size) = self.page_size {
            pairs.push(("_count".to_string(), size.to_string()));
        }
        pairs
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resource_type)?;
        let pairs = self.query_pairs();
        for (i, (name, value)) in pairs.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{name}={value}")?;
        }
        Ok(())
    }
}

/// Trait for FHIR resource access
///
/// Every call yields a value or one of the [`FhirError`] classes. Retrying is
/// the caller's concern; implementations issue exactly one request per call.
#[async_trait]
pub trait ResourceAccessPort: Send + Sync {
    /// Read a single resource by type and logical id
    ///
    /// # Errors
    ///
    /// `FhirError::NotFound` when the resource does not exist.
    async fn read(&self, resource_type: ResourceType, id: &str) -> FhirResult<Resource>;

    /// Run a search and return its first page
    async fn search(&self, query: &SearchQuery) -> FhirResult<Page>;

    /// Fetch the page a continuation token points to
    async fn next_page(&self, token: &PageToken) -> FhirResult<Page>;

    /// Probe the server's capability statement
    async fn capabilities(&self) -> FhirResult<()>;

    /// Base URL of the server
    fn base_url(&self) -> &str;
}
