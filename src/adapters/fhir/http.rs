//! HTTP implementation of the resource access port
//!
//! Talks FHIR R4 REST over reqwest. Transport and status failures are mapped
//! onto the [`FhirError`] classes so that no reqwest type leaks past this
//! module.

use super::models::Bundle;
use super::port::{FhirResult, Page, PageToken, ResourceAccessPort, SearchQuery};
use crate::config::FhirConfig;
use crate::domain::errors::{FhirError, ScreenerError};
use crate::domain::resources::{Resource, ResourceType};
use crate::domain::result::Result;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode};
use std::time::Duration;
use url::Url;

const FHIR_JSON: &str = "application/fhir+json";

/// reqwest-backed FHIR client
///
/// # Example
///
/// ```no_run
/// use trial_screener::adapters::fhir::{FhirHttpClient, ResourceAccessPort};
/// use trial_screener::config::FhirConfig;
///
/// # async fn example() -> trial_screener::domain::Result<()> {
/// let client = FhirHttpClient::new(&FhirConfig::default())?;
/// client.capabilities().await?;
/// # Ok(())
/// # }
/// ```
pub struct FhirHttpClient {
    base_url: String,
    client: Client,
}

impl FhirHttpClient {
    /// Create a new client from configuration
    ///
    /// # Errors
    ///
    /// Returns `ScreenerError::Configuration` if the base URL does not parse
    /// or the HTTP client cannot be built.
    pub fn new(config: &FhirConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| {
            ScreenerError::Configuration(format!("Invalid FHIR base URL '{base_url}': {e}"))
        })?;

        let mut client_builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds.min(30)));

        if !config.tls_verify {
            tracing::warn!("TLS certificate verification disabled for FHIR server");
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder.build().map_err(|e| {
            ScreenerError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;

        Ok(Self { base_url, client })
    }

    fn parse_url(&self, raw: &str) -> FhirResult<Url> {
        Url::parse(raw).map_err(|e| FhirError::Fatal(format!("Invalid request URL '{raw}': {e}")))
    }

    fn search_url(&self, query: &SearchQuery) -> FhirResult<Url> {
        let mut url = self.parse_url(&format!("{}/{}", self.base_url, query.resource_type()))?;
        let pairs = query.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }

    /// Resolves a continuation link, which may be relative to the base URL
    fn page_url(&self, token: &PageToken) -> FhirResult<Url> {
        match Url::parse(token.as_str()) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = self.parse_url(&format!("{}/", self.base_url))?;
                base.join(token.as_str().trim_start_matches('/'))
                    .map_err(|e| FhirError::Fatal(format!("Invalid next link '{token}': {e}")))
            }
            Err(e) => Err(FhirError::Fatal(format!("Invalid next link '{token}': {e}"))),
        }
    }

    /// Issues one GET and returns the decoded JSON body
    async fn get_json(&self, url: Url) -> FhirResult<serde_json::Value> {
        tracing::trace!(url = %url, "FHIR GET");

        let response = self
            .client
            .get(url.clone())
            .header("Accept", FHIR_JSON)
            .send().await.map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &format!("GET {url}"), &body));
        }

        response.json::<serde_json::Value>().await.map_err(|e| {
            if e.is_timeout() {
                FhirError::Transient(format!("Timed out reading response from {url}: {e}"))
            } else {
                FhirError::Fatal(format!("Invalid JSON from {url}: {e}"))
            }
        })
    }

    async fn get_page(&self, url: Url) -> FhirResult<Page> {
        let body = self.get_json(url.clone()).await?;
        let bundle: Bundle = serde_json::from_value(body)
            .map_err(|e| FhirError::Fatal(format!("Invalid Bundle from {url}: {e}")))?;

        if !bundle.is_bundle() {
            return Err(FhirError::Fatal(format!(
                "Expected Bundle from {url}, got {}",
                bundle.resource_type.as_deref().unwrap_or("unknown")
            )));
        }

        let next = bundle.next_link().map(PageToken::new);
        let resources = bundle.into_resources();
        tracing::debug!(
            url = %url,
            count = resources.len(),
            has_next = next.is_some(),
            "Fetched search page"
        );

        Ok(Page::new(resources, next))
    }
}

/// Maps a non-success HTTP status onto the port's failure classes
pub(crate) fn classify_status(status: StatusCode, context: &str, body: &str) -> FhirError {
    let message = if body.is_empty() {
        format!("{context} returned {status}")
    } else {
        let snippet: String = body.chars().take(200).collect();
        format!("{context} returned {status}: {snippet}")
    };

    match status {
        StatusCode::NOT_FOUND | StatusCode::GONE => FhirError::NotFound(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => FhirError::Transient(message),
        s if s.is_server_error() => FhirError::Transient(message),
        _ => FhirError::Fatal(message),
    }
}

fn classify_transport_error(e: reqwest::Error) -> FhirError {
    if e.is_builder() {
        FhirError::Fatal(format!("Invalid request: {e}"))
    } else {
        FhirError::Transient(format!("Connection failed: {e}"))
    }
}

#[async_trait]
impl ResourceAccessPort for FhirHttpClient {
    async fn read(&self, resource_type: ResourceType, id: &str) -> FhirResult<Resource> {
        let url = self.parse_url(&format!("{}/{}/{}", self.base_url, resource_type, id))?;
        let body = self.get_json(url).await?;
        let resource: Resource = serde_json::from_value(body)
            .map_err(|e| FhirError::Fatal(format!("Invalid {resource_type} {id}: {e}")))?;

        match resource.resource_type() {
            Some(actual) if actual == resource_type => Ok(resource),
            _ => Err(FhirError::Fatal(format!(
                "Expected {resource_type} for id {id}, got a different resource type"
            ))),
        }
    }

    async fn search(&self, query: &SearchQuery) -> FhirResult<Page> {
        let url = self.search_url(query)?;
        self.get_page(url).await
    }

    async fn next_page(&self, token: &PageToken) -> FhirResult<Page> {
        let url = self.page_url(token)?;
        self.get_page(url).await
    }

    async fn capabilities(&self) -> FhirResult<()> {
        let url = self.parse_url(&format!("{}/metadata", self.base_url))?;
        let body = self.get_json(url).await?;
        match body.get("resourceType").and_then(|v| v.as_str()) {
            Some("CapabilityStatement") | None => Ok(()),
            Some(other) => Err(FhirError::Fatal(format!(
                "Expected CapabilityStatement from /metadata, got {other}"
            ))),
        }
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
