//! FHIR client wrapper
//!
//! Wraps a shared [`ResourceAccessPort`] and adds the startup health check.

use super::http::FhirHttpClient;
use super::port::ResourceAccessPort;
use crate::config::FhirConfig;
use crate::domain::{Result, ScreenerError};
use std::sync::Arc;

/// FHIR client that wraps a port implementation
///
/// The port is shared read-only by every screening unit.
#[derive(Clone)]
pub struct FhirClient {
    port: Arc<dyn ResourceAccessPort>,
}

impl FhirClient {
    /// Create a client backed by the reqwest implementation
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built from `config`.
    pub fn new(config: &FhirConfig) -> Result<Self> {
        let port = FhirHttpClient::new(config)?;
        tracing::debug!(base_url = %port.base_url(), "FHIR client created");
        Ok(Self {
            port: Arc::new(port),
        })
    }

    /// Create a client around an existing port (used with in-memory fakes)
    pub fn from_port(port: Arc<dyn ResourceAccessPort>) -> Self {
        Self { port }
    }

    /// Shared handle to the underlying port
    pub fn port(&self) -> Arc<dyn ResourceAccessPort> {
        Arc::clone(&self.port)
    }

    /// Verify the server is reachable by reading its capability statement
    ///
    /// # Errors
    ///
    /// Returns `ScreenerError::Connection` if the server cannot be reached or
    /// does not answer with a capability statement.
    pub async fn health_check(&self) -> Result<()> {
        match self.port.capabilities().await {
            Ok(()) => {
                tracing::info!(
                    base_url = self.port.base_url(),
                    "FHIR server health check passed"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    base_url = self.port.base_url(),
                    error = %e,
                    "FHIR server health check failed"
                );
                Err(ScreenerError::Connection(format!(
                    "FHIR server at {} is not reachable: {}",
                    self.port.base_url(),
                    e
                )))
            }
        }
    }

    /// Base URL of the FHIR server
    pub fn base_url(&self) -> &str {
        self.port.base_url()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn config_for(url: String) -> FhirConfig {
        FhirConfig {
            base_url: url,
            timeout_seconds: 5,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_health_check_passes() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/metadata")
            .with_status(200)
            .with_header("content-type", "application/fhir+json")
            .with_body(r#"{"resourceType":"CapabilityStatement","fhirVersion":"4.0.1"}"#)
            .create_async()
            .await;

        let client = FhirClient::new(&config_for(server.url())).unwrap();
        assert!(client.health_check().await.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_health_check_fails_on_server_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/metadata")
            .with_status(503)
            .create_async()
            .await;

        let client = FhirClient::new(&config_for(server.url())).unwrap();
        let err = client.health_check().await.unwrap_err();
        assert!(matches!(err, ScreenerError::Connection(_)));
    }

    #[tokio::test]
    async fn test_client_base_url() {
        let client = FhirClient::new(&config_for("http://localhost:8080/fhir/".to_string())).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/fhir");
        assert_eq!(client.port().base_url(), "http://localhost:8080/fhir");
    }
}
