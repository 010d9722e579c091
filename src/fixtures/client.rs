//! HTTP client for the fixtures endpoint
//!
//! Fetches the fixture list as JSON from a configurable URL. The fetch seam
//! is the `FetchFixtures` trait so the refresh orchestrator can be exercised
//! against scripted fetchers in tests; `HttpFixturesClient` is the real
//! implementation backed by reqwest.

use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use reqwest::{header, Client};
use serde::Deserialize;
use thiserror::Error;

use super::Fixture;
use crate::cancel::CancelToken;

/// HTTP request timeout. Fixture feeds answer quickly; anything slower than
/// this should fail fast so a later revalidation can retry.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur when fetching fixtures
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request could not be sent or the transport failed mid-flight
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status
    #[error("HTTP {0} from fixtures endpoint")]
    Status(u16),

    /// Endpoint answered with something other than JSON
    #[error("Non-JSON response from fixtures endpoint (content type: {0})")]
    NonJson(String),

    /// Body was JSON but not the expected shape
    #[error("Failed to parse fixtures response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Request was superseded or the orchestrator shut down
    #[error("request cancelled")]
    Cancelled,
}

impl FetchError {
    /// Cancellation is expected control flow, not a reportable failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}

/// Seam between the refresh orchestrator and the network.
///
/// Implementations must observe the cancellation token: once it fires, the
/// returned future should settle as `FetchError::Cancelled` rather than
/// deliver a result that nobody will adopt.
pub trait FetchFixtures: Send + Sync {
    fn fetch(&self, url: &str, token: CancelToken)
        -> BoxFuture<'static, Result<Vec<Fixture>, FetchError>>;
}

/// Expected response envelope from the fixtures endpoint
#[derive(Debug, Deserialize)]
struct FixturesResponse {
    fixtures: Vec<Fixture>,
}

/// Client for fetching fixtures over HTTP
#[derive(Debug, Clone, Default)]
pub struct HttpFixturesClient {
    client: Client,
}

impl HttpFixturesClient {
    /// Creates a new client with default settings
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Creates a client around a custom reqwest client
    #[allow(dead_code)]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn fetch_inner(&self, url: &str) -> Result<Vec<Fixture>, FetchError> {
        let response = self
            .client
            .get(url)
            .timeout(REQUEST_TIMEOUT)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !content_type.starts_with("application/json") {
            return Err(FetchError::NonJson(content_type));
        }

        let text = response.text().await?;
        let body: FixturesResponse = serde_json::from_str(&text)?;
        Ok(body.fixtures)
    }
}

impl FetchFixtures for HttpFixturesClient {
    fn fetch(
        &self,
        url: &str,
        token: CancelToken,
    ) -> BoxFuture<'static, Result<Vec<Fixture>, FetchError>> {
        let client = self.clone();
        let url = url.to_string();
        async move {
            // Biased so an already-cancelled token never races the request.
            tokio::select! {
                biased;
                _ = token.cancelled() => Err(FetchError::Cancelled),
                result = client.fetch_inner(&url) => result,
            }
        }
        .boxed()
    }
}
