//! RemoteClient — HTTP client for a running protgraph server
//!
//! Used by the CLI and as the network [`StatsSource`] of the dashboard
//! renderer.

use crate::catalog::ProteinRecord;
use crate::graph::CommunityAnalysis;
use crate::dashboard::{parse_snapshot, FetchError, FetchResult, StatsSource};
use crate::http::models::{LabelingResponse, ProteinDetails, SearchType};
use crate::labeling::TriggerState;
use crate::stats::{StatsDetails, StatsSnapshot};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur when talking to the server
#[derive(Error, Debug)]
pub enum ClientError {
    /// Connection or transfer failure
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// The request did not complete within the client timeout
    #[error("Request timed out")]
    Timeout,

    /// Non-success status
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Body could not be decoded
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// A labeling run is already in flight
    #[error("Labeling already in progress")]
    Busy,

    #[error("Failed to build HTTP client: {0}")]
    Build(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Http(e)
        }
    }
}

impl From<ClientError> for FetchError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Timeout => FetchError::Timeout(DEFAULT_TIMEOUT),
            ClientError::Status { status, .. } => FetchError::Protocol(status),
            ClientError::Decode(msg) => FetchError::Contract(msg),
            other => FetchError::Transport(other.to_string()),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Network client for the protgraph HTTP API
pub struct RemoteClient {
    http_base_url: String,
    http_client: Client,
    timeout: Duration,
}

impl RemoteClient {
    /// Create a client for the given base URL with the default timeout
    ///
    /// # Example
    /// ```no_run
    /// # use protgraph::client::RemoteClient;
    /// let client = RemoteClient::new("http://localhost:5000").unwrap();
    /// ```
    pub fn new(http_base_url: &str) -> ClientResult<Self> {
        Self::with_timeout(http_base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(http_base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;
        Ok(Self {
            http_base_url: http_base_url.trim_end_matches('/').to_string(),
            http_client,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.http_base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.http_base_url, path)
    }

    /// Turn a non-success response into [`ClientError::Status`]
    async fn check(response: Response) -> ClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let error_body: serde_json::Value = response
            .json()
            .await
            .unwrap_or_else(|_| serde_json::json!({"error": "Unknown error"}));
        let message = error_body
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        Err(ClientError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.http_client.get(self.url(path)).send().await?;
        Self::decode(Self::check(response).await?).await
    }

    /// `GET /api/stats`
    pub async fn stats(&self) -> ClientResult<StatsSnapshot> {
        let response = self.http_client.get(self.url("/api/stats")).send().await?;
        let bytes = Self::check(response).await?.bytes().await?;
        parse_snapshot(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// `GET /api/stats/details`
    pub async fn stats_details(&self) -> ClientResult<StatsDetails> {
        self.get_json("/api/stats/details").await
    }

    /// `GET /api/search`
    pub async fn search(&self, query: &str, search_type: SearchType) -> ClientResult<Vec<ProteinRecord>> {
        let response = self
            .http_client
            .get(self.url("/api/search"))
            .query(&[("q", query), ("type", search_type.as_str())])
            .send()
            .await?;
        Self::decode(Self::check(response).await?).await
    }

    /// `GET /api/protein/:id`; `None` when the server knows nothing about it
    pub async fn protein(&self, uniprot_id: &str, depth: usize) -> ClientResult<Option<ProteinDetails>> {
        let response = self
            .http_client
            .get(self.url(&format!("/api/protein/{}", uniprot_id)))
            .query(&[("depth", depth)])
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(uniprot_id, "protein not found");
            return Ok(None);
        }
        Self::decode(Self::check(response).await?).await.map(Some)
    }

    /// `GET /api/communities`
    pub async fn communities(&self) -> ClientResult<CommunityAnalysis> {
        self.get_json("/api/communities").await
    }

    /// `POST /api/labeling`; waits for the run to settle
    pub async fn start_labeling(&self) -> ClientResult<LabelingResponse> {
        let response = self.http_client.post(self.url("/api/labeling")).send().await?;
        if response.status() == StatusCode::CONFLICT {
            return Err(ClientError::Busy);
        }
        Self::decode(Self::check(response).await?).await
    }

    /// `GET /api/labeling`
    pub async fn labeling_state(&self) -> ClientResult<TriggerState> {
        self.get_json("/api/labeling").await
    }
}

#[async_trait]
impl StatsSource for RemoteClient {
    async fn fetch_stats(&self) -> FetchResult<StatsSnapshot> {
        self.stats().await.map_err(|e| match e {
            ClientError::Timeout => FetchError::Timeout(self.timeout),
            other => other.into(),
        })
    }
}
