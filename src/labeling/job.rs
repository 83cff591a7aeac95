//! Labeling jobs
//!
//! A job is whatever work a labeling click starts. The trigger only sees the
//! [`LabelingJob`] trait, so the simulated job can be swapped for a remote one
//! without touching the disable/progress/re-enable bracket.

use super::{LabelingError, LabelingResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Message reported by the simulated job
pub const SIMULATED_MESSAGE: &str = "Labeling completed successfully (simulated run).";

/// What a finished job reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelingOutcome {
    pub message: String,
}

/// One labeling run
#[async_trait]
pub trait LabelingJob: Send + Sync {
    async fn run(&self) -> LabelingResult<LabelingOutcome>;
}

/// Placeholder job: waits, then reports success without contacting anything
#[derive(Debug, Clone)]
pub struct SimulatedLabelingJob {
    delay: Duration,
}

impl SimulatedLabelingJob {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl LabelingJob for SimulatedLabelingJob {
    async fn run(&self) -> LabelingResult<LabelingOutcome> {
        debug!("Simulated labeling run for {:?}", self.delay);
        tokio::time::sleep(self.delay).await;
        Ok(LabelingOutcome {
            message: SIMULATED_MESSAGE.to_string(),
        })
    }
}

/// Job backed by an HTTP labeling endpoint
///
/// Sends `POST <endpoint>` and expects `{"message": "..."}` on success.
pub struct RemoteLabelingJob {
    endpoint: String,
    http_client: Client,
}

impl RemoteLabelingJob {
    pub fn new(endpoint: &str, timeout: Duration) -> LabelingResult<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.to_string(),
            http_client,
        })
    }
}

#[async_trait]
impl LabelingJob for RemoteLabelingJob {
    async fn run(&self) -> LabelingResult<LabelingOutcome> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&serde_json::json!({}))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LabelingError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| LabelingError::InvalidResponse(e.to_string()))
    }
}
