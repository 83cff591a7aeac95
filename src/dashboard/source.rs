//! Where the dashboard gets its statistics from

use crate::stats::{Aggregator, StatsSnapshot};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Why a statistics fetch produced no usable snapshot
///
/// The kinds are only ever logged; every kind ends in the same view.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request never completed
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The request did not complete in time
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The response carried a non-success status
    #[error("Unexpected HTTP status {0}")]
    Protocol(u16),

    /// The body is not JSON, lacks a field, or is internally inconsistent
    #[error("Invalid stats payload: {0}")]
    Contract(String),
}

impl FetchError {
    /// Short name of the failure kind, for logs
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport(_) | FetchError::Timeout(_) => "transport",
            FetchError::Protocol(_) => "protocol",
            FetchError::Contract(_) => "contract",
        }
    }
}

pub type FetchResult<T> = Result<T, FetchError>;

/// Decode a response body into a snapshot
pub fn parse_snapshot(body: &[u8]) -> FetchResult<StatsSnapshot> {
    serde_json::from_slice(body).map_err(|e| FetchError::Contract(e.to_string()))
}

/// Provider of one statistics snapshot per call
#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn fetch_stats(&self) -> FetchResult<StatsSnapshot>;
}

/// In-process source, used by the server's own dashboard page
#[async_trait]
impl StatsSource for Aggregator {
    async fn fetch_stats(&self) -> FetchResult<StatsSnapshot> {
        Ok(self.snapshot().await)
    }
}

#[async_trait]
impl<S: StatsSource + ?Sized> StatsSource for std::sync::Arc<S> {
    async fn fetch_stats(&self) -> FetchResult<StatsSnapshot> {
        (**self).fetch_stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_snapshot() {
        let body = br#"{"mongo": {"total_proteins": 3, "labeled_proteins": 1, "unlabeled_proteins": 2},
                        "neo4j": {"isolated_proteins": 1, "total_similarities": 4}}"#;
        assert_eq!(parse_snapshot(body).unwrap(), StatsSnapshot::new(3, 1, 1, 4));
    }

    #[test]
    fn test_parse_failures_are_contract_errors() {
        let err = parse_snapshot(b"<html>oops</html>").unwrap_err();
        assert_eq!(err.kind(), "contract");

        let err = parse_snapshot(br#"{"mongo": {"total_proteins": 3}}"#).unwrap_err();
        assert_eq!(err.kind(), "contract");
    }

    #[test]
    fn test_kinds() {
        assert_eq!(FetchError::Timeout(Duration::from_secs(1)).kind(), "transport");
        assert_eq!(FetchError::Protocol(503).kind(), "protocol");
    }
}
