//! Fetch-and-render driver for the dashboard

use super::source::{FetchError, FetchResult, StatsSource};
use super::surface::Surface;
use super::view::DashboardView;
use crate::stats::StatsSnapshot;
use std::time::Duration;
use tracing::{debug, warn};

/// Default bound on one statistics fetch
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Turns one statistics fetch into one [`DashboardView`]
///
/// Each call issues exactly one fetch. Failures are logged and collapsed into
/// [`DashboardView::failed`]; there is no retry.
pub struct DashboardRenderer<S> {
    source: S,
    timeout: Duration,
}

impl<S: StatsSource> DashboardRenderer<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn fetch(&self) -> FetchResult<StatsSnapshot> {
        let snapshot = tokio::time::timeout(self.timeout, self.source.fetch_stats())
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))??;

        if !snapshot.is_consistent() {
            return Err(FetchError::Contract(format!(
                "labeled ({}) + unlabeled ({}) != total ({})",
                snapshot.documents.labeled_proteins,
                snapshot.documents.unlabeled_proteins,
                snapshot.documents.total_proteins
            )));
        }
        Ok(snapshot)
    }

    /// Fetch once and project the outcome into a view
    pub async fn build_view(&self) -> DashboardView {
        match self.fetch().await {
            Ok(snapshot) => {
                debug!(?snapshot, "rendering dashboard");
                DashboardView::from_snapshot(&snapshot)
            }
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "Failed to load statistics");
                DashboardView::failed()
            }
        }
    }

    /// Fetch once, apply the resulting view to `surface` and return it
    pub async fn fetch_and_render<U: Surface + ?Sized>(&self, surface: &mut U) -> DashboardView {
        let view = self.build_view().await;
        surface.apply(&view);
        view
    }
}
