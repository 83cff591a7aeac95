//! Statistics aggregation over the catalog and the similarity graph

use super::snapshot::{DocumentCounts, GraphCounts, StatsSnapshot};
use crate::catalog::{CatalogStatistics, ProteinCatalog};
use crate::graph::{GraphStatistics, SimilarityGraph};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Detailed statistics served by `GET /api/stats/details`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsDetails {
    pub catalog: CatalogStatistics,
    pub graph: GraphStatistics,
}

/// Computes [`StatsSnapshot`]s from the shared stores
#[derive(Clone)]
pub struct Aggregator {
    catalog: Arc<RwLock<ProteinCatalog>>,
    graph: Arc<RwLock<SimilarityGraph>>,
}

impl Aggregator {
    pub fn new(catalog: Arc<RwLock<ProteinCatalog>>, graph: Arc<RwLock<SimilarityGraph>>) -> Self {
        Self { catalog, graph }
    }

    /// Count documents and graph relations into one snapshot
    pub async fn snapshot(&self) -> StatsSnapshot {
        let documents = {
            let catalog = self.catalog.read().await;
            let total = catalog.count_total();
            let labeled = catalog.count_labeled();
            DocumentCounts {
                total_proteins: total,
                labeled_proteins: labeled,
                unlabeled_proteins: total - labeled,
            }
        };

        let graph = {
            let graph = self.graph.read().await;
            GraphCounts {
                isolated_proteins: graph.isolated_count() as u64,
                total_similarities: graph.similarity_count() as u64,
            }
        };

        debug!(?documents, ?graph, "stats snapshot");
        StatsSnapshot { documents, graph }
    }

    /// Full catalog and graph statistics
    pub async fn details(&self) -> StatsDetails {
        let catalog = self.catalog.read().await.statistics();
        let graph = self.graph.read().await.statistics();
        StatsDetails { catalog, graph }
    }
}
