//! Community labeling job
//!
//! Runs label propagation over the in-memory similarity graph, then writes
//! the majority EC number of each community onto its unlabeled members.

use super::job::{LabelingJob, LabelingOutcome};
use super::LabelingResult;
use crate::graph::{LpaConfig, SimilarityGraph};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Job that predicts missing EC numbers from similarity communities
pub struct CommunityLabelingJob {
    graph: Arc<RwLock<SimilarityGraph>>,
    config: LpaConfig,
}

impl CommunityLabelingJob {
    pub fn new(graph: Arc<RwLock<SimilarityGraph>>, config: LpaConfig) -> Self {
        Self { graph, config }
    }
}

#[async_trait]
impl LabelingJob for CommunityLabelingJob {
    async fn run(&self) -> LabelingResult<LabelingOutcome> {
        let mut graph = self.graph.write().await;

        let lpa = graph.label_propagation(&self.config);
        let analysis = graph.analyze_communities();
        let report = graph.predict_missing_labels(&analysis);
        let written = graph.write_majority_vote(&analysis);

        info!(
            communities = lpa.community_count,
            predicted = written,
            mixed = report.communities_processed,
            "Community labeling finished"
        );
        Ok(LabelingOutcome {
            message: format!(
                "Labeling completed: {} communities detected, {} proteins received a predicted EC number.",
                lpa.community_count, written
            ),
        })
    }
}
