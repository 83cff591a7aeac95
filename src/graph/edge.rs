//! Similarity edge between two proteins
//!
//! Similarity is symmetric: an edge is stored once with its endpoints in the
//! order they were given, and a pair of proteins carries at most one edge.

use super::types::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};

/// Weights attached to a similarity relation by the external graph builder
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityWeights {
    /// Jaccard coefficient over shared domains, in `[0, 1]`
    pub jaccard_weight: f64,

    /// Number of shared domains, if computed
    pub shared_domains: Option<u32>,

    /// Size of the domain union, if computed
    pub union_domains: Option<u32>,
}

impl SimilarityWeights {
    pub fn jaccard(jaccard_weight: f64) -> Self {
        SimilarityWeights {
            jaccard_weight,
            shared_domains: None,
            union_domains: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        (0.0..=1.0).contains(&self.jaccard_weight)
    }
}

/// An undirected similarity edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(flatten)]
    pub weights: SimilarityWeights,
}

impl SimilarityEdge {
    pub fn new(id: EdgeId, source: NodeId, target: NodeId, weights: SimilarityWeights) -> Self {
        SimilarityEdge {
            id,
            source,
            target,
            weights,
        }
    }

    /// The endpoint opposite to `node`
    pub fn other(&self, node: NodeId) -> NodeId {
        if self.source == node {
            self.target
        } else {
            self.source
        }
    }

    /// Order-independent key of the endpoint pair
    pub fn pair_key(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}
