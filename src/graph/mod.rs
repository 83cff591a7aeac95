//! Protein similarity graph
//!
//! This module implements the graph side of the application:
//! - One protein node per UniProt accession, linked to its InterPro domains
//! - Undirected similarity edges produced by an external builder
//! - Graph statistics (isolated proteins, degrees, domain usage)
//! - Neighbourhood export for visualization
//! - Label propagation communities and majority-vote EC prediction

pub mod community;
pub mod edge;
pub mod loader;
pub mod node;
pub mod store;
pub mod types;

// Re-export main types
pub use community::{
    CommunityAnalysis, CommunityInfo, CommunityMember, LabelPrediction, LpaConfig, LpaReport,
    PredictionReport,
};
pub use edge::{SimilarityEdge, SimilarityWeights};
pub use loader::{import_catalog, load_similarity_tsv, load_similarity_tsv_file, SimilarityLoadReport};
pub use node::{ProteinNode, ProteinProperties};
pub use store::{
    ConnectedProtein, DegreeStats, DomainStats, GraphError, GraphResult, GraphStatistics,
    Neighbourhood, NeighbourhoodEdge, NeighbourhoodNode, SimilarityGraph,
};
pub use types::{EdgeId, NodeId};
