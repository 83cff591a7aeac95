//! In-memory similarity graph storage
//!
//! Uses arena vectors indexed by id plus hash indices:
//! - nodes: NodeId -> ProteinNode
//! - edges: EdgeId -> SimilarityEdge
//! - adjacency: NodeId -> Vec<EdgeId> (both endpoints, similarity is undirected)
//! - uniprot_index: accession -> NodeId
//! - domain_index: InterPro id -> proteins having the domain (HAS_DOMAIN)

use super::edge::{SimilarityEdge, SimilarityWeights};
use super::node::{ProteinNode, ProteinProperties};
use super::types::{EdgeId, NodeId};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;

/// Number of entries in the "most connected" ranking
const TOP_CONNECTED: usize = 5;

/// Errors that can occur during graph operations
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Protein {0} not found")]
    UnknownProtein(String),

    #[error("Protein {0} cannot be similar to itself")]
    SelfSimilarity(String),

    #[error("Similarity between {0} and {1} already exists")]
    DuplicateSimilarity(String, String),

    #[error("Invalid jaccard weight {0}")]
    InvalidWeight(f64),

    #[error("Malformed similarity line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Degree distribution over all protein nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegreeStats {
    pub avg_degree: f64,
    pub max_degree: u64,
    pub min_degree: u64,
    /// Sample standard deviation
    pub std_degree: f64,
}

/// A highly connected protein
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectedProtein {
    pub protein_id: String,
    pub entry_name: Option<String>,
    pub degree: u64,
}

/// Proteins-per-domain distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainStats {
    pub avg_proteins_per_domain: f64,
    pub max_proteins_per_domain: u64,
    pub min_proteins_per_domain: u64,
}

/// Aggregate statistics over the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphStatistics {
    pub total_proteins: u64,
    pub total_domains: u64,
    pub total_similarities: u64,
    pub labeled_proteins: u64,
    pub unlabeled_proteins: u64,
    pub isolated_proteins: u64,
    pub degree: Option<DegreeStats>,
    pub top_connected: Vec<ConnectedProtein>,
    pub domains: Option<DomainStats>,
}

/// Node of an exported neighbourhood
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighbourhoodNode {
    pub id: String,
    pub label: String,
    pub is_labelled: bool,
    pub is_center: bool,
    /// Hop distance from the center protein
    pub depth: usize,
}

/// Edge of an exported neighbourhood
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighbourhoodEdge {
    pub source: String,
    pub target: String,
    pub jaccard_weight: f64,
}

/// A protein and its similarity neighbourhood, ready for visualization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbourhood {
    pub center: String,
    pub depth: usize,
    pub domains: Vec<String>,
    pub nodes: Vec<NeighbourhoodNode>,
    pub edges: Vec<NeighbourhoodEdge>,
}

/// In-memory similarity graph
#[derive(Debug, Default)]
pub struct SimilarityGraph {
    pub(super) nodes: Vec<ProteinNode>,
    pub(super) edges: Vec<SimilarityEdge>,
    pub(super) adjacency: Vec<Vec<EdgeId>>,
    uniprot_index: FxHashMap<String, NodeId>,
    pair_index: FxHashSet<(NodeId, NodeId)>,
    domain_index: IndexMap<String, Vec<NodeId>>,
}

impl SimilarityGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or update the node for `uniprot_id`
    ///
    /// Properties are overwritten; domain links are only ever added.
    pub fn upsert_protein(
        &mut self,
        uniprot_id: impl Into<String>,
        properties: ProteinProperties,
    ) -> NodeId {
        let uniprot_id = uniprot_id.into();
        let id = match self.uniprot_index.get(&uniprot_id) {
            Some(&id) => {
                let node = &mut self.nodes[id.index()];
                let mut domains = std::mem::take(&mut node.properties.interpro_ids);
                for domain in &properties.interpro_ids {
                    if !domains.contains(domain) {
                        domains.push(domain.clone());
                    }
                }
                node.properties = ProteinProperties {
                    interpro_ids: domains,
                    ..properties.clone()
                };
                id
            }
            None => {
                let id = NodeId::new(self.nodes.len() as u64);
                self.uniprot_index.insert(uniprot_id.clone(), id);
                self.nodes.push(ProteinNode::new(id, uniprot_id, ProteinProperties {
                    interpro_ids: Vec::new(),
                    ..properties.clone()
                }));
                self.adjacency.push(Vec::new());
                id
            }
        };

        for domain in properties.interpro_ids {
            self.link_domain(id, domain);
        }
        id
    }

    fn link_domain(&mut self, id: NodeId, domain: String) {
        let members = self.domain_index.entry(domain.clone()).or_default();
        if !members.contains(&id) {
            members.push(id);
        }
        let node = &mut self.nodes[id.index()];
        if !node.properties.interpro_ids.contains(&domain) {
            node.properties.interpro_ids.push(domain);
        }
    }

    /// Add a similarity edge between two existing proteins
    pub fn add_similarity(
        &mut self,
        a: &str,
        b: &str,
        weights: SimilarityWeights,
    ) -> GraphResult<EdgeId> {
        let source = self.node_id(a).ok_or_else(|| GraphError::UnknownProtein(a.to_string()))?;
        let target = self.node_id(b).ok_or_else(|| GraphError::UnknownProtein(b.to_string()))?;

        if source == target {
            return Err(GraphError::SelfSimilarity(a.to_string()));
        }
        if !weights.is_valid() {
            return Err(GraphError::InvalidWeight(weights.jaccard_weight));
        }
        if !self.pair_index.insert(SimilarityEdge::pair_key(source, target)) {
            return Err(GraphError::DuplicateSimilarity(a.to_string(), b.to_string()));
        }

        let id = EdgeId::new(self.edges.len() as u64);
        self.edges.push(SimilarityEdge::new(id, source, target, weights));
        self.adjacency[source.index()].push(id);
        self.adjacency[target.index()].push(id);
        Ok(id)
    }

    /// Look up a node id by accession
    pub fn node_id(&self, uniprot_id: &str) -> Option<NodeId> {
        self.uniprot_index.get(uniprot_id).copied()
    }

    pub fn get_protein(&self, uniprot_id: &str) -> Option<&ProteinNode> {
        self.node_id(uniprot_id).map(|id| &self.nodes[id.index()])
    }

    pub fn get_node(&self, id: NodeId) -> Option<&ProteinNode> {
        self.nodes.get(id.index())
    }

    pub fn get_edge(&self, id: EdgeId) -> Option<&SimilarityEdge> {
        self.edges.get(id.index())
    }

    /// Similarity edges touching a node
    pub fn similarities_of(&self, id: NodeId) -> Vec<&SimilarityEdge> {
        self.adjacency
            .get(id.index())
            .map(|edges| edges.iter().map(|e| &self.edges[e.index()]).collect())
            .unwrap_or_default()
    }

    /// Number of similarity edges touching a node
    pub fn degree(&self, id: NodeId) -> usize {
        self.adjacency.get(id.index()).map_or(0, Vec::len)
    }

    pub fn protein_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn domain_count(&self) -> usize {
        self.domain_index.len()
    }

    /// Number of distinct similarity relations
    pub fn similarity_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of proteins without any similarity edge
    pub fn isolated_count(&self) -> usize {
        self.adjacency.iter().filter(|edges| edges.is_empty()).count()
    }

    pub fn labeled_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_labelled()).count()
    }

    /// All proteins, in insertion order
    pub fn proteins(&self) -> impl Iterator<Item = &ProteinNode> {
        self.nodes.iter()
    }

    /// Proteins linked to an InterPro domain
    pub fn proteins_by_domain(&self, interpro_id: &str) -> Vec<&ProteinNode> {
        self.domain_index
            .get(interpro_id)
            .map(|ids| ids.iter().map(|id| &self.nodes[id.index()]).collect())
            .unwrap_or_default()
    }

    /// Pairs with a jaccard weight of at least `min_jaccard`, strongest first
    pub fn similar_pairs_above(&self, min_jaccard: f64) -> Vec<(String, String, f64)> {
        let mut pairs: Vec<(String, String, f64)> = self
            .edges
            .iter()
            .filter(|e| e.weights.jaccard_weight >= min_jaccard)
            .map(|e| {
                (
                    self.nodes[e.source.index()].uniprot_id.clone(),
                    self.nodes[e.target.index()].uniprot_id.clone(),
                    e.weights.jaccard_weight,
                )
            })
            .collect();
        pairs.sort_by(|a, b| b.2.total_cmp(&a.2));
        pairs
    }

    /// Breadth-first neighbourhood of a protein up to `depth` hops
    ///
    /// Edges are reported when they were traversed from a node closer than
    /// `depth`, so edges between two nodes on the outer ring are left out.
    pub fn neighbourhood(&self, uniprot_id: &str, depth: usize) -> Option<Neighbourhood> {
        let center = self.node_id(uniprot_id)?;
        let depth = depth.max(1);

        let mut distance: FxHashMap<NodeId, usize> = FxHashMap::default();
        let mut order = vec![center];
        let mut seen_edges: FxHashSet<EdgeId> = FxHashSet::default();
        let mut edges = Vec::new();
        let mut queue = VecDeque::from([center]);
        distance.insert(center, 0);

        while let Some(current) = queue.pop_front() {
            let hops = distance[&current];
            if hops >= depth {
                continue;
            }
            for &edge_id in &self.adjacency[current.index()] {
                let edge = &self.edges[edge_id.index()];
                let next = edge.other(current);
                if !distance.contains_key(&next) {
                    distance.insert(next, hops + 1);
                    order.push(next);
                    queue.push_back(next);
                }
                if seen_edges.insert(edge_id) {
                    edges.push(NeighbourhoodEdge {
                        source: self.nodes[edge.source.index()].uniprot_id.clone(),
                        target: self.nodes[edge.target.index()].uniprot_id.clone(),
                        jaccard_weight: edge.weights.jaccard_weight,
                    });
                }
            }
        }

        let nodes = order
            .iter()
            .map(|id| {
                let node = &self.nodes[id.index()];
                NeighbourhoodNode {
                    id: node.uniprot_id.clone(),
                    label: node.display_label().to_string(),
                    is_labelled: node.is_labelled(),
                    is_center: *id == center,
                    depth: distance[id],
                }
            })
            .collect();

        let center_node = &self.nodes[center.index()];
        Some(Neighbourhood {
            center: center_node.uniprot_id.clone(),
            depth,
            domains: center_node.properties.interpro_ids.clone(),
            nodes,
            edges,
        })
    }

    /// Compute aggregate statistics
    pub fn statistics(&self) -> GraphStatistics {
        let total = self.protein_count() as u64;
        let labeled = self.labeled_count() as u64;

        GraphStatistics {
            total_proteins: total,
            total_domains: self.domain_count() as u64,
            total_similarities: self.similarity_count() as u64,
            labeled_proteins: labeled,
            unlabeled_proteins: total - labeled,
            isolated_proteins: self.isolated_count() as u64,
            degree: self.degree_stats(),
            top_connected: self.top_connected(TOP_CONNECTED),
            domains: self.domain_stats(),
        }
    }

    fn degree_stats(&self) -> Option<DegreeStats> {
        let degrees: Vec<u64> = self.adjacency.iter().map(|e| e.len() as u64).collect();
        let (avg, std) = mean_and_sample_stdev(&degrees)?;
        Some(DegreeStats {
            avg_degree: round2(avg),
            max_degree: degrees.iter().copied().max().unwrap_or(0),
            min_degree: degrees.iter().copied().min().unwrap_or(0),
            std_degree: round2(std),
        })
    }

    fn top_connected(&self, limit: usize) -> Vec<ConnectedProtein> {
        let mut ranked: Vec<&ProteinNode> = self
            .nodes
            .iter()
            .filter(|n| self.degree(n.id) > 0)
            .collect();
        ranked.sort_by(|a, b| {
            self.degree(b.id)
                .cmp(&self.degree(a.id))
                .then_with(|| a.uniprot_id.cmp(&b.uniprot_id))
        });

        ranked
            .into_iter()
            .take(limit)
            .map(|n| ConnectedProtein {
                protein_id: n.uniprot_id.clone(),
                entry_name: n.properties.entry_name.clone(),
                degree: self.degree(n.id) as u64,
            })
            .collect()
    }

    fn domain_stats(&self) -> Option<DomainStats> {
        let sizes: Vec<u64> = self.domain_index.values().map(|p| p.len() as u64).collect();
        let (avg, _) = mean_and_sample_stdev(&sizes)?;
        Some(DomainStats {
            avg_proteins_per_domain: round2(avg),
            max_proteins_per_domain: sizes.iter().copied().max().unwrap_or(0),
            min_proteins_per_domain: sizes.iter().copied().min().unwrap_or(0),
        })
    }
}

/// Round a reported average to two decimals
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn mean_and_sample_stdev(values: &[u64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<u64>() as f64 / n;
    let std = if values.len() < 2 {
        0.0
    } else {
        let var = values
            .iter()
            .map(|&v| (v as f64 - mean).powi(2))
            .sum::<f64>()
            / (n - 1.0);
        var.sqrt()
    };
    Some((mean, std))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(labelled: bool, domains: &[&str]) -> ProteinProperties {
        ProteinProperties {
            is_labelled: labelled,
            interpro_ids: domains.iter().map(|d| d.to_string()).collect(),
            ..Default::default()
        }
    }

    /// P1 - P2 - P3 - P4 chain plus isolated P5
    fn chain_graph() -> SimilarityGraph {
        let mut graph = SimilarityGraph::new();
        graph.upsert_protein("P1", props(true, &["IPR1", "IPR2"]));
        graph.upsert_protein("P2", props(true, &["IPR1"]));
        graph.upsert_protein("P3", props(false, &["IPR2"]));
        graph.upsert_protein("P4", props(false, &[]));
        graph.upsert_protein("P5", props(false, &["IPR3"]));
        graph.add_similarity("P1", "P2", SimilarityWeights::jaccard(0.5)).unwrap();
        graph.add_similarity("P2", "P3", SimilarityWeights::jaccard(0.2)).unwrap();
        graph.add_similarity("P3", "P4", SimilarityWeights::jaccard(0.9)).unwrap();
        graph
    }

    #[test]
    fn test_upsert_merges_by_accession() {
        let mut graph = SimilarityGraph::new();
        let first = graph.upsert_protein("P1", props(false, &["IPR1"]));
        let second = graph.upsert_protein("P1", props(true, &["IPR2"]));

        assert_eq!(first, second);
        assert_eq!(graph.protein_count(), 1);
        let node = graph.get_protein("P1").unwrap();
        assert!(node.is_labelled());
        assert_eq!(node.properties.interpro_ids, vec!["IPR1", "IPR2"]);
        assert_eq!(graph.domain_count(), 2);
    }

    #[test]
    fn test_similarity_validation() {
        let mut graph = chain_graph();

        assert!(matches!(
            graph.add_similarity("P1", "P9", SimilarityWeights::jaccard(0.5)),
            Err(GraphError::UnknownProtein(id)) if id == "P9"
        ));
        assert!(matches!(
            graph.add_similarity("P1", "P1", SimilarityWeights::jaccard(0.5)),
            Err(GraphError::SelfSimilarity(_))
        ));
        assert!(matches!(
            graph.add_similarity("P2", "P1", SimilarityWeights::jaccard(0.5)),
            Err(GraphError::DuplicateSimilarity(_, _))
        ));
        assert!(matches!(
            graph.add_similarity("P1", "P5", SimilarityWeights::jaccard(2.0)),
            Err(GraphError::InvalidWeight(_))
        ));
        assert_eq!(graph.similarity_count(), 3);
    }

    #[test]
    fn test_counts() {
        let graph = chain_graph();
        assert_eq!(graph.protein_count(), 5);
        assert_eq!(graph.similarity_count(), 3);
        assert_eq!(graph.isolated_count(), 1);
        assert_eq!(graph.labeled_count(), 2);
        assert_eq!(graph.degree(graph.node_id("P2").unwrap()), 2);
    }

    #[test]
    fn test_empty_graph_statistics() {
        let stats = SimilarityGraph::new().statistics();
        assert_eq!(stats.total_proteins, 0);
        assert_eq!(stats.isolated_proteins, 0);
        assert_eq!(stats.total_similarities, 0);
        assert!(stats.degree.is_none());
        assert!(stats.domains.is_none());
        assert!(stats.top_connected.is_empty());
    }

    #[test]
    fn test_statistics() {
        let stats = chain_graph().statistics();
        assert_eq!(stats.total_proteins, 5);
        assert_eq!(stats.total_domains, 3);
        assert_eq!(stats.labeled_proteins, 2);
        assert_eq!(stats.unlabeled_proteins, 3);
        assert_eq!(stats.isolated_proteins, 1);

        let degree = stats.degree.unwrap();
        assert_eq!(degree.max_degree, 2);
        assert_eq!(degree.min_degree, 0);
        assert!((degree.avg_degree - 1.2).abs() < 1e-9);

        assert_eq!(stats.top_connected[0].protein_id, "P2");
        assert_eq!(stats.top_connected[1].protein_id, "P3");
        assert_eq!(stats.top_connected.len(), 4);

        let domains = stats.domains.unwrap();
        assert_eq!(domains.max_proteins_per_domain, 2);
        assert_eq!(domains.min_proteins_per_domain, 1);
    }

    #[test]
    fn test_reported_averages_are_rounded() {
        let stats = chain_graph().statistics();

        // degrees 1, 2, 2, 1, 0 give a sample stdev of sqrt(0.7)
        let degree = stats.degree.unwrap();
        assert_eq!(degree.avg_degree, 1.2);
        assert_eq!(degree.std_degree, 0.84);

        // IPR1 and IPR2 hold two proteins, IPR3 one
        let domains = stats.domains.unwrap();
        assert_eq!(domains.avg_proteins_per_domain, 1.67);
    }

    #[test]
    fn test_neighbourhood_depth() {
        let graph = chain_graph();

        let one = graph.neighbourhood("P1", 1).unwrap();
        let ids: Vec<&str> = one.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["P1", "P2"]);
        assert_eq!(one.edges.len(), 1);
        assert!(one.nodes[0].is_center);
        assert_eq!(one.domains, vec!["IPR1", "IPR2"]);

        let two = graph.neighbourhood("P1", 2).unwrap();
        let ids: Vec<&str> = two.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["P1", "P2", "P3"]);
        assert_eq!(two.edges.len(), 2);
        assert_eq!(two.nodes[2].depth, 2);

        assert!(graph.neighbourhood("P9", 1).is_none());
    }

    #[test]
    fn test_isolated_neighbourhood() {
        let graph = chain_graph();
        let hood = graph.neighbourhood("P5", 2).unwrap();
        assert_eq!(hood.nodes.len(), 1);
        assert!(hood.edges.is_empty());
    }

    #[test]
    fn test_similar_pairs_above() {
        let pairs = chain_graph().similar_pairs_above(0.3);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0], ("P3".to_string(), "P4".to_string(), 0.9));
    }

    #[test]
    fn test_proteins_by_domain() {
        let graph = chain_graph();
        let ids: Vec<&str> = graph
            .proteins_by_domain("IPR2")
            .iter()
            .map(|n| n.uniprot_id.as_str())
            .collect();
        assert_eq!(ids, vec!["P1", "P3"]);
        assert!(graph.proteins_by_domain("IPR9").is_empty());
    }
}
