//! Community detection and label prediction
//!
//! Weighted label propagation over the similarity edges groups proteins into
//! communities. Unlabeled members of a community that contains labeled
//! proteins are then given the community's majority EC number.

use super::store::SimilarityGraph;
use super::types::NodeId;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Number of sample proteins listed per community
const SAMPLE_PROTEINS: usize = 20;

/// Number of per-community predictions listed in a report
const PREDICTION_DETAILS: usize = 10;

/// Label propagation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LpaConfig {
    /// Upper bound on propagation sweeps
    pub max_iterations: usize,
    /// Edges below this Jaccard weight do not propagate labels
    pub min_jaccard: f64,
    /// Smaller groups are left without a community id
    pub min_community_size: usize,
}

impl Default for LpaConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            min_jaccard: 0.1,
            min_community_size: 2,
        }
    }
}

/// Outcome of one label propagation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LpaReport {
    pub community_count: usize,
    pub ran_iterations: usize,
    pub did_converge: bool,
}

/// A protein listed in a community summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityMember {
    pub uniprot_id: String,
    pub entry_name: Option<String>,
    pub ec_numbers: Vec<String>,
    pub length: u64,
    pub is_labelled: bool,
}

/// Composition of one community
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityInfo {
    pub community_id: u64,
    pub size: usize,
    pub labeled_proteins: usize,
    pub unlabeled_proteins: usize,
    pub labeling_rate: f64,
    pub unique_ec_numbers: usize,
    /// Most frequent first, ties in lexical order
    pub ec_numbers: Vec<String>,
    pub avg_sequence_length: f64,
    pub unique_organisms: usize,
    pub sample_proteins: Vec<CommunityMember>,
}

/// All communities of the graph, largest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommunityAnalysis {
    pub total_communities: usize,
    pub total_proteins_in_communities: usize,
    pub total_labeled_in_communities: usize,
    pub overall_labeling_rate: f64,
    pub largest_community_size: usize,
    pub smallest_community_size: usize,
    pub avg_community_size: f64,
    pub communities: Vec<CommunityInfo>,
}

/// Majority-vote label for one community
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelPrediction {
    pub community_id: u64,
    pub predicted_label: String,
    pub proteins_affected: usize,
    pub confidence_source: String,
}

/// Predictions over every mixed community
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    pub total_new_predictions: usize,
    pub communities_processed: usize,
    /// The first few predictions, largest communities first
    pub predictions_details: Vec<LabelPrediction>,
}

impl SimilarityGraph {
    /// Run weighted label propagation and store each protein's community
    ///
    /// Nodes are visited in insertion order and adopt the label with the
    /// highest summed edge weight among their neighbours; ties go to the
    /// smallest label. Community ids are consecutive, in order of first
    /// member. Proteins in groups smaller than `min_community_size` get none.
    pub fn label_propagation(&mut self, config: &LpaConfig) -> LpaReport {
        let n = self.nodes.len();
        let mut labels: Vec<usize> = (0..n).collect();
        let mut ran_iterations = 0;
        let mut did_converge = false;

        while ran_iterations < config.max_iterations {
            ran_iterations += 1;
            let mut changed = false;

            for node in 0..n {
                let mut scores: FxHashMap<usize, f64> = FxHashMap::default();
                for edge_id in &self.adjacency[node] {
                    let edge = &self.edges[edge_id.index()];
                    if edge.weights.jaccard_weight < config.min_jaccard {
                        continue;
                    }
                    let neighbour = edge.other(NodeId::new(node as u64)).index();
                    *scores.entry(labels[neighbour]).or_insert(0.0) += edge.weights.jaccard_weight;
                }

                let best = scores.into_iter().max_by(|(la, wa), (lb, wb)| {
                    wa.total_cmp(wb).then_with(|| lb.cmp(la))
                });
                if let Some((label, _)) = best {
                    if label != labels[node] {
                        labels[node] = label;
                        changed = true;
                    }
                }
            }

            if !changed {
                did_converge = true;
                break;
            }
        }

        let mut sizes: FxHashMap<usize, usize> = FxHashMap::default();
        for &label in &labels {
            *sizes.entry(label).or_insert(0) += 1;
        }

        let mut community_ids: FxHashMap<usize, u64> = FxHashMap::default();
        for (node, &label) in self.nodes.iter_mut().zip(&labels) {
            node.properties.community_id = if sizes[&label] >= config.min_community_size {
                let next = community_ids.len() as u64;
                Some(*community_ids.entry(label).or_insert(next))
            } else {
                None
            };
        }

        info!(
            communities = community_ids.len(),
            iterations = ran_iterations,
            converged = did_converge,
            "Label propagation finished"
        );
        LpaReport {
            community_count: community_ids.len(),
            ran_iterations,
            did_converge,
        }
    }

    /// Summarise the communities written by the last propagation run
    pub fn analyze_communities(&self) -> CommunityAnalysis {
        let mut members: Vec<(u64, Vec<NodeId>)> = Vec::new();
        let mut positions: FxHashMap<u64, usize> = FxHashMap::default();
        for node in &self.nodes {
            let Some(community_id) = node.properties.community_id else {
                continue;
            };
            let slot = *positions.entry(community_id).or_insert_with(|| {
                members.push((community_id, Vec::new()));
                members.len() - 1
            });
            members[slot].1.push(node.id);
        }

        let mut communities: Vec<CommunityInfo> = members
            .into_iter()
            .map(|(community_id, ids)| self.community_info(community_id, &ids))
            .collect();
        communities.sort_by(|a, b| b.size.cmp(&a.size).then(a.community_id.cmp(&b.community_id)));

        let total_proteins: usize = communities.iter().map(|c| c.size).sum();
        let total_labeled: usize = communities.iter().map(|c| c.labeled_proteins).sum();
        CommunityAnalysis {
            total_communities: communities.len(),
            total_proteins_in_communities: total_proteins,
            total_labeled_in_communities: total_labeled,
            overall_labeling_rate: ratio(total_labeled, total_proteins),
            largest_community_size: communities.iter().map(|c| c.size).max().unwrap_or(0),
            smallest_community_size: communities.iter().map(|c| c.size).min().unwrap_or(0),
            avg_community_size: ratio(total_proteins, communities.len()),
            communities,
        }
    }

    fn community_info(&self, community_id: u64, ids: &[NodeId]) -> CommunityInfo {
        let proteins: Vec<_> = ids.iter().map(|id| &self.nodes[id.index()]).collect();
        let size = proteins.len();
        let labeled = proteins.iter().filter(|p| p.is_labelled()).count();

        let mut ec_counts: FxHashMap<&str, usize> = FxHashMap::default();
        for protein in &proteins {
            for ec in &protein.properties.ec_numbers {
                *ec_counts.entry(ec.as_str()).or_insert(0) += 1;
            }
        }
        let mut ec_ranked: Vec<(&str, usize)> = ec_counts.into_iter().collect();
        ec_ranked.sort_by(|(ea, ca), (eb, cb)| cb.cmp(ca).then(ea.cmp(eb)));

        let total_length: u64 = proteins.iter().map(|p| p.properties.length).sum();
        let mut organisms: Vec<&str> = proteins
            .iter()
            .filter_map(|p| p.properties.organism.as_deref())
            .collect();
        organisms.sort_unstable();
        organisms.dedup();

        CommunityInfo {
            community_id,
            size,
            labeled_proteins: labeled,
            unlabeled_proteins: size - labeled,
            labeling_rate: ratio(labeled, size),
            unique_ec_numbers: ec_ranked.len(),
            ec_numbers: ec_ranked.into_iter().map(|(ec, _)| ec.to_string()).collect(),
            avg_sequence_length: (ratio(total_length as usize, size) * 10.0).round() / 10.0,
            unique_organisms: organisms.len(),
            sample_proteins: proteins
                .iter()
                .take(SAMPLE_PROTEINS)
                .map(|p| CommunityMember {
                    uniprot_id: p.uniprot_id.clone(),
                    entry_name: p.properties.entry_name.clone(),
                    ec_numbers: p.properties.ec_numbers.clone(),
                    length: p.properties.length,
                    is_labelled: p.is_labelled(),
                })
                .collect(),
        }
    }

    /// Majority-vote EC prediction for every community that mixes labeled
    /// and unlabeled proteins; nothing is written
    pub fn predict_missing_labels(&self, analysis: &CommunityAnalysis) -> PredictionReport {
        let predictions: Vec<LabelPrediction> = analysis
            .communities
            .iter()
            .filter(|c| c.unlabeled_proteins > 0)
            .filter_map(|c| {
                let predicted_label = c.ec_numbers.first()?.clone();
                Some(LabelPrediction {
                    community_id: c.community_id,
                    predicted_label,
                    proteins_affected: c.unlabeled_proteins,
                    confidence_source: format!("Based on {} labeled neighbors", c.labeled_proteins),
                })
            })
            .collect();

        PredictionReport {
            total_new_predictions: predictions.iter().map(|p| p.proteins_affected).sum(),
            communities_processed: predictions.len(),
            predictions_details: predictions.into_iter().take(PREDICTION_DETAILS).collect(),
        }
    }

    /// Store the majority EC number on the unlabeled members of each mixed
    /// community; returns the number of proteins updated
    ///
    /// Predictions from an earlier run are discarded first.
    pub fn write_majority_vote(&mut self, analysis: &CommunityAnalysis) -> usize {
        let winners: FxHashMap<u64, &str> = analysis
            .communities
            .iter()
            .filter_map(|c| Some((c.community_id, c.ec_numbers.first()?.as_str())))
            .collect();

        let mut updated = 0;
        for node in &mut self.nodes {
            node.properties.predicted_ec_numbers.clear();
            if node.properties.is_labelled {
                continue;
            }
            let winner = node
                .properties
                .community_id
                .and_then(|community_id| winners.get(&community_id));
            if let Some(ec) = winner {
                node.properties.predicted_ec_numbers.push(ec.to_string());
                updated += 1;
            }
        }
        debug!(updated, "Majority vote written");
        updated
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ProteinProperties, SimilarityWeights};

    fn props(ec: &[&str], length: u64) -> ProteinProperties {
        ProteinProperties {
            ec_numbers: ec.iter().map(|e| e.to_string()).collect(),
            is_labelled: !ec.is_empty(),
            length,
            organism: Some("Mus musculus".to_string()),
            ..Default::default()
        }
    }

    /// Triangle P1-P2-P3, pair P4-P5, isolated P6, and a weak P3-P4 link
    fn clustered_graph() -> SimilarityGraph {
        let mut graph = SimilarityGraph::new();
        graph.upsert_protein("P1", props(&["2.7.11.1"], 100));
        graph.upsert_protein("P2", props(&["2.7.11.1", "3.1.3.16"], 200));
        graph.upsert_protein("P3", props(&[], 300));
        graph.upsert_protein("P4", props(&[], 50));
        graph.upsert_protein("P5", props(&[], 60));
        graph.upsert_protein("P6", props(&["1.1.1.1"], 70));
        graph.add_similarity("P1", "P2", SimilarityWeights::jaccard(0.8)).unwrap();
        graph.add_similarity("P2", "P3", SimilarityWeights::jaccard(0.6)).unwrap();
        graph.add_similarity("P1", "P3", SimilarityWeights::jaccard(0.7)).unwrap();
        graph.add_similarity("P4", "P5", SimilarityWeights::jaccard(0.9)).unwrap();
        graph.add_similarity("P3", "P4", SimilarityWeights::jaccard(0.05)).unwrap();
        graph
    }

    fn community_of(graph: &SimilarityGraph, id: &str) -> Option<u64> {
        graph.get_protein(id).unwrap().properties.community_id
    }

    #[test]
    fn test_label_propagation_finds_clusters() {
        let mut graph = clustered_graph();
        let report = graph.label_propagation(&LpaConfig::default());

        assert_eq!(report.community_count, 2);
        assert!(report.did_converge);

        let triangle = community_of(&graph, "P1");
        assert!(triangle.is_some());
        assert_eq!(community_of(&graph, "P2"), triangle);
        assert_eq!(community_of(&graph, "P3"), triangle);

        let pair = community_of(&graph, "P4");
        assert!(pair.is_some());
        assert_ne!(pair, triangle);
        assert_eq!(community_of(&graph, "P5"), pair);

        assert_eq!(community_of(&graph, "P6"), None);
    }

    #[test]
    fn test_weak_edge_does_not_merge_clusters() {
        let mut graph = clustered_graph();
        let config = LpaConfig {
            min_jaccard: 0.0,
            ..Default::default()
        };
        graph.label_propagation(&config);

        // P3 keeps the triangle's label; the weak link does not outweigh it
        assert_ne!(community_of(&graph, "P3"), community_of(&graph, "P4"));
    }

    #[test]
    fn test_min_community_size() {
        let mut graph = clustered_graph();
        let config = LpaConfig {
            min_community_size: 3,
            ..Default::default()
        };
        let report = graph.label_propagation(&config);

        assert_eq!(report.community_count, 1);
        assert_eq!(community_of(&graph, "P1"), Some(0));
        assert_eq!(community_of(&graph, "P4"), None);
    }

    #[test]
    fn test_iteration_cap() {
        let mut graph = clustered_graph();
        let config = LpaConfig {
            max_iterations: 1,
            ..Default::default()
        };
        let report = graph.label_propagation(&config);
        assert_eq!(report.ran_iterations, 1);
        assert!(!report.did_converge);
    }

    #[test]
    fn test_analyze_communities() {
        let mut graph = clustered_graph();
        graph.label_propagation(&LpaConfig::default());
        let analysis = graph.analyze_communities();

        assert_eq!(analysis.total_communities, 2);
        assert_eq!(analysis.total_proteins_in_communities, 5);
        assert_eq!(analysis.total_labeled_in_communities, 2);
        assert!((analysis.overall_labeling_rate - 0.4).abs() < 1e-9);
        assert_eq!(analysis.largest_community_size, 3);
        assert_eq!(analysis.smallest_community_size, 2);
        assert!((analysis.avg_community_size - 2.5).abs() < 1e-9);

        let triangle = &analysis.communities[0];
        assert_eq!(triangle.size, 3);
        assert_eq!(triangle.labeled_proteins, 2);
        assert_eq!(triangle.unlabeled_proteins, 1);
        assert_eq!(triangle.ec_numbers, vec!["2.7.11.1", "3.1.3.16"]);
        assert_eq!(triangle.avg_sequence_length, 200.0);
        assert_eq!(triangle.unique_organisms, 1);
        assert_eq!(triangle.sample_proteins.len(), 3);

        let pair = &analysis.communities[1];
        assert_eq!(pair.labeled_proteins, 0);
        assert_eq!(pair.unique_ec_numbers, 0);
    }

    #[test]
    fn test_analysis_before_propagation_is_empty() {
        let analysis = clustered_graph().analyze_communities();
        assert_eq!(analysis, CommunityAnalysis::default());
    }

    #[test]
    fn test_majority_vote() {
        let mut graph = clustered_graph();
        graph.label_propagation(&LpaConfig::default());
        let analysis = graph.analyze_communities();

        let report = graph.predict_missing_labels(&analysis);
        assert_eq!(report.total_new_predictions, 1);
        assert_eq!(report.communities_processed, 1);
        assert_eq!(report.predictions_details[0].predicted_label, "2.7.11.1");
        assert_eq!(
            report.predictions_details[0].confidence_source,
            "Based on 2 labeled neighbors"
        );

        assert_eq!(graph.write_majority_vote(&analysis), 1);
        let p3 = graph.get_protein("P3").unwrap();
        assert_eq!(p3.properties.predicted_ec_numbers, vec!["2.7.11.1"]);
        assert!(!p3.is_labelled());
        assert!(graph.get_protein("P1").unwrap().properties.predicted_ec_numbers.is_empty());
        assert!(graph.get_protein("P4").unwrap().properties.predicted_ec_numbers.is_empty());
    }

    #[test]
    fn test_majority_vote_replaces_previous_predictions() {
        let mut graph = clustered_graph();
        graph.label_propagation(&LpaConfig::default());
        let analysis = graph.analyze_communities();
        graph.write_majority_vote(&analysis);

        assert_eq!(graph.write_majority_vote(&CommunityAnalysis::default()), 0);
        assert!(graph.get_protein("P3").unwrap().properties.predicted_ec_numbers.is_empty());
    }
}
