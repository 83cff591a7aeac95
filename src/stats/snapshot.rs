//! Wire shape of the aggregation endpoint

use serde::{Deserialize, Serialize};

/// Document-store counts (`mongo` on the wire)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentCounts {
    pub total_proteins: u64,
    pub labeled_proteins: u64,
    pub unlabeled_proteins: u64,
}

/// Graph-store counts (`neo4j` on the wire)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphCounts {
    pub isolated_proteins: u64,
    pub total_similarities: u64,
}

/// Combined counts returned by `GET /api/stats`
///
/// Built fresh for every request and never mutated afterwards. All fields
/// are required when deserializing; a body missing any of them is rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    #[serde(rename = "mongo")]
    pub documents: DocumentCounts,

    #[serde(rename = "neo4j")]
    pub graph: GraphCounts,
}

impl StatsSnapshot {
    pub fn new(
        total_proteins: u64,
        labeled_proteins: u64,
        isolated_proteins: u64,
        total_similarities: u64,
    ) -> Self {
        StatsSnapshot {
            documents: DocumentCounts {
                total_proteins,
                labeled_proteins,
                unlabeled_proteins: total_proteins.saturating_sub(labeled_proteins),
            },
            graph: GraphCounts {
                isolated_proteins,
                total_similarities,
            },
        }
    }

    /// `labeled + unlabeled == total`
    pub fn is_consistent(&self) -> bool {
        let d = &self.documents;
        d.labeled_proteins
            .checked_add(d.unlabeled_proteins)
            .map_or(false, |sum| sum == d.total_proteins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shape() {
        let snapshot = StatsSnapshot::new(1000, 600, 50, 2300);
        let value = serde_json::to_value(snapshot).unwrap();
        assert_eq!(
            value,
            json!({
                "mongo": {
                    "total_proteins": 1000,
                    "labeled_proteins": 600,
                    "unlabeled_proteins": 400
                },
                "neo4j": {
                    "isolated_proteins": 50,
                    "total_similarities": 2300
                }
            })
        );
    }

    #[test]
    fn test_missing_section_is_rejected() {
        let body = r#"{"mongo": {"total_proteins": 1, "labeled_proteins": 1, "unlabeled_proteins": 0}}"#;
        assert!(serde_json::from_str::<StatsSnapshot>(body).is_err());
    }

    #[test]
    fn test_negative_count_is_rejected() {
        let body = r#"{"mongo": {"total_proteins": -1, "labeled_proteins": 0, "unlabeled_proteins": 0},
                       "neo4j": {"isolated_proteins": 0, "total_similarities": 0}}"#;
        assert!(serde_json::from_str::<StatsSnapshot>(body).is_err());
    }

    #[test]
    fn test_consistency() {
        assert!(StatsSnapshot::new(10, 4, 0, 0).is_consistent());
        assert!(StatsSnapshot::default().is_consistent());

        let mut broken = StatsSnapshot::new(10, 4, 0, 0);
        broken.documents.unlabeled_proteins = 9;
        assert!(!broken.is_consistent());
    }
}
