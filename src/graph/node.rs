//! Protein node of the similarity graph

use super::types::NodeId;
use serde::{Deserialize, Serialize};

/// Properties carried by a protein node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProteinProperties {
    pub entry_name: Option<String>,
    pub organism: Option<String>,
    pub length: u64,
    pub ec_numbers: Vec<String>,
    pub is_labelled: bool,
    pub interpro_ids: Vec<String>,
    /// Community assigned by the last label propagation run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community_id: Option<u64>,
    /// EC numbers predicted from the protein's community
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub predicted_ec_numbers: Vec<String>,
}

/// A protein node
///
/// Exactly one node exists per UniProt accession.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProteinNode {
    /// Position of the node in the graph arena
    pub id: NodeId,

    /// UniProt accession
    pub uniprot_id: String,

    #[serde(flatten)]
    pub properties: ProteinProperties,
}

impl ProteinNode {
    pub fn new(id: NodeId, uniprot_id: impl Into<String>, properties: ProteinProperties) -> Self {
        ProteinNode {
            id,
            uniprot_id: uniprot_id.into(),
            properties,
        }
    }

    /// Display label: entry name when known, accession otherwise
    pub fn display_label(&self) -> &str {
        self.properties
            .entry_name
            .as_deref()
            .unwrap_or(&self.uniprot_id)
    }

    pub fn is_labelled(&self) -> bool {
        self.properties.is_labelled
    }
}
