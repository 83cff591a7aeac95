//! Protein document stored in the catalog

use serde::{Deserialize, Serialize};

/// Amino-acid sequence of a protein
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceInfo {
    /// Number of residues
    pub length: u64,

    /// Residues, one letter per amino acid
    pub aa: String,
}

impl SequenceInfo {
    pub fn new(aa: impl Into<String>) -> Self {
        let aa = aa.into();
        SequenceInfo {
            length: aa.chars().count() as u64,
            aa,
        }
    }
}

/// A protein document
///
/// Records are keyed by `uniprot_id`. The `is_labelled` flag is supplied by
/// whoever builds the record and is never recomputed by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProteinRecord {
    /// UniProt accession (e.g., "A0A024QYR9")
    pub uniprot_id: String,

    /// UniProt entry name (e.g., "KPCA_MOUSE")
    pub entry_name: Option<String>,

    /// Source organism
    pub organism: Option<String>,

    /// Recommended and alternative protein names
    pub protein_names: Vec<String>,

    /// Sequence and its length
    pub sequence: SequenceInfo,

    /// InterPro domain identifiers
    pub interpro_ids: Vec<String>,

    /// Enzyme Commission numbers
    pub ec_numbers: Vec<String>,

    /// Whether the protein carries a label
    pub is_labelled: bool,
}

impl ProteinRecord {
    /// Create an unlabelled record with an empty sequence
    pub fn new(uniprot_id: impl Into<String>) -> Self {
        ProteinRecord {
            uniprot_id: uniprot_id.into(),
            entry_name: None,
            organism: None,
            protein_names: Vec::new(),
            sequence: SequenceInfo::new(""),
            interpro_ids: Vec::new(),
            ec_numbers: Vec::new(),
            is_labelled: false,
        }
    }

    pub fn with_entry_name(mut self, entry_name: impl Into<String>) -> Self {
        self.entry_name = Some(entry_name.into());
        self
    }

    pub fn with_names(mut self, names: &[&str]) -> Self {
        self.protein_names = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn with_sequence(mut self, aa: impl Into<String>) -> Self {
        self.sequence = SequenceInfo::new(aa);
        self
    }

    pub fn with_domains(mut self, interpro_ids: &[&str]) -> Self {
        self.interpro_ids = interpro_ids.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn with_ec_numbers(mut self, ec_numbers: &[&str]) -> Self {
        self.ec_numbers = ec_numbers.iter().map(|e| e.to_string()).collect();
        self
    }

    pub fn labelled(mut self, is_labelled: bool) -> Self {
        self.is_labelled = is_labelled;
        self
    }

    /// Whether the record has at least one InterPro domain
    pub fn has_domains(&self) -> bool {
        !self.interpro_ids.is_empty()
    }
}

/// Split a multi-valued field of the form `a; b;c` into trimmed, non-empty parts
pub fn split_semicolon_field(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}
