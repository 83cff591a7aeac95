//! In-memory protein document store
//!
//! Records keep their insertion order so that every search returns results in
//! a stable, catalog order unless a ranking is explicitly requested.

use super::record::ProteinRecord;
use indexmap::IndexMap;
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::debug;

/// Number of entries reported in the "top" statistics
const TOP_N: usize = 5;

/// Errors that can occur during catalog operations
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Protein {0} already exists")]
    DuplicateProtein(String),

    #[error("Invalid search pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Missing column in header: {0}")]
    MissingColumn(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Search criteria combined with OR logic
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchCriteria {
    pub identifier: Option<String>,
    pub entry_name: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl SearchCriteria {
    /// Use the same term for every criterion
    pub fn all(term: &str) -> Self {
        SearchCriteria {
            identifier: Some(term.to_string()),
            entry_name: Some(term.to_string()),
            name: Some(term.to_string()),
            description: Some(term.to_string()),
        }
    }

    fn is_empty(&self) -> bool {
        [&self.identifier, &self.entry_name, &self.name, &self.description]
            .iter()
            .all(|c| c.as_deref().map_or(true, str::is_empty))
    }
}

/// Aggregate statistics over the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogStatistics {
    pub total_proteins: u64,
    pub labeled_proteins: u64,
    pub unlabeled_proteins: u64,
    pub proteins_with_domains: u64,
    pub proteins_without_domains: u64,
    /// Rounded to two decimals; absent for an empty catalog
    pub avg_sequence_length: Option<f64>,
    pub min_sequence_length: Option<u64>,
    pub max_sequence_length: Option<u64>,
    pub top_ec_numbers: Vec<(String, u64)>,
    pub top_interpro_ids: Vec<(String, u64)>,
}

/// Protein document store
#[derive(Debug, Default)]
pub struct ProteinCatalog {
    records: IndexMap<String, ProteinRecord>,
}

impl ProteinCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record; the `uniprot_id` must not already be present
    pub fn insert(&mut self, record: ProteinRecord) -> CatalogResult<()> {
        if self.records.contains_key(&record.uniprot_id) {
            return Err(CatalogError::DuplicateProtein(record.uniprot_id));
        }
        self.records.insert(record.uniprot_id.clone(), record);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate records in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &ProteinRecord> {
        self.records.values()
    }

    /// Total number of proteins
    pub fn count_total(&self) -> u64 {
        self.records.len() as u64
    }

    /// Number of proteins whose label flag is set
    pub fn count_labeled(&self) -> u64 {
        self.records.values().filter(|r| r.is_labelled).count() as u64
    }

    /// Exact lookup by UniProt accession
    pub fn search_by_identifier(&self, uniprot_id: &str) -> Option<&ProteinRecord> {
        let found = self.records.get(uniprot_id);
        debug!(uniprot_id, found = found.is_some(), "identifier lookup");
        found
    }

    /// Proteins having `name` as one of their protein names (exact match)
    pub fn search_by_protein_name(&self, name: &str) -> Vec<&ProteinRecord> {
        self.records
            .values()
            .filter(|r| r.protein_names.iter().any(|n| n == name))
            .collect()
    }

    /// Proteins whose entry name matches a regular expression
    pub fn search_by_entry_name(
        &self,
        pattern: &str,
        case_sensitive: bool,
    ) -> CatalogResult<Vec<&ProteinRecord>> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(!case_sensitive)
            .build()?;

        Ok(self
            .records
            .values()
            .filter(|r| r.entry_name.as_deref().map_or(false, |e| regex.is_match(e)))
            .collect())
    }

    /// Token search over protein names and entry names, best matches first
    pub fn search_by_description(&self, term: &str) -> Vec<&ProteinRecord> {
        let wanted: HashSet<String> = tokenize(term).collect();
        if wanted.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, &ProteinRecord)> = self
            .records
            .values()
            .filter_map(|record| {
                let score = text_score(record, &wanted);
                (score > 0).then_some((score, record))
            })
            .collect();

        // Stable sort keeps catalog order among equal scores
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        debug!(term, hits = scored.len(), "description search");
        scored.into_iter().map(|(_, record)| record).collect()
    }

    /// OR-combination of the individual searches, de-duplicated, in catalog order
    pub fn combined_search(&self, criteria: &SearchCriteria) -> Vec<&ProteinRecord> {
        if criteria.is_empty() {
            debug!("combined search without criteria");
            return Vec::new();
        }

        let description_tokens: HashSet<String> = criteria
            .description
            .as_deref()
            .map(|d| tokenize(d).collect())
            .unwrap_or_default();

        self.records
            .values()
            .filter(|record| {
                let by_id = criteria
                    .identifier
                    .as_deref()
                    .map_or(false, |id| !id.is_empty() && record.uniprot_id == id);
                let by_entry = criteria.entry_name.as_deref().map_or(false, |e| {
                    !e.is_empty() && record.entry_name.as_deref() == Some(e)
                });
                let by_name = criteria.name.as_deref().map_or(false, |n| {
                    !n.is_empty() && record.protein_names.iter().any(|p| p == n)
                });
                let by_description = !description_tokens.is_empty()
                    && text_score(record, &description_tokens) > 0;

                by_id || by_entry || by_name || by_description
            })
            .collect()
    }

    /// Proteins annotated with the given EC number
    pub fn proteins_by_ec_number(&self, ec_number: &str) -> Vec<&ProteinRecord> {
        self.records
            .values()
            .filter(|r| r.ec_numbers.iter().any(|e| e == ec_number))
            .collect()
    }

    /// Proteins containing the given InterPro domain
    pub fn proteins_by_interpro_domain(&self, interpro_id: &str) -> Vec<&ProteinRecord> {
        self.records
            .values()
            .filter(|r| r.interpro_ids.iter().any(|d| d == interpro_id))
            .collect()
    }

    /// Compute aggregate statistics
    pub fn statistics(&self) -> CatalogStatistics {
        let total = self.count_total();
        let labeled = self.count_labeled();
        let with_domains = self.records.values().filter(|r| r.has_domains()).count() as u64;

        let lengths: Vec<u64> = self.records.values().map(|r| r.sequence.length).collect();
        let avg = if lengths.is_empty() {
            None
        } else {
            let mean = lengths.iter().sum::<u64>() as f64 / lengths.len() as f64;
            Some((mean * 100.0).round() / 100.0)
        };

        CatalogStatistics {
            total_proteins: total,
            labeled_proteins: labeled,
            unlabeled_proteins: total - labeled,
            proteins_with_domains: with_domains,
            proteins_without_domains: total - with_domains,
            avg_sequence_length: avg,
            min_sequence_length: lengths.iter().copied().min(),
            max_sequence_length: lengths.iter().copied().max(),
            top_ec_numbers: top_counts(self.records.values().flat_map(|r| &r.ec_numbers)),
            top_interpro_ids: top_counts(self.records.values().flat_map(|r| &r.interpro_ids)),
        }
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// Number of distinct wanted tokens present in the record's searchable text
fn text_score(record: &ProteinRecord, wanted: &HashSet<String>) -> usize {
    let mut present: HashSet<String> = HashSet::new();
    for name in &record.protein_names {
        present.extend(tokenize(name));
    }
    if let Some(entry) = &record.entry_name {
        present.extend(tokenize(entry));
    }
    wanted.iter().filter(|t| present.contains(*t)).count()
}

fn top_counts<'a>(values: impl Iterator<Item = &'a String>) -> Vec<(String, u64)> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for value in values {
        *counts.entry(value.as_str()).or_insert(0) += 1;
    }

    let mut sorted: Vec<(String, u64)> = counts
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted.truncate(TOP_N);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_catalog() -> ProteinCatalog {
        let mut catalog = ProteinCatalog::new();
        catalog
            .insert(
                ProteinRecord::new("P01")
                    .with_entry_name("KPCA_MOUSE")
                    .with_names(&["Protein kinase C alpha type", "PKC-A"])
                    .with_sequence("MADVFPG")
                    .with_domains(&["IPR000719", "IPR011009"])
                    .with_ec_numbers(&["2.7.11.13"])
                    .labelled(true),
            )
            .unwrap();
        catalog
            .insert(
                ProteinRecord::new("P02")
                    .with_entry_name("KPCB_MOUSE")
                    .with_names(&["Protein kinase C beta type"])
                    .with_sequence("MADPAAGPPPSEGEESTVRFARKGALRQKNVHEVKNHKFTARFFKQPTFCSHC")
                    .with_domains(&["IPR000719"])
                    .with_ec_numbers(&["2.7.11.13"])
                    .labelled(true),
            )
            .unwrap();
        catalog
            .insert(
                ProteinRecord::new("P03")
                    .with_entry_name("ALBU_MOUSE")
                    .with_names(&["Albumin"])
                    .with_sequence("MKW"),
            )
            .unwrap();
        catalog
    }

    #[test]
    fn test_insert_duplicate() {
        let mut catalog = sample_catalog();
        let result = catalog.insert(ProteinRecord::new("P01"));
        assert!(matches!(result, Err(CatalogError::DuplicateProtein(id)) if id == "P01"));
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_search_by_identifier() {
        let catalog = sample_catalog();
        assert_eq!(catalog.search_by_identifier("P02").unwrap().uniprot_id, "P02");
        assert!(catalog.search_by_identifier("Q99").is_none());
    }

    #[test]
    fn test_search_by_protein_name_is_exact() {
        let catalog = sample_catalog();
        assert_eq!(catalog.search_by_protein_name("Albumin").len(), 1);
        assert!(catalog.search_by_protein_name("albumin").is_empty());
    }

    #[test]
    fn test_search_by_entry_name() {
        let catalog = sample_catalog();
        let hits = catalog.search_by_entry_name("^kpc", false).unwrap();
        assert_eq!(hits.len(), 2);

        let hits = catalog.search_by_entry_name("^kpc", true).unwrap();
        assert!(hits.is_empty());

        assert!(matches!(
            catalog.search_by_entry_name("(", false),
            Err(CatalogError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_search_by_description_ranks_results() {
        let catalog = sample_catalog();
        let hits = catalog.search_by_description("kinase alpha");
        let ids: Vec<&str> = hits.iter().map(|r| r.uniprot_id.as_str()).collect();
        assert_eq!(ids, vec!["P01", "P02"]);

        assert!(catalog.search_by_description("  ").is_empty());
    }

    #[test]
    fn test_combined_search() {
        let catalog = sample_catalog();
        let criteria = SearchCriteria {
            identifier: Some("P03".to_string()),
            name: Some("PKC-A".to_string()),
            ..Default::default()
        };
        let ids: Vec<&str> = catalog
            .combined_search(&criteria)
            .iter()
            .map(|r| r.uniprot_id.as_str())
            .collect();
        assert_eq!(ids, vec!["P01", "P03"]);

        assert!(catalog.combined_search(&SearchCriteria::default()).is_empty());
        assert_eq!(catalog.combined_search(&SearchCriteria::all("kinase")).len(), 2);
    }

    #[test]
    fn test_lookup_by_annotation() {
        let catalog = sample_catalog();
        assert_eq!(catalog.proteins_by_ec_number("2.7.11.13").len(), 2);
        assert_eq!(catalog.proteins_by_interpro_domain("IPR011009").len(), 1);
        assert!(catalog.proteins_by_interpro_domain("IPR999999").is_empty());
    }

    #[test]
    fn test_statistics() {
        let stats = sample_catalog().statistics();
        assert_eq!(stats.total_proteins, 3);
        assert_eq!(stats.labeled_proteins, 2);
        assert_eq!(stats.unlabeled_proteins, 1);
        assert_eq!(stats.proteins_with_domains, 2);
        assert_eq!(stats.proteins_without_domains, 1);
        assert_eq!(stats.min_sequence_length, Some(3));
        assert_eq!(stats.max_sequence_length, Some(53));
        assert_eq!(stats.avg_sequence_length, Some(21.0));
        assert_eq!(stats.top_ec_numbers, vec![("2.7.11.13".to_string(), 2)]);
        assert_eq!(stats.top_interpro_ids[0], ("IPR000719".to_string(), 2));
    }

    #[test]
    fn test_statistics_empty() {
        let stats = ProteinCatalog::new().statistics();
        assert_eq!(stats.total_proteins, 0);
        assert_eq!(stats.avg_sequence_length, None);
        assert!(stats.top_ec_numbers.is_empty());
    }
}
