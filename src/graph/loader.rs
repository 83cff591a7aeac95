//! Graph population from the catalog and from an external similarity list
//!
//! The similarity relation itself is computed elsewhere; this module only
//! imports the resulting edge list:
//!
//! ```text
//! # source  target  jaccard_weight  [shared_domains  union_domains]
//! P01       P02     0.5             1               2
//! ```

use super::edge::SimilarityWeights;
use super::node::ProteinProperties;
use super::store::{GraphError, GraphResult, SimilarityGraph};
use crate::catalog::ProteinCatalog;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

/// Outcome of a similarity import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SimilarityLoadReport {
    pub added: usize,
    pub skipped_unknown: usize,
    pub skipped_self: usize,
    pub skipped_duplicate: usize,
}

/// Create one protein node (with its domain links) per catalog record
pub fn import_catalog(catalog: &ProteinCatalog, graph: &mut SimilarityGraph) -> usize {
    let mut imported = 0;
    for record in catalog.iter() {
        graph.upsert_protein(
            record.uniprot_id.clone(),
            ProteinProperties {
                entry_name: record.entry_name.clone(),
                organism: record.organism.clone(),
                length: record.sequence.length,
                ec_numbers: record.ec_numbers.clone(),
                is_labelled: record.is_labelled,
                interpro_ids: record.interpro_ids.clone(),
                ..Default::default()
            },
        );
        imported += 1;
    }
    info!(
        proteins = graph.protein_count(),
        domains = graph.domain_count(),
        "Imported catalog into graph"
    );
    imported
}

fn parse_count(raw: Option<&str>, line: usize, name: &str) -> GraphResult<Option<u32>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|_| GraphError::Malformed {
            line,
            reason: format!("{} is not an integer: {}", name, value),
        }),
    }
}

fn parse_line(raw: &str, line: usize) -> GraphResult<(String, String, SimilarityWeights)> {
    let fields: Vec<&str> = raw.split('\t').collect();
    if fields.len() < 3 {
        return Err(GraphError::Malformed {
            line,
            reason: format!("expected at least 3 columns, found {}", fields.len()),
        });
    }

    let jaccard_weight: f64 = fields[2].trim().parse().map_err(|_| GraphError::Malformed {
        line,
        reason: format!("jaccard_weight is not a number: {}", fields[2].trim()),
    })?;

    let weights = SimilarityWeights {
        jaccard_weight,
        shared_domains: parse_count(fields.get(3).copied(), line, "shared_domains")?,
        union_domains: parse_count(fields.get(4).copied(), line, "union_domains")?,
    };
    Ok((fields[0].trim().to_string(), fields[1].trim().to_string(), weights))
}

/// Import similarity edges from a reader
///
/// Lines referencing unknown proteins, self-pairs and repeated pairs are
/// skipped and counted. Unparsable lines and invalid weights abort the load.
pub fn load_similarity_tsv<R: BufRead>(
    reader: R,
    graph: &mut SimilarityGraph,
) -> GraphResult<SimilarityLoadReport> {
    let mut report = SimilarityLoadReport::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (source, target, weights) = parse_line(trimmed, index + 1)?;
        match graph.add_similarity(&source, &target, weights) {
            Ok(_) => report.added += 1,
            Err(GraphError::UnknownProtein(id)) => {
                debug!("Line {}: unknown protein {}", index + 1, id);
                report.skipped_unknown += 1;
            }
            Err(GraphError::SelfSimilarity(_)) => report.skipped_self += 1,
            Err(GraphError::DuplicateSimilarity(_, _)) => report.skipped_duplicate += 1,
            Err(GraphError::InvalidWeight(w)) => {
                return Err(GraphError::Malformed {
                    line: index + 1,
                    reason: format!("jaccard_weight out of range: {}", w),
                })
            }
            Err(e) => return Err(e),
        }
    }

    Ok(report)
}

/// Import similarity edges from a file
pub fn load_similarity_tsv_file(
    path: impl AsRef<Path>,
    graph: &mut SimilarityGraph,
) -> GraphResult<SimilarityLoadReport> {
    let path = path.as_ref();
    info!("Loading similarity edges from {}", path.display());
    let report = load_similarity_tsv(BufReader::new(File::open(path)?), graph)?;
    info!(
        added = report.added,
        skipped_unknown = report.skipped_unknown,
        skipped_self = report.skipped_self,
        skipped_duplicate = report.skipped_duplicate,
        "Similarity edges loaded"
    );
    Ok(report)
}
