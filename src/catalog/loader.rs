//! UniProt TSV loader
//!
//! Reads a tab-separated UniProt export (header row required) into a
//! [`ProteinCatalog`]. Multi-valued columns are `;`-separated.

use super::record::{split_semicolon_field, ProteinRecord, SequenceInfo};
use super::store::{CatalogError, CatalogResult, ProteinCatalog};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, warn};

/// Progress is reported every `PROGRESS_INTERVAL` inserted records
const PROGRESS_INTERVAL: usize = 5000;

const COL_ENTRY: &str = "Entry";
const COL_ENTRY_NAME: &str = "Entry Name";
const COL_SEQUENCE: &str = "Sequence";
const COL_ORGANISM: &str = "Organism";
const COL_INTERPRO: &str = "InterPro";
const COL_EC_NUMBER: &str = "EC number";
const COL_PROTEIN_NAMES: &str = "Protein names";

/// Outcome of a load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub inserted: usize,
    pub skipped_missing_id: usize,
    pub skipped_duplicates: usize,
}

/// Column positions resolved from the header row
struct Columns {
    entry: usize,
    entry_name: Option<usize>,
    sequence: Option<usize>,
    organism: Option<usize>,
    interpro: Option<usize>,
    ec_number: Option<usize>,
    protein_names: Option<usize>,
}

impl Columns {
    fn from_header(header: &str) -> CatalogResult<Self> {
        let names: Vec<&str> = header.trim_end_matches(['\r', '\n']).split('\t').collect();
        let find = |wanted: &str| names.iter().position(|n| n.trim() == wanted);

        Ok(Columns {
            entry: find(COL_ENTRY).ok_or_else(|| CatalogError::MissingColumn(COL_ENTRY.to_string()))?,
            entry_name: find(COL_ENTRY_NAME),
            sequence: find(COL_SEQUENCE),
            organism: find(COL_ORGANISM),
            interpro: find(COL_INTERPRO),
            ec_number: find(COL_EC_NUMBER),
            protein_names: find(COL_PROTEIN_NAMES),
        })
    }
}

fn field<'a>(fields: &[&'a str], index: Option<usize>) -> &'a str {
    index.and_then(|i| fields.get(i)).map_or("", |f| f.trim())
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Build a record from one data row; `None` when the row has no accession
fn parse_row(columns: &Columns, line: &str) -> Option<ProteinRecord> {
    let fields: Vec<&str> = line.split('\t').collect();
    let entry = field(&fields, Some(columns.entry));
    if entry.is_empty() {
        return None;
    }

    let ec_numbers = split_semicolon_field(field(&fields, columns.ec_number));
    Some(ProteinRecord {
        uniprot_id: entry.to_string(),
        entry_name: non_empty(field(&fields, columns.entry_name)),
        organism: non_empty(field(&fields, columns.organism)),
        protein_names: split_semicolon_field(field(&fields, columns.protein_names)),
        sequence: SequenceInfo::new(field(&fields, columns.sequence)),
        interpro_ids: split_semicolon_field(field(&fields, columns.interpro)),
        is_labelled: !ec_numbers.is_empty(),
        ec_numbers,
    })
}

/// Load records from a reader into the catalog
pub fn load_uniprot_tsv<R: BufRead>(
    reader: R,
    catalog: &mut ProteinCatalog,
) -> CatalogResult<LoadReport> {
    let mut lines = reader.lines();
    let header = match lines.next() {
        Some(line) => line?,
        None => return Err(CatalogError::MissingColumn(COL_ENTRY.to_string())),
    };
    let columns = Columns::from_header(&header)?;

    let mut report = LoadReport::default();
    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let Some(record) = parse_row(&columns, line.trim_end_matches('\r')) else {
            report.skipped_missing_id += 1;
            continue;
        };

        match catalog.insert(record) {
            Ok(()) => {
                report.inserted += 1;
                if report.inserted % PROGRESS_INTERVAL == 0 {
                    debug!("Progress: {} records inserted", report.inserted);
                }
            }
            Err(CatalogError::DuplicateProtein(id)) => {
                warn!("Skipping duplicate protein {}", id);
                report.skipped_duplicates += 1;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(report)
}

/// Load a UniProt TSV file into the catalog
pub fn load_uniprot_tsv_file(
    path: impl AsRef<Path>,
    catalog: &mut ProteinCatalog,
) -> CatalogResult<LoadReport> {
    let path = path.as_ref();
    info!("Loading UniProt TSV from {}", path.display());
    let file = File::open(path)?;
    let report = load_uniprot_tsv(BufReader::new(file), catalog)?;
    info!(
        inserted = report.inserted,
        skipped_missing_id = report.skipped_missing_id,
        skipped_duplicates = report.skipped_duplicates,
        "Catalog loaded"
    );
    Ok(report)
}
