//! Protein catalog (document store)
//!
//! Holds one [`ProteinRecord`] per UniProt accession and answers the search
//! and counting queries used by the API and the statistics aggregator.

pub mod loader;
pub mod record;
pub mod store;

pub use loader::{load_uniprot_tsv, load_uniprot_tsv_file, LoadReport};
pub use record::{split_semicolon_field, ProteinRecord, SequenceInfo};
pub use store::{CatalogError, CatalogResult, CatalogStatistics, ProteinCatalog, SearchCriteria};
