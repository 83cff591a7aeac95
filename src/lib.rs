//! Protgraph
//!
//! Protein catalog, similarity graph and statistics dashboard.
//!
//! # Architecture
//!
//! - [`catalog`]: document store of UniProt records with search and counting
//! - [`graph`]: protein similarity graph with degree and domain statistics,
//!   label propagation communities
//! - [`stats`]: aggregation of both stores into one [`StatsSnapshot`]
//! - [`dashboard`]: snapshot → summary cards and bar chart, applied to a surface
//! - [`labeling`]: single-flight labeling trigger over a pluggable job
//! - [`http`]: axum server (JSON API and pages)
//! - [`client`]: reqwest client for a running server
//!
//! ## Example Usage
//!
//! ```rust
//! use protgraph::dashboard::DashboardView;
//! use protgraph::stats::StatsSnapshot;
//!
//! let snapshot = StatsSnapshot::new(1000, 600, 50, 2300);
//! let view = DashboardView::from_snapshot(&snapshot);
//!
//! let cards = view.cards().unwrap();
//! assert_eq!(cards[0].value, 1000);
//! assert_eq!(view.chart().unwrap().values(), vec![600, 400]);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod graph;
pub mod http;
pub mod labeling;
pub mod stats;

// Re-export main types for convenience
pub use catalog::{CatalogError, CatalogResult, ProteinCatalog, ProteinRecord};
pub use client::{ClientError, ClientResult, RemoteClient};
pub use config::{ConfigError, LabelingMode, ServerConfig};
pub use dashboard::{DashboardRenderer, DashboardView, FetchError, StatsSource, Surface};
pub use graph::{GraphError, GraphResult, SimilarityGraph};
pub use http::{AppState, HttpServer};
pub use labeling::{LabelingError, LabelingJob, LabelingTrigger};
pub use stats::{Aggregator, StatsSnapshot};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
