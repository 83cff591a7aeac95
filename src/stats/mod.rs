//! Statistics aggregation
//!
//! [`Aggregator`] reads the catalog and the similarity graph and produces the
//! [`StatsSnapshot`] served by `GET /api/stats`.

pub mod aggregator;
pub mod snapshot;

pub use aggregator::{Aggregator, StatsDetails};
pub use snapshot::{DocumentCounts, GraphCounts, StatsSnapshot};
