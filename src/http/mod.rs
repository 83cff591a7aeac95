//! HTTP interface
//!
//! JSON API under `/api`, server-rendered pages for search, statistics and
//! labeling, and embedded static assets.

pub mod handler;
pub mod models;
pub mod pages;
pub mod server;

pub use models::{LabelingResponse, ProteinDetails, SearchType, SEARCH_LIMIT};
pub use server::{router, AppState, HttpServer};
