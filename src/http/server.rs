//! HTTP server: JSON API, dashboard pages and embedded assets

use super::handler::{
    communities_handler, labeling_state_handler, protein_handler, search_handler,
    start_labeling_handler, stats_details_handler, stats_handler,
};
use super::pages::{index_page, labeling_page, start_labeling_page, stats_page};
use crate::catalog::ProteinCatalog;
use crate::dashboard::DEFAULT_FETCH_TIMEOUT;
use crate::graph::SimilarityGraph;
use crate::labeling::LabelingTrigger;
use crate::stats::Aggregator;
use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use rust_embed::RustEmbed;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tracing::info;

#[derive(RustEmbed)]
#[folder = "src/http/static/"]
struct Assets;

async fn static_handler(Path(file): Path<String>) -> Response {
    let Some(asset) = Assets::get(&file) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let content_type = match file.rsplit_once('.').map(|(_, ext)| ext) {
        Some("css") => mime::TEXT_CSS_UTF_8,
        Some("html") => mime::TEXT_HTML_UTF_8,
        _ => mime::APPLICATION_OCTET_STREAM,
    };
    (
        [(header::CONTENT_TYPE, content_type.as_ref().to_string())],
        asset.data.into_owned(),
    )
        .into_response()
}

/// Shared state of all handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<RwLock<ProteinCatalog>>,
    pub graph: Arc<RwLock<SimilarityGraph>>,
    pub aggregator: Aggregator,
    pub trigger: LabelingTrigger,
    /// Bound on the `/stats` page's statistics fetch
    pub stats_timeout: Duration,
}

impl AppState {
    pub fn new(
        catalog: Arc<RwLock<ProteinCatalog>>,
        graph: Arc<RwLock<SimilarityGraph>>,
        trigger: LabelingTrigger,
    ) -> Self {
        let aggregator = Aggregator::new(Arc::clone(&catalog), Arc::clone(&graph));
        Self {
            catalog,
            graph,
            aggregator,
            trigger,
            stats_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_stats_timeout(mut self, timeout: Duration) -> Self {
        self.stats_timeout = timeout;
        self
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/stats", get(stats_page))
        .route("/labeling", get(labeling_page).post(start_labeling_page))
        .route("/static/:file", get(static_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/stats/details", get(stats_details_handler))
        .route("/api/search", get(search_handler))
        .route("/api/protein/:id", get(protein_handler))
        .route("/api/communities", get(communities_handler))
        .route(
            "/api/labeling",
            get(labeling_state_handler).post(start_labeling_handler),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// HTTP server for the API and the dashboard pages
pub struct HttpServer {
    state: AppState,
    address: String,
}

impl HttpServer {
    /// Create a new HTTP server bound to `address` (`host:port`) on start
    pub fn new(state: AppState, address: impl Into<String>) -> Self {
        Self {
            state,
            address: address.into(),
        }
    }

    /// Bind and serve until the process stops
    pub async fn start(self) -> std::io::Result<()> {
        let listener = TcpListener::bind(&self.address).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        let local = listener.local_addr()?;
        info!("Dashboard available at http://{}", local);
        axum::serve(listener, router(self.state)).await
    }
}
