//! HTTP handlers for the JSON API

use super::models::{
    LabelingResponse, ProteinDetails, ProteinParams, SearchParams, SearchType, SEARCH_LIMIT,
};
use super::server::AppState;
use crate::catalog::{ProteinCatalog, ProteinRecord, SearchCriteria};
use crate::graph::CommunityAnalysis;
use crate::stats::{StatsDetails, StatsSnapshot};
use crate::labeling::TriggerState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, error};

/// Maximum neighbourhood depth served by `/api/protein/:id`
pub const MAX_DEPTH: usize = 2;

/// Errors returned by API handlers
#[derive(Debug)]
pub enum ApiError {
    NotFound(&'static str),
    Busy,
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Busy => (StatusCode::CONFLICT, Json(json!({ "status": "busy" }))).into_response(),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": message }))).into_response()
            }
        }
    }
}

/// Run one catalog search; empty queries match nothing
pub(crate) fn run_search(catalog: &ProteinCatalog, params: &SearchParams) -> Vec<ProteinRecord> {
    let query = params.q.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let hits: Vec<&ProteinRecord> = match params.search_type {
        SearchType::Id => catalog.search_by_identifier(query).into_iter().collect(),
        SearchType::Name => catalog.search_by_protein_name(query),
        SearchType::Description => catalog.search_by_description(query),
        SearchType::Combined => catalog.combined_search(&SearchCriteria::all(query)),
    };

    debug!(query, search_type = params.search_type.as_str(), hits = hits.len(), "search");
    hits.into_iter().take(SEARCH_LIMIT).cloned().collect()
}

/// `GET /api/stats`
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.aggregator.snapshot().await)
}

/// `GET /api/stats/details`
pub async fn stats_details_handler(State(state): State<AppState>) -> Json<StatsDetails> {
    Json(state.aggregator.details().await)
}

/// `GET /api/search?q=&type=`
pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<ProteinRecord>> {
    let catalog = state.catalog.read().await;
    Json(run_search(&catalog, &params))
}

/// `GET /api/protein/:id?depth=`
pub async fn protein_handler(
    State(state): State<AppState>,
    Path(uniprot_id): Path<String>,
    Query(params): Query<ProteinParams>,
) -> Result<Json<ProteinDetails>, ApiError> {
    let depth = params.depth.clamp(1, MAX_DEPTH);
    let info = state.catalog.read().await.search_by_identifier(&uniprot_id).cloned();
    let graph = state.graph.read().await.neighbourhood(&uniprot_id, depth);

    if info.is_none() && graph.is_none() {
        debug!(%uniprot_id, "protein not found");
        return Err(ApiError::NotFound("Protein not found"));
    }
    Ok(Json(ProteinDetails { info, graph }))
}

/// `GET /api/communities`
pub async fn communities_handler(State(state): State<AppState>) -> Json<CommunityAnalysis> {
    Json(state.graph.read().await.analyze_communities())
}

/// `POST /api/labeling`
///
/// The run is spawned so that it settles even if the caller disconnects.
pub async fn start_labeling_handler(
    State(state): State<AppState>,
) -> Result<Json<LabelingResponse>, ApiError> {
    let handle = state.trigger.spawn_click().ok_or(ApiError::Busy)?;
    let result = handle.await.map_err(|e| {
        error!(error = %e, "Labeling task failed");
        ApiError::Internal(e.to_string())
    })?;

    Ok(Json(LabelingResponse {
        success: result.success,
        message: result.message,
    }))
}

/// `GET /api/labeling`
pub async fn labeling_state_handler(State(state): State<AppState>) -> Json<TriggerState> {
    Json(state.trigger.state())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ProteinCatalog {
        let mut catalog = ProteinCatalog::new();
        for i in 0..60 {
            let record = ProteinRecord::new(&format!("P{:05}", i))
                .with_entry_name(&format!("KIN{}_HUMAN", i))
                .with_names(&["Serine kinase"]);
            catalog.insert(record).unwrap();
        }
        catalog
    }

    #[test]
    fn test_empty_query_returns_nothing() {
        let params = SearchParams {
            q: "   ".to_string(),
            search_type: SearchType::Combined,
        };
        assert!(run_search(&catalog(), &params).is_empty());
    }

    #[test]
    fn test_results_are_capped() {
        let params = SearchParams {
            q: "kinase".to_string(),
            search_type: SearchType::Description,
        };
        assert_eq!(run_search(&catalog(), &params).len(), SEARCH_LIMIT);
    }

    #[test]
    fn test_id_search() {
        let params = SearchParams {
            q: "P00007".to_string(),
            search_type: SearchType::Id,
        };
        let hits = run_search(&catalog(), &params);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].uniprot_id, "P00007");
    }
}
