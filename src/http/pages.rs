//! Server-rendered pages: search, statistics dashboard, labeling

use super::handler::run_search;
use super::models::{SearchParams, SearchType};
use super::server::AppState;
use crate::catalog::ProteinRecord;
use crate::dashboard::{DashboardRenderer, HtmlSurface};
use crate::labeling::TriggerState;
use askama::Template;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::{debug, error, info};

struct SearchOption {
    value: &'static str,
    selected: bool,
}

#[derive(Template)]
#[template(path = "search.html")]
struct SearchPage {
    title: &'static str,
    query: String,
    options: Vec<SearchOption>,
    searched: bool,
    results: Vec<ProteinRecord>,
}

impl SearchPage {
    fn new(params: &SearchParams, results: Option<Vec<ProteinRecord>>) -> Self {
        let options = [
            SearchType::Combined,
            SearchType::Id,
            SearchType::Name,
            SearchType::Description,
        ]
        .into_iter()
        .map(|search_type| SearchOption {
            value: search_type.as_str(),
            selected: search_type == params.search_type,
        })
        .collect();

        SearchPage {
            title: "Protein search",
            query: params.q.clone(),
            options,
            searched: results.is_some(),
            results: results.unwrap_or_default(),
        }
    }
}

#[derive(Template)]
#[template(path = "stats.html")]
struct StatsPage {
    title: &'static str,
    cards: String,
    chart: String,
}

#[derive(Template)]
#[template(path = "labeling.html")]
struct LabelingPage {
    title: &'static str,
    state: TriggerState,
}

/// Render a page template into a response
fn render_page(page: &impl Template) -> Response {
    match page.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render page");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        }
    }
}

/// `GET /`
pub async fn index_page(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let results = if params.q.trim().is_empty() {
        None
    } else {
        let catalog = state.catalog.read().await;
        Some(run_search(&catalog, &params))
    };
    render_page(&SearchPage::new(&params, results))
}

/// `GET /stats`
pub async fn stats_page(State(state): State<AppState>) -> Response {
    let renderer =
        DashboardRenderer::new(state.aggregator.clone()).with_timeout(state.stats_timeout);
    let mut surface = HtmlSurface::new();
    renderer.fetch_and_render(&mut surface).await;

    render_page(&StatsPage {
        title: "Statistics",
        cards: surface.cards_html().to_string(),
        chart: surface.chart_html().to_string(),
    })
}

/// `GET /labeling`
pub async fn labeling_page(State(state): State<AppState>) -> Response {
    render_page(&LabelingPage {
        title: "Labeling",
        state: state.trigger.state(),
    })
}

/// `POST /labeling`
pub async fn start_labeling_page(State(state): State<AppState>) -> Redirect {
    match state.trigger.spawn_click() {
        Some(_) => info!("Labeling started from the web page"),
        None => debug!("Labeling click ignored, run in flight"),
    }
    Redirect::to("/labeling")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labeling::ResultMessage;
    use chrono::Utc;
    use uuid::Uuid;

    fn labeling_html(state: TriggerState) -> String {
        LabelingPage {
            title: "Labeling",
            state,
        }
        .render()
        .unwrap()
    }

    #[test]
    fn test_search_page_escapes_fields() {
        let params = SearchParams {
            q: "\"><script>".to_string(),
            search_type: SearchType::Name,
        };
        let record = ProteinRecord::new("P12345").with_names(&["<script>alert(1)</script>"]);
        let html = SearchPage::new(&params, Some(vec![record])).render().unwrap();

        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("<option value=\"name\" selected>"));
    }

    #[test]
    fn test_search_page_without_query_has_no_results_section() {
        let html = SearchPage::new(&SearchParams::default(), None).render().unwrap();
        assert!(html.contains("<form class=\"search\""));
        assert!(!html.contains("No proteins found."));
        assert!(!html.contains("class=\"results\""));
    }

    #[test]
    fn test_labeling_page_while_running() {
        let html = labeling_html(TriggerState {
            enabled: false,
            in_progress: true,
            last_result: None,
        });
        assert!(html.contains(" disabled>"));
        assert!(html.contains("labeling-progress"));
        assert!(html.contains("http-equiv=\"refresh\""));
        assert!(!html.contains("labeling-result"));
    }

    #[test]
    fn test_labeling_page_after_failure() {
        let html = labeling_html(TriggerState {
            enabled: true,
            in_progress: false,
            last_result: Some(ResultMessage {
                run_id: Uuid::new_v4(),
                success: false,
                message: "Labeling failed. Please try again.".to_string(),
                finished_at: Utc::now(),
            }),
        });
        assert!(!html.contains("disabled"));
        assert!(!html.contains("labeling-progress"));
        assert!(html.contains("result-message failure"));
    }
}
