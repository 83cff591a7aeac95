use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use protgraph::catalog::{ProteinCatalog, ProteinRecord};
use protgraph::client::RemoteClient;
use protgraph::dashboard::{DashboardRenderer, DashboardView, HtmlSurface, ERROR_MESSAGE};
use protgraph::graph::{import_catalog, SimilarityGraph};
use protgraph::labeling::{LabelingTrigger, SimulatedLabelingJob};
use protgraph::{AppState, HttpServer};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::RwLock;

const FIXTURE: &str = r#"{
    "mongo": {"total_proteins": 1000, "labeled_proteins": 600, "unlabeled_proteins": 400},
    "neo4j": {"isolated_proteins": 50, "total_similarities": 2300}
}"#;

/// Serve `app` on an ephemeral port and return its base URL
async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn stub(status: StatusCode, body: &'static str) -> Router {
    Router::new().route("/api/stats", get(move || async move { (status, body) }))
}

async fn render(base_url: &str, timeout: Duration) -> (DashboardView, HtmlSurface) {
    let client = RemoteClient::with_timeout(base_url, Duration::from_secs(5)).unwrap();
    let renderer = DashboardRenderer::new(client).with_timeout(timeout);
    let mut surface = HtmlSurface::new();
    let view = renderer.fetch_and_render(&mut surface).await;
    (view, surface)
}

#[tokio::test]
async fn test_renders_cards_and_chart() {
    let url = serve(stub(StatusCode::OK, FIXTURE)).await;
    let (view, surface) = render(&url, Duration::from_secs(5)).await;

    let values: Vec<u64> = view.cards().unwrap().iter().map(|c| c.value).collect();
    assert_eq!(values, vec![1000, 600, 50, 2300]);

    let chart = view.chart().unwrap();
    assert_eq!(chart.categories(), vec!["Labeled", "Unlabeled"]);
    assert_eq!(chart.values(), vec![600, 400]);
    assert!(chart.begin_at_zero);

    assert!(surface.cards_html().contains("Similarity edges"));
    assert!(surface.chart_html().contains("data-value=\"400\""));
}

#[tokio::test]
async fn test_all_zero_snapshot_renders() {
    let url = serve(stub(
        StatusCode::OK,
        r#"{"mongo": {"total_proteins": 0, "labeled_proteins": 0, "unlabeled_proteins": 0},
            "neo4j": {"isolated_proteins": 0, "total_similarities": 0}}"#,
    ))
    .await;
    let (view, surface) = render(&url, Duration::from_secs(5)).await;

    assert!(!view.is_failed());
    assert!(view.cards().unwrap().iter().all(|c| c.value == 0));
    assert_eq!(view.chart().unwrap().values(), vec![0, 0]);
    assert!(surface.chart_html().contains("height=\"0\""));
}

#[tokio::test]
async fn test_failures_share_one_view() {
    // Nothing listens on the port of a dropped listener
    let closed = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };
    let (transport, transport_surface) = render(&closed, Duration::from_secs(5)).await;
    assert_eq!(transport, DashboardView::failed());
    assert!(transport_surface.cards_html().contains(ERROR_MESSAGE));
    assert!(transport_surface.chart_html().is_empty());

    let missing_graph = serve(stub(
        StatusCode::OK,
        r#"{"mongo": {"total_proteins": 3, "labeled_proteins": 1, "unlabeled_proteins": 2}}"#,
    ))
    .await;
    let (contract, contract_surface) = render(&missing_graph, Duration::from_secs(5)).await;
    assert_eq!(contract, transport);
    assert_eq!(contract_surface.cards_html(), transport_surface.cards_html());

    let server_error = serve(stub(StatusCode::INTERNAL_SERVER_ERROR, FIXTURE)).await;
    let (protocol, _) = render(&server_error, Duration::from_secs(5)).await;
    assert_eq!(protocol, transport);

    let not_json = serve(stub(StatusCode::OK, "<html>maintenance</html>")).await;
    let (garbage, _) = render(&not_json, Duration::from_secs(5)).await;
    assert_eq!(garbage, transport);
}

#[tokio::test]
async fn test_inconsistent_snapshot_fails() {
    let url = serve(stub(
        StatusCode::OK,
        r#"{"mongo": {"total_proteins": 10, "labeled_proteins": 6, "unlabeled_proteins": 5},
            "neo4j": {"isolated_proteins": 0, "total_similarities": 0}}"#,
    ))
    .await;
    let (view, _) = render(&url, Duration::from_secs(5)).await;
    assert!(view.is_failed());
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let app = Router::new().route(
        "/api/stats",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            FIXTURE
        }),
    );
    let url = serve(app).await;

    let started = std::time::Instant::now();
    let (view, _) = render(&url, Duration::from_millis(200)).await;
    assert!(view.is_failed());
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_end_to_end_against_server() {
    let mut catalog = ProteinCatalog::new();
    catalog
        .insert(ProteinRecord::new("P1").with_ec_numbers(&["1.1.1.1"]).labelled(true))
        .unwrap();
    catalog.insert(ProteinRecord::new("P2")).unwrap();
    let mut graph = SimilarityGraph::new();
    import_catalog(&catalog, &mut graph);

    let state = AppState::new(
        Arc::new(RwLock::new(catalog)),
        Arc::new(RwLock::new(graph)),
        LabelingTrigger::new(Arc::new(SimulatedLabelingJob::new(Duration::from_millis(5)))),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(HttpServer::new(state, "unused").serve(listener));

    let (view, _) = render(&url, Duration::from_secs(5)).await;
    let values: Vec<u64> = view.cards().unwrap().iter().map(|c| c.value).collect();
    assert_eq!(values, vec![2, 1, 2, 0]);
    assert_eq!(view.chart().unwrap().values(), vec![1, 1]);

    let communities = RemoteClient::new(&url).unwrap().communities().await.unwrap();
    assert_eq!(communities.total_communities, 0);
    assert!(communities.communities.is_empty());
}
