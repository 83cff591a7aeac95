use anyhow::Context;
use protgraph::catalog::{load_uniprot_tsv_file, ProteinCatalog};
use protgraph::graph::{import_catalog, load_similarity_tsv_file, SimilarityGraph};
use protgraph::labeling::{
    CommunityLabelingJob, LabelingJob, LabelingTrigger, RemoteLabelingJob, SimulatedLabelingJob,
};
use protgraph::{AppState, HttpServer, LabelingMode, ServerConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Upper bound for one remote labeling run
const LABELING_TIMEOUT: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Protgraph v{}", protgraph::version());

    let config = ServerConfig::load().context("failed to load configuration")?;
    let (catalog, graph) = load_stores(&config)?;
    let graph = Arc::new(RwLock::new(graph));

    let job: Arc<dyn LabelingJob> = match config.labeling_mode {
        LabelingMode::Simulated => {
            info!("Labeling runs are simulated ({:?} each)", config.labeling_delay());
            Arc::new(SimulatedLabelingJob::new(config.labeling_delay()))
        }
        LabelingMode::Community => {
            info!(community = ?config.community, "Labeling runs predict EC numbers from communities");
            Arc::new(CommunityLabelingJob::new(Arc::clone(&graph), config.community.clone()))
        }
        LabelingMode::Remote => {
            let endpoint = config
                .labeling_endpoint
                .as_deref()
                .context("labeling_mode is remote but no labeling_endpoint is set")?;
            info!("Labeling runs are sent to {}", endpoint);
            Arc::new(RemoteLabelingJob::new(endpoint, LABELING_TIMEOUT)?)
        }
    };

    let state = AppState::new(Arc::new(RwLock::new(catalog)), graph, LabelingTrigger::new(job))
        .with_stats_timeout(config.stats_timeout());

    HttpServer::new(state, config.bind_address())
        .start()
        .await
        .with_context(|| format!("server on {} stopped", config.bind_address()))
}

/// Load the catalog and graph files named in the configuration
fn load_stores(config: &ServerConfig) -> anyhow::Result<(ProteinCatalog, SimilarityGraph)> {
    let mut catalog = ProteinCatalog::new();
    let mut graph = SimilarityGraph::new();

    match &config.catalog_path {
        Some(path) => {
            load_uniprot_tsv_file(path, &mut catalog)
                .with_context(|| format!("failed to load catalog {}", path.display()))?;
        }
        None => warn!("No catalog configured, starting with an empty catalog"),
    }

    let imported = import_catalog(&catalog, &mut graph);
    info!("{} proteins imported into the graph", imported);

    if let Some(path) = &config.similarity_path {
        load_similarity_tsv_file(path, &mut graph)
            .with_context(|| format!("failed to load similarities {}", path.display()))?;
    }

    Ok((catalog, graph))
}
