//! Protgraph CLI — command-line interface for a running protgraph server
//!
//! Uses the protgraph RemoteClient; the `dashboard` command renders the
//! statistics dashboard in the terminal.

mod surface;

use anyhow::Result;
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use protgraph::client::{ClientError, RemoteClient};
use protgraph::dashboard::DashboardRenderer;
use protgraph::http::SearchType;
use std::time::Duration;
use surface::TerminalSurface;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "protgraph", version, about = "Protgraph CLI")]
struct Cli {
    /// Server HTTP URL
    #[arg(long, default_value = "http://localhost:5000", global = true, env = "PROTGRAPH_URL")]
    url: String,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum SearchKind {
    Id,
    Name,
    Description,
    Combined,
}

impl From<SearchKind> for SearchType {
    fn from(kind: SearchKind) -> Self {
        match kind {
            SearchKind::Id => SearchType::Id,
            SearchKind::Name => SearchType::Name,
            SearchKind::Description => SearchType::Description,
            SearchKind::Combined => SearchType::Combined,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show the statistics snapshot
    Stats {
        /// Show detailed catalog and graph statistics
        #[arg(long)]
        details: bool,
    },
    /// Render the statistics dashboard
    Dashboard {
        /// Bound on the statistics fetch, in milliseconds
        #[arg(long, default_value_t = 10_000)]
        timeout_ms: u64,
    },
    /// Search the protein catalog
    Search {
        /// Accession, protein name or keywords
        query: String,

        /// Search mode
        #[arg(long = "type", value_enum, default_value = "combined")]
        kind: SearchKind,
    },
    /// Show one protein and its similarity neighbourhood
    Protein {
        /// UniProt accession
        id: String,

        /// Neighbourhood depth (1 or 2)
        #[arg(long, default_value_t = 1)]
        depth: usize,
    },
    /// Show the communities found by the last labeling run
    Communities {
        /// Number of communities listed
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Start a labeling run, or show the trigger state
    Label {
        /// Only show the current trigger state
        #[arg(long)]
        status: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Stats { details } => run_stats(&cli.url, details, &cli.format).await,
        Commands::Dashboard { timeout_ms } => run_dashboard(&cli.url, timeout_ms, &cli.format).await,
        Commands::Search { query, kind } => run_search(&cli.url, &query, kind.into(), &cli.format).await,
        Commands::Protein { id, depth } => run_protein(&cli.url, &id, depth, &cli.format).await,
        Commands::Communities { limit } => run_communities(&cli.url, limit, &cli.format).await,
        Commands::Label { status } => run_label(&cli.url, status, &cli.format).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header.to_vec());
    table
}

async fn run_stats(url: &str, details: bool, format: &OutputFormat) -> Result<()> {
    let client = RemoteClient::new(url)?;

    if details {
        let details = client.stats_details().await?;
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&details)?),
            OutputFormat::Table => {
                let catalog = &details.catalog;
                let graph = &details.graph;
                let mut table = new_table(&["Statistic", "Value"]);
                table.add_row(vec!["Proteins".to_string(), catalog.total_proteins.to_string()]);
                table.add_row(vec!["Labeled".to_string(), catalog.labeled_proteins.to_string()]);
                table.add_row(vec![
                    "With domains".to_string(),
                    catalog.proteins_with_domains.to_string(),
                ]);
                table.add_row(vec![
                    "Average length".to_string(),
                    catalog
                        .avg_sequence_length
                        .map(|l| l.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                ]);
                table.add_row(vec!["Domains".to_string(), graph.total_domains.to_string()]);
                table.add_row(vec![
                    "Similarity edges".to_string(),
                    graph.total_similarities.to_string(),
                ]);
                table.add_row(vec!["Isolated".to_string(), graph.isolated_proteins.to_string()]);
                if let Some(degree) = &graph.degree {
                    table.add_row(vec!["Mean degree".to_string(), format!("{:.2}", degree.avg_degree)]);
                    table.add_row(vec!["Max degree".to_string(), degree.max_degree.to_string()]);
                }
                println!("{}", table);

                if !graph.top_connected.is_empty() {
                    let mut top = new_table(&["Protein", "Connections"]);
                    for protein in &graph.top_connected {
                        top.add_row(vec![protein.protein_id.clone(), protein.degree.to_string()]);
                    }
                    println!("{}", top);
                }
            }
        }
        return Ok(());
    }

    let snapshot = client.stats().await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&snapshot)?),
        OutputFormat::Table => {
            let mut table = new_table(&["Statistic", "Value"]);
            table.add_row(vec!["Total proteins".to_string(), snapshot.documents.total_proteins.to_string()]);
            table.add_row(vec!["Labeled proteins".to_string(), snapshot.documents.labeled_proteins.to_string()]);
            table.add_row(vec!["Unlabeled proteins".to_string(), snapshot.documents.unlabeled_proteins.to_string()]);
            table.add_row(vec!["Isolated proteins".to_string(), snapshot.graph.isolated_proteins.to_string()]);
            table.add_row(vec!["Similarity edges".to_string(), snapshot.graph.total_similarities.to_string()]);
            println!("{}", table);
        }
    }
    Ok(())
}

async fn run_dashboard(url: &str, timeout_ms: u64, format: &OutputFormat) -> Result<()> {
    let timeout = Duration::from_millis(timeout_ms);
    let client = RemoteClient::with_timeout(url, timeout)?;
    let renderer = DashboardRenderer::new(client).with_timeout(timeout);

    let mut surface = TerminalSurface::new();
    let view = renderer.fetch_and_render(&mut surface).await;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
        OutputFormat::Table => println!("{}", surface.output()),
    }
    Ok(())
}

async fn run_search(url: &str, query: &str, search_type: SearchType, format: &OutputFormat) -> Result<()> {
    let client = RemoteClient::new(url)?;
    let results = client.search(query, search_type).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Table => {
            if results.is_empty() {
                println!("(no results)");
                return Ok(());
            }
            let mut table = new_table(&["Accession", "Entry name", "Protein names", "Organism", "Labeled"]);
            for record in &results {
                table.add_row(vec![
                    record.uniprot_id.clone(),
                    record.entry_name.clone().unwrap_or_default(),
                    record.protein_names.join("; "),
                    record.organism.clone().unwrap_or_default(),
                    if record.is_labelled { "yes" } else { "no" }.to_string(),
                ]);
            }
            println!("{}", table);
            println!("{} protein(s)", results.len());
        }
    }
    Ok(())
}

async fn run_protein(url: &str, id: &str, depth: usize, format: &OutputFormat) -> Result<()> {
    let client = RemoteClient::new(url)?;
    let Some(details) = client.protein(id, depth).await? else {
        anyhow::bail!("protein {} not found", id);
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&details)?),
        OutputFormat::Table => {
            if let Some(info) = &details.info {
                let mut table = new_table(&["Field", "Value"]);
                table.add_row(vec!["Accession".to_string(), info.uniprot_id.clone()]);
                table.add_row(vec!["Entry name".to_string(), info.entry_name.clone().unwrap_or_default()]);
                table.add_row(vec!["Protein names".to_string(), info.protein_names.join("; ")]);
                table.add_row(vec!["Organism".to_string(), info.organism.clone().unwrap_or_default()]);
                table.add_row(vec!["Length".to_string(), info.sequence.length.to_string()]);
                table.add_row(vec!["InterPro".to_string(), info.interpro_ids.join(", ")]);
                table.add_row(vec!["EC numbers".to_string(), info.ec_numbers.join(", ")]);
                println!("{}", table);
            }
            if let Some(graph) = &details.graph {
                let mut table = new_table(&["Neighbour", "Label", "Depth", "Labeled"]);
                for node in graph.nodes.iter().filter(|n| !n.is_center) {
                    table.add_row(vec![
                        node.id.clone(),
                        node.label.clone(),
                        node.depth.to_string(),
                        if node.is_labelled { "yes" } else { "no" }.to_string(),
                    ]);
                }
                println!("{}", table);
                println!("{} similarity edge(s)", graph.edges.len());
            }
        }
    }
    Ok(())
}

async fn run_communities(url: &str, limit: usize, format: &OutputFormat) -> Result<()> {
    let client = RemoteClient::new(url)?;
    let analysis = client.communities().await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&analysis)?),
        OutputFormat::Table => {
            if analysis.communities.is_empty() {
                println!("(no communities, run `label` first)");
                return Ok(());
            }
            let mut table = new_table(&["Community", "Size", "Labeled", "Unlabeled", "Top EC"]);
            for community in analysis.communities.iter().take(limit) {
                table.add_row(vec![
                    community.community_id.to_string(),
                    community.size.to_string(),
                    community.labeled_proteins.to_string(),
                    community.unlabeled_proteins.to_string(),
                    community.ec_numbers.first().cloned().unwrap_or_else(|| "-".to_string()),
                ]);
            }
            println!("{}", table);
            println!(
                "{} communities, {} proteins, labeling rate {:.1}%",
                analysis.total_communities,
                analysis.total_proteins_in_communities,
                analysis.overall_labeling_rate * 100.0
            );
        }
    }
    Ok(())
}

async fn run_label(url: &str, status_only: bool, format: &OutputFormat) -> Result<()> {
    let client = RemoteClient::new(url)?;

    if status_only {
        let state = client.labeling_state().await?;
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&state)?),
            OutputFormat::Table => {
                println!("Enabled:     {}", state.enabled);
                println!("In progress: {}", state.in_progress);
                if let Some(result) = &state.last_result {
                    println!("Last result: {}", result.message);
                }
            }
        }
        return Ok(());
    }

    eprintln!("Labeling in progress...");
    match client.start_labeling().await {
        Ok(response) => {
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
                OutputFormat::Table => println!("{}", response.message),
            }
            if !response.success {
                std::process::exit(1);
            }
            Ok(())
        }
        Err(ClientError::Busy) => {
            println!("A labeling run is already in progress.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
