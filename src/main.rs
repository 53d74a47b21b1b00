use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use graph::{CommitGraph, EdgeKind, GraphConfig};
use tracing_subscriber::EnvFilter;

mod render;
mod session;
mod walker;

use render::TextRenderer;
use session::{LoadOptions, LoadedHistory};

#[derive(Parser)]
#[command(name = "lanes")]
#[command(about = "Lay out git history as lanes, nodes and edges", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw the commit graph
    Graph {
        /// Path to the repository
        #[arg(default_value = ".")]
        path: PathBuf,
        #[command(flatten)]
        load: LoadArgs,
        /// Print nodes, edges and open parents as JSON
        #[arg(long)]
        json: bool,
        /// Disable ANSI colors
        #[arg(long)]
        no_color: bool,
        /// Maximum display width of commit summaries
        #[arg(long, default_value = "60")]
        summary_width: usize,
    },
    /// Summarize lane usage
    Stats {
        /// Path to the repository
        #[arg(default_value = ".")]
        path: PathBuf,
        #[command(flatten)]
        load: LoadArgs,
    },
}

#[derive(Args)]
struct LoadArgs {
    /// Commits laid out per batch
    #[arg(long, default_value = "200")]
    page_size: usize,
    /// Stop after this many commits
    #[arg(short = 'n', long)]
    limit: Option<usize>,
    /// Number of lane colors
    #[arg(long, default_value = "8")]
    palette_size: usize,
}

impl LoadArgs {
    fn into_options(self, path: PathBuf) -> LoadOptions {
        LoadOptions {
            path,
            page_size: self.page_size,
            limit: self.limit,
            config: GraphConfig::with_palette_size(self.palette_size),
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn load(options: LoadOptions) -> Result<LoadedHistory> {
    let (handle, mut snapshots) = session::spawn_layout(options);

    let progress = tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            let snapshot = snapshots.borrow_and_update().clone();
            tracing::info!(
                rows = snapshot.nodes.len(),
                open_parents = snapshot.open_parent_ids.len(),
                "graph snapshot published"
            );
        }
    });

    let history = handle.await.context("Layout worker panicked")??;
    if let Err(e) = progress.await {
        tracing::warn!(error = %e, "progress reporter stopped abnormally");
    }
    Ok(history)
}

fn print_stats(graph: &CommitGraph) {
    let mut outgoing: HashMap<&str, usize> = HashMap::new();
    for edge in graph.edges() {
        *outgoing.entry(edge.from_id.as_str()).or_default() += 1;
    }
    let merges = outgoing.values().filter(|&&count| count > 1).count();
    let roots = graph.len() - outgoing.len();

    println!("Commits:          {}", graph.len());
    println!("Merge commits:    {}", merges);
    println!("Root commits:     {}", roots);
    println!("Straight edges:   {}", graph.count_edges(EdgeKind::Straight));
    println!("Merge edges:      {}", graph.count_edges(EdgeKind::Merge));
    println!("Converging edges: {}", graph.count_edges(EdgeKind::Converging));
    println!("Lane width:       {}", graph.lane_width());
    println!("Open parents:     {}", graph.open_parent_ids().len());
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Graph { path, load: args, json, no_color, summary_width } => {
            let history = load(args.into_options(path)).await?;

            if json {
                let out = serde_json::to_string_pretty(&history.graph.snapshot())?;
                println!("{}", out);
            } else {
                let renderer = TextRenderer::new(!no_color, summary_width);
                print!("{}", renderer.render(&history.graph, |id| history.meta(id)));
            }
        }
        Commands::Stats { path, load: args } => {
            let history = load(args.into_options(path)).await?;
            print_stats(&history.graph);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walker::test_support::linear_repo;

    #[tokio::test]
    async fn load_waits_for_worker_and_progress_reporter() -> Result<()> {
        let (dir, _repo) = linear_repo(5)?;
        let args = LoadArgs {
            page_size: 2,
            limit: None,
            palette_size: 8,
        };
        let history = load(args.into_options(dir.path().to_path_buf())).await?;

        assert_eq!(history.graph.len(), 5);
        assert!(history.graph.nodes().iter().all(|n| history.meta(n.id()).is_some()));
        Ok(())
    }

    #[tokio::test]
    async fn load_reports_invalid_palette() {
        let dir = tempfile::TempDir::new().unwrap();
        git2::Repository::init(dir.path()).unwrap();
        let args = LoadArgs {
            page_size: 2,
            limit: None,
            palette_size: 0,
        };
        assert!(load(args.into_options(dir.path().to_path_buf())).await.is_err());
    }
}
