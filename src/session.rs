use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use graph::{CommitGraph, GraphConfig, GraphSnapshot};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::walker::{CommitMeta, GitWalker};

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub path: PathBuf,
    /// Commits per `extend` call
    pub page_size: usize,
    /// Stop loading after this many commits
    pub limit: Option<usize>,
    pub config: GraphConfig,
}

pub struct LoadedHistory {
    pub graph: CommitGraph,
    pub meta: HashMap<String, CommitMeta>,
}

impl LoadedHistory {
    pub fn meta(&self, id: &str) -> Option<&CommitMeta> {
        self.meta.get(id)
    }
}

/// Latest fully laid out snapshot; never reflects a half-processed page
pub type SnapshotReceiver = watch::Receiver<Arc<GraphSnapshot>>;

/// Lay out history on a blocking worker thread, one page at a time.
///
/// A fresh snapshot is published after each page. Dropping the receiver does
/// not stop the worker; the final graph comes back through the join handle.
pub fn spawn_layout(options: LoadOptions) -> (JoinHandle<Result<LoadedHistory>>, SnapshotReceiver) {
    let (tx, rx) = watch::channel(Arc::new(CommitGraph::new().snapshot()));
    let handle = tokio::task::spawn_blocking(move || layout_pages(options, &tx));
    (handle, rx)
}

fn layout_pages(options: LoadOptions, tx: &watch::Sender<Arc<GraphSnapshot>>) -> Result<LoadedHistory> {
    let walker = GitWalker::open(&options.path)?;
    let mut graph = CommitGraph::with_config(options.config)?;
    let mut meta = HashMap::new();
    let mut remaining = options.limit.unwrap_or(usize::MAX);

    for page in walker.pages(options.page_size)? {
        if remaining == 0 {
            tracing::info!(rows = graph.len(), "commit limit reached");
            break;
        }

        let mut page = page?;
        page.truncate(remaining);
        remaining -= page.len();

        let mut records = Vec::with_capacity(page.len());
        for loaded in page {
            meta.insert(loaded.record.id.clone(), loaded.meta);
            records.push(loaded.record);
        }
        graph.extend(records).context("Failed to lay out commit page")?;

        tx.send_replace(Arc::new(graph.snapshot()));
    }

    Ok(LoadedHistory { graph, meta })
}
