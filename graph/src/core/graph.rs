use std::collections::{HashMap, HashSet};
use std::ops::ControlFlow;

use serde::Serialize;

use super::{CommitRecord, EdgeKind, GraphEdge, GraphNode};
use crate::config::GraphConfig;
use crate::error::{GraphError, Result};
use crate::layout::{GraphBuilder, LaneIdx, LayoutState};

/// Lane layout of a commit history.
///
/// Built from an ordered batch of commits (newest first) and extended with
/// older batches as more history is loaded. Extension only appends nodes and
/// edges and fills in the end row of edges whose parent shows up; nothing
/// already emitted changes otherwise. If the commit order itself changes
/// (branch switch, rebase), build a new graph instead.
#[derive(Debug, Clone)]
pub struct CommitGraph {
    config: GraphConfig,
    nodes: Vec<GraphNode>,
    /// commit ID -> position in `nodes`
    index: HashMap<String, usize>,
    edges: Vec<GraphEdge>,
    state: LayoutState,
}

/// Render-ready view of a graph: nodes, edges and the parents still missing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub open_parent_ids: Vec<String>,
}

impl CommitGraph {
    pub fn new() -> Self {
        Self {
            config: GraphConfig::default(),
            nodes: Vec::new(),
            index: HashMap::new(),
            edges: Vec::new(),
            state: LayoutState::new(),
        }
    }

    pub fn with_config(config: GraphConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    /// Lay out `commits` from scratch
    pub fn build<I>(commits: I) -> Result<Self>
    where
        I: IntoIterator<Item = CommitRecord>,
    {
        let mut graph = Self::new();
        graph.extend(commits)?;
        Ok(graph)
    }

    /// Continue the layout with the next (older) batch of commits.
    ///
    /// The whole batch is checked for duplicate ids before anything is placed,
    /// so on error the graph is left untouched.
    pub fn extend<I>(&mut self, commits: I) -> Result<()>
    where
        I: IntoIterator<Item = CommitRecord>,
    {
        let batch: Vec<CommitRecord> = commits.into_iter().collect();
        self.check_unique(&batch)?;

        let count = batch.len();
        let mut builder = GraphBuilder::new(
            &mut self.state,
            &mut self.nodes,
            &mut self.index,
            &mut self.edges,
            self.config.palette_size,
        );
        for commit in batch {
            builder.place(commit);
        }

        tracing::debug!(
            commits = count,
            total = self.nodes.len(),
            open_edges = self.state.open_edge_count(),
            lane_width = self.state.lanes.width(),
            "extended commit graph"
        );
        Ok(())
    }

    /// Extend in bounded batches, handing the graph to `on_batch` after each one.
    ///
    /// Returning `ControlFlow::Break` stops further batches; the graph stays
    /// valid up to the last completed batch. A `batch_size` of 0 is treated as 1.
    /// Returns the number of commits placed.
    pub fn extend_in_batches<I, F>(&mut self, commits: I, batch_size: usize, mut on_batch: F) -> Result<usize>
    where
        I: IntoIterator<Item = CommitRecord>,
        F: FnMut(&CommitGraph) -> ControlFlow<()>,
    {
        let batch_size = batch_size.max(1);
        let mut commits = commits.into_iter();
        let mut placed = 0;

        loop {
            let batch: Vec<CommitRecord> = commits.by_ref().take(batch_size).collect();
            if batch.is_empty() {
                break;
            }
            placed += batch.len();
            self.extend(batch)?;
            if on_batch(self).is_break() {
                tracing::debug!(placed, "batched extension stopped by caller");
                break;
            }
        }
        Ok(placed)
    }

    fn check_unique(&self, batch: &[CommitRecord]) -> Result<()> {
        let mut seen = HashSet::with_capacity(batch.len());
        for commit in batch {
            if self.index.contains_key(&commit.id) || !seen.insert(commit.id.as_str()) {
                return Err(GraphError::DuplicateCommitId {
                    id: commit.id.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Get a node by commit ID
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Nodes in the order they were placed
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Parents referenced by open edges, in the order they were first referenced
    pub fn open_parent_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.edges
            .iter()
            .filter(|edge| edge.is_open())
            .filter(|edge| seen.insert(edge.to_id.as_str()))
            .map(|edge| edge.to_id.clone())
            .collect()
    }

    /// Edges leaving the commit at `row`
    pub fn edges_for_row(&self, row: usize) -> Vec<&GraphEdge> {
        self.edges.iter().filter(|edge| edge.start_row == row).collect()
    }

    /// Edges whose line crosses `row` without starting or ending on it
    pub fn edges_through_row(&self, row: usize) -> Vec<&GraphEdge> {
        self.edges.iter().filter(|edge| edge.passes_through(row)).collect()
    }

    /// Ids of loaded commits that list `id` as a parent
    pub fn children(&self, id: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|edge| edge.to_id == id)
            .map(|edge| edge.from_id.as_str())
            .collect()
    }

    /// Highest lane any node sits in (0 for an empty graph)
    pub fn max_lane(&self) -> LaneIdx {
        self.nodes.iter().map(|node| node.lane()).max().unwrap_or(0)
    }

    /// Most lanes ever in use at once
    pub fn lane_width(&self) -> usize {
        self.state.lanes.peak()
    }

    /// Lanes still held after the last processed row: lines continuing below the window
    pub fn active_lanes(&self) -> Vec<LaneIdx> {
        self.state.lanes.active_lanes().collect()
    }

    pub fn count_edges(&self, kind: EdgeKind) -> usize {
        self.edges.iter().filter(|edge| edge.kind == kind).count()
    }

    /// Owned copy of the output contract, suitable for publishing to a renderer
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            open_parent_ids: self.open_parent_ids(),
        }
    }
}

impl Default for CommitGraph {
    fn default() -> Self {
        Self::new()
    }
}
