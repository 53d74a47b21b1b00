use std::collections::HashMap;

use smallvec::SmallVec;

use super::{LaneAllocator, LaneIdx, ReservationTable};
use crate::core::{CommitRecord, EdgeKind, GraphEdge, GraphNode};

/// Engine state carried from one batch to the next
#[derive(Debug, Clone, Default)]
pub struct LayoutState {
    pub reservations: ReservationTable,
    pub lanes: LaneAllocator,
    /// Parent id -> indices of edges still waiting for that parent's row
    pending: HashMap<String, SmallVec<[usize; 2]>>,
}

impl LayoutState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of edges whose parent has not been visited
    pub fn open_edge_count(&self) -> usize {
        self.pending.values().map(|edges| edges.len()).sum()
    }

    pub fn is_pending(&self, parent_id: &str) -> bool {
        self.pending.contains_key(parent_id)
    }
}

/// Single-pass lane assignment over commits in input order.
///
/// Writes straight into the owning graph's node and edge lists; the graph
/// only hands out a builder after the batch has been validated.
pub struct GraphBuilder<'g> {
    state: &'g mut LayoutState,
    nodes: &'g mut Vec<GraphNode>,
    index: &'g mut HashMap<String, usize>,
    edges: &'g mut Vec<GraphEdge>,
    palette_size: usize,
}

impl<'g> GraphBuilder<'g> {
    pub fn new(
        state: &'g mut LayoutState,
        nodes: &'g mut Vec<GraphNode>,
        index: &'g mut HashMap<String, usize>,
        edges: &'g mut Vec<GraphEdge>,
        palette_size: usize,
    ) -> Self {
        Self {
            state,
            nodes,
            index,
            edges,
            palette_size,
        }
    }

    /// Place one commit: resolve its lane, emit its node, and route its parent edges
    pub fn place(&mut self, commit: CommitRecord) {
        let CommitRecord { id, parent_ids, row } = commit;

        let lane = self.resolve_lane(&id);
        self.close_pending(&id, row);

        tracing::trace!(commit = %id, row, lane, "placed commit");

        for (i, parent) in parent_ids.iter().enumerate() {
            let (end_lane, kind) = if i == 0 {
                self.continue_first_parent(&id, parent, lane)
            } else {
                self.fan_out(parent)
            };
            self.push_edge(&id, parent, row, lane, end_lane, kind);
        }

        // A root owes its lane to nobody
        if parent_ids.is_empty() {
            self.state.lanes.release(lane);
        }

        self.index.insert(id.clone(), self.nodes.len());
        self.nodes.push(GraphNode::new(id, row, lane, self.palette_size));
    }

    /// Reserved lane if a child already claimed one, otherwise a fresh lane (branch tip)
    fn resolve_lane(&mut self, id: &str) -> LaneIdx {
        match self.state.reservations.take(id) {
            Some(lane) => lane,
            None => self.state.lanes.allocate(),
        }
    }

    /// Fill in `end_row` on every edge that was waiting for this commit
    fn close_pending(&mut self, id: &str, row: usize) {
        if let Some(waiting) = self.state.pending.remove(id) {
            for edge_idx in waiting {
                self.edges[edge_idx].end_row = Some(row);
            }
        }
    }

    /// First parent keeps the child's lane, unless another child got there first
    fn continue_first_parent(&mut self, id: &str, parent: &str, lane: LaneIdx) -> (LaneIdx, EdgeKind) {
        match self.state.reservations.reserve(parent, lane) {
            None => (lane, EdgeKind::Straight),
            Some(existing) => {
                tracing::debug!(
                    commit = %id,
                    parent = %parent,
                    from_lane = lane,
                    to_lane = existing,
                    "converging into reserved lane"
                );
                if existing != lane {
                    self.state.lanes.release(lane);
                }
                (existing, EdgeKind::Converging)
            }
        }
    }

    /// Non-first parents get their own lane, or join one already reserved for them
    fn fan_out(&mut self, parent: &str) -> (LaneIdx, EdgeKind) {
        if let Some(existing) = self.state.reservations.get(parent) {
            return (existing, EdgeKind::Converging);
        }
        let new_lane = self.state.lanes.allocate();
        self.state.reservations.reserve(parent, new_lane);
        (new_lane, EdgeKind::Merge)
    }

    fn push_edge(
        &mut self,
        from: &str,
        to: &str,
        start_row: usize,
        start_lane: LaneIdx,
        end_lane: LaneIdx,
        kind: EdgeKind,
    ) {
        self.state
            .pending
            .entry(to.to_string())
            .or_default()
            .push(self.edges.len());
        self.edges.push(GraphEdge {
            from_id: from.to_string(),
            to_id: to.to_string(),
            start_row,
            end_row: None,
            start_lane,
            end_lane,
            kind,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Harness {
        state: LayoutState,
        nodes: Vec<GraphNode>,
        index: HashMap<String, usize>,
        edges: Vec<GraphEdge>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                state: LayoutState::new(),
                nodes: Vec::new(),
                index: HashMap::new(),
                edges: Vec::new(),
            }
        }

        fn place(&mut self, id: &str, parents: &[&str]) {
            let row = self.nodes.len();
            let mut builder = GraphBuilder::new(
                &mut self.state,
                &mut self.nodes,
                &mut self.index,
                &mut self.edges,
                8,
            );
            builder.place(CommitRecord::new(id, parents.iter().copied(), row));
        }

        fn lane(&self, id: &str) -> LaneIdx {
            self.nodes[self.index[id]].lane()
        }
    }

    #[test]
    fn branch_tip_without_reservation_gets_new_lane() {
        let mut h = Harness::new();
        h.place("main", &["base"]);
        h.place("topic", &["t0"]);
        assert_eq!(h.lane("main"), 0);
        assert_eq!(h.lane("topic"), 1);
        assert!(h.state.reservations.contains("base"));
        assert!(h.state.reservations.contains("t0"));
    }

    #[test]
    fn root_releases_its_lane() {
        let mut h = Harness::new();
        h.place("b", &["a"]);
        h.place("a", &[]);
        assert_eq!(h.state.lanes.active_count(), 0);
        assert_eq!(h.edges[0].end_row, Some(1));
        assert_eq!(h.state.open_edge_count(), 0);
    }

    #[test]
    fn convergence_releases_child_lane() {
        let mut h = Harness::new();
        h.place("x", &["base"]);
        h.place("y", &["base"]);
        assert_eq!(h.lane("y"), 1);
        assert_eq!(h.edges[1].kind, EdgeKind::Converging);
        assert_eq!((h.edges[1].start_lane, h.edges[1].end_lane), (1, 0));
        assert_eq!(h.state.lanes.active_lanes().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn merge_parent_already_reserved_joins_existing_lane() {
        let mut h = Harness::new();
        h.place("side", &["base"]);
        h.place("merge", &["main", "base"]);
        assert_eq!(h.lane("merge"), 1);
        let join = &h.edges[2];
        assert_eq!(join.kind, EdgeKind::Converging);
        assert_eq!((join.start_lane, join.end_lane), (1, 0));
        // no lane was spent on the second parent
        assert_eq!(h.state.lanes.width(), 2);
    }

    #[test]
    fn duplicated_parent_does_not_leak_lanes() {
        let mut h = Harness::new();
        h.place("m", &["p", "p"]);
        assert_eq!(h.state.lanes.active_count(), 1);
        assert_eq!(h.edges[1].kind, EdgeKind::Converging);
        h.place("p", &[]);
        assert!(h.edges.iter().all(|e| e.end_row == Some(1)));
        assert_eq!(h.state.lanes.active_count(), 0);
    }

    #[test]
    fn self_parent_leaves_edge_open_and_lane_held() {
        let mut h = Harness::new();
        h.place("loop", &["loop"]);
        assert!(h.edges[0].is_open());
        assert!(h.state.is_pending("loop"));
        assert_eq!(h.state.lanes.active_count(), 1);
    }
}
