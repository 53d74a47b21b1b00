use serde::{Deserialize, Serialize};

use crate::layout::{color_index, LaneIdx};

/// How an edge got its lanes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// First-parent continuation, carried in the child's lane
    Straight,
    /// Edge to a non-first parent, fanned out into a freshly allocated lane
    Merge,
    /// Target was already reserved by another child; the edge joins that lane
    Converging,
}

/// An edge from a commit to one of its parents
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Child commit ID
    pub from_id: String,
    /// Parent commit ID (may not be loaded yet)
    pub to_id: String,
    pub start_row: usize,
    /// `None` while the parent has not been visited (open edge)
    pub end_row: Option<usize>,
    pub start_lane: LaneIdx,
    pub end_lane: LaneIdx,
    pub kind: EdgeKind,
}

impl GraphEdge {
    pub fn is_open(&self) -> bool {
        self.end_row.is_none()
    }

    /// True when the edge stays in a single lane
    pub fn is_straight(&self) -> bool {
        self.start_lane == self.end_lane
    }

    /// Color of the child the edge leaves from
    pub fn color_index(&self, palette_size: usize) -> usize {
        color_index(self.start_lane, palette_size)
    }

    /// Check whether the edge's line crosses `row` without starting or ending there.
    /// Open edges run to the bottom of the loaded window.
    pub fn passes_through(&self, row: usize) -> bool {
        row > self.start_row && self.end_row.map_or(true, |end| row < end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(start_row: usize, end_row: Option<usize>) -> GraphEdge {
        GraphEdge {
            from_id: "child".into(),
            to_id: "parent".into(),
            start_row,
            end_row,
            start_lane: 0,
            end_lane: 1,
            kind: EdgeKind::Converging,
        }
    }

    #[test]
    fn closed_edge_passes_only_between_endpoints() {
        let e = edge(2, Some(5));
        assert!(!e.is_open());
        assert!(!e.is_straight());
        assert!(!e.passes_through(2));
        assert!(e.passes_through(3));
        assert!(e.passes_through(4));
        assert!(!e.passes_through(5));
    }

    #[test]
    fn open_edge_runs_to_the_bottom() {
        let e = edge(0, None);
        assert!(e.is_open());
        assert!(e.passes_through(1));
        assert!(e.passes_through(1_000));
    }

    #[test]
    fn color_comes_from_child_lane() {
        let mut e = edge(0, None);
        e.start_lane = 9;
        e.end_lane = 2;
        assert_eq!(e.color_index(8), 1);
        assert_eq!(e.color_index(4), 1);
    }

    #[test]
    fn open_end_row_serializes_as_null() {
        let json = serde_json::to_value(edge(0, None)).unwrap();
        assert!(json["end_row"].is_null());
        assert_eq!(json["kind"], "converging");
    }
}
