use serde::Serialize;

use crate::layout::{color_index, LaneIdx};

/// A commit placed on the graph.
///
/// Read-only once placed: the color is fixed by the lane at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GraphNode {
    id: String,
    row: usize,
    lane: LaneIdx,
    color_index: usize,
}

impl GraphNode {
    pub fn new(id: String, row: usize, lane: LaneIdx, palette_size: usize) -> Self {
        Self {
            id,
            row,
            lane,
            color_index: color_index(lane, palette_size),
        }
    }

    /// Commit ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Row supplied with the commit record
    pub fn row(&self) -> usize {
        self.row
    }

    /// Vertical track this commit is drawn in
    pub fn lane(&self) -> LaneIdx {
        self.lane
    }

    /// Always `lane % palette_size`
    pub fn color_index(&self) -> usize {
        self.color_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_follows_lane() {
        let node = GraphNode::new("abc".to_string(), 3, 9, 8);
        assert_eq!(node.lane(), 9);
        assert_eq!(node.color_index(), 1);
        assert_eq!((node.id(), node.row()), ("abc", 3));
    }

    #[test]
    fn serializes_all_fields() {
        let json = serde_json::to_value(GraphNode::new("abc".to_string(), 3, 9, 8)).unwrap();
        assert_eq!(json, serde_json::json!({"id": "abc", "row": 3, "lane": 9, "color_index": 1}));
    }
}
