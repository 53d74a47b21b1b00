pub mod edge;
pub mod graph;
pub mod node;
pub mod record;

pub use edge::{EdgeKind, GraphEdge};
pub use graph::{CommitGraph, GraphSnapshot};
pub use node::GraphNode;
pub use record::{CommitRecord, ParentIds};
