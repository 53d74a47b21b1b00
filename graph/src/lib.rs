pub mod config;
pub mod core;
pub mod error;
pub mod layout;

pub use crate::core::{CommitGraph, CommitRecord, EdgeKind, GraphEdge, GraphNode, GraphSnapshot, ParentIds};
pub use crate::layout::{color_index, LaneAllocator, LaneIdx, LayoutState, ReservationTable, DEFAULT_PALETTE_SIZE};
pub use config::GraphConfig;
pub use error::{GraphError, Result};
