pub mod allocator;
pub mod builder;
pub mod color;
pub mod reservation;

pub use allocator::LaneAllocator;
pub use builder::{GraphBuilder, LayoutState};
pub use color::{color_index, DEFAULT_PALETTE_SIZE};
pub use reservation::ReservationTable;

/// A lane is a vertical column in the graph
pub type LaneIdx = usize;
