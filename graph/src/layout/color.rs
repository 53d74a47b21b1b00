use super::LaneIdx;

/// Palette size used when no configuration says otherwise
pub const DEFAULT_PALETTE_SIZE: usize = 8;

/// Cyclic color index for a lane. A zero-sized palette maps everything to 0.
pub fn color_index(lane: LaneIdx, palette_size: usize) -> usize {
    if palette_size == 0 {
        return 0;
    }
    lane % palette_size
}
