use std::collections::BTreeSet;

use super::LaneIdx;

/// Hands out lane indices, always the smallest one not in use.
///
/// Lanes below `width` are active unless they sit in `free`. Releasing the
/// topmost lane shrinks `width`, so trailing free lanes never linger.
#[derive(Debug, Clone, Default)]
pub struct LaneAllocator {
    free: BTreeSet<LaneIdx>,
    width: usize,
    peak: usize,
}

impl LaneAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the smallest inactive lane and mark it active
    pub fn allocate(&mut self) -> LaneIdx {
        let lane = match self.free.pop_first() {
            Some(lane) => lane,
            None => {
                let lane = self.width;
                self.width += 1;
                lane
            }
        };
        self.peak = self.peak.max(self.width);
        lane
    }

    /// Mark `lane` inactive. Returns false if it was not active.
    pub fn release(&mut self, lane: LaneIdx) -> bool {
        if !self.is_active(lane) {
            return false;
        }

        if lane + 1 == self.width {
            self.width -= 1;
            while self.width > 0 && self.free.remove(&(self.width - 1)) {
                self.width -= 1;
            }
        } else {
            self.free.insert(lane);
        }
        true
    }

    pub fn is_active(&self, lane: LaneIdx) -> bool {
        lane < self.width && !self.free.contains(&lane)
    }

    /// Active lanes in ascending order
    pub fn active_lanes(&self) -> impl Iterator<Item = LaneIdx> + '_ {
        (0..self.width).filter(move |lane| !self.free.contains(lane))
    }

    pub fn active_count(&self) -> usize {
        self.width - self.free.len()
    }

    /// One past the highest active lane
    pub fn width(&self) -> usize {
        self.width
    }

    /// Largest width ever reached
    pub fn peak(&self) -> usize {
        self.peak
    }
}
