use std::collections::HashMap;

use super::LaneIdx;

/// Lanes owed to commits that have not been visited yet.
///
/// A child reserves a lane for its parent so the parent shows up in the same
/// track further down. The first reservation for a commit wins; later ones
/// are refused and the caller turns them into converging edges.
#[derive(Debug, Clone, Default)]
pub struct ReservationTable {
    reserved: HashMap<String, LaneIdx>,
}

impl ReservationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `lane` for `id` unless `id` already holds a reservation.
    ///
    /// Returns `None` when the reservation was recorded, or the lane that was
    /// already reserved for `id` (which is left untouched).
    pub fn reserve(&mut self, id: &str, lane: LaneIdx) -> Option<LaneIdx> {
        if let Some(&existing) = self.reserved.get(id) {
            return Some(existing);
        }
        self.reserved.insert(id.to_string(), lane);
        None
    }

    /// Remove and return the reservation for `id`
    pub fn take(&mut self, id: &str) -> Option<LaneIdx> {
        self.reserved.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<LaneIdx> {
        self.reserved.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.reserved.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.reserved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reserved.is_empty()
    }

    /// Reserved lanes, in no particular order
    pub fn lanes(&self) -> impl Iterator<Item = LaneIdx> + '_ {
        self.reserved.values().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_consumes_reservation() {
        let mut table = ReservationTable::new();
        assert_eq!(table.reserve("a", 0), None);
        assert_eq!(table.get("a"), Some(0));
        assert_eq!(table.take("a"), Some(0));
        assert_eq!(table.take("a"), None);
        assert!(table.is_empty());
    }

    #[test]
    fn first_reservation_wins() {
        let mut table = ReservationTable::new();
        assert_eq!(table.reserve("base", 1), None);
        assert_eq!(table.reserve("base", 0), Some(1));
        assert_eq!(table.reserve("base", 4), Some(1));
        assert_eq!(table.len(), 1);
        assert_eq!(table.take("base"), Some(1));
    }

    #[test]
    fn unknown_commit_has_no_reservation() {
        let mut table = ReservationTable::new();
        assert!(!table.contains("tip"));
        assert_eq!(table.take("tip"), None);
    }
}
