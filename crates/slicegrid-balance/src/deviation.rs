//! Ordered work-lists of outstanding endpoint demand.

use std::collections::VecDeque;

/// "This zone still needs `deviation_count` endpoint units, each worth
/// `weight` real endpoints."
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointDeviation {
    /// Zone name, or the label of a merged pseudo-zone.
    pub zone_name: String,
    pub deviation_count: u32,
    pub weight: f64,
}

impl EndpointDeviation {
    pub fn new(zone_name: impl Into<String>, deviation_count: u32, weight: f64) -> Self {
        Self {
            zone_name: zone_name.into(),
            deviation_count,
            weight,
        }
    }

    /// Real endpoints this entry represents.
    pub fn weighted(&self) -> f64 {
        f64::from(self.deviation_count) * self.weight
    }
}

/// FIFO of [`EndpointDeviation`]s with push-to-front for urgent demand.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviationQueue {
    entries: VecDeque<EndpointDeviation>,
}

impl DeviationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: EndpointDeviation) {
        self.entries.push_back(entry);
    }

    pub fn push_front(&mut self, entry: EndpointDeviation) {
        self.entries.push_front(entry);
    }

    pub fn pop_front(&mut self) -> Option<EndpointDeviation> {
        self.entries.pop_front()
    }

    pub fn front(&self) -> Option<&EndpointDeviation> {
        self.entries.front()
    }

    pub fn front_mut(&mut self) -> Option<&mut EndpointDeviation> {
        self.entries.front_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EndpointDeviation> {
        self.entries.iter()
    }

    /// Sum of outstanding units across all entries.
    pub fn total_units(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.deviation_count)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order() {
        let mut q = DeviationQueue::new();
        q.push(EndpointDeviation::new("a", 1, 1.0));
        q.push(EndpointDeviation::new("b", 2, 1.0));

        assert_eq!(q.len(), 2);
        assert_eq!(q.pop_front().unwrap().zone_name, "a");
        assert_eq!(q.pop_front().unwrap().zone_name, "b");
        assert!(q.pop_front().is_none());
        assert!(q.is_empty());
    }

    #[test]
    fn push_front_jumps_the_queue() {
        let mut q = DeviationQueue::new();
        q.push(EndpointDeviation::new("a", 1, 1.0));
        q.push_front(EndpointDeviation::new("merged-b", 3, 1.0));

        assert_eq!(q.front().unwrap().zone_name, "merged-b");
        assert_eq!(q.total_units(), 4);
    }

    #[test]
    fn front_mut_decrements_in_place() {
        let mut q = DeviationQueue::new();
        q.push(EndpointDeviation::new("a", 2, 1.0));

        q.front_mut().unwrap().deviation_count -= 1;
        assert_eq!(q.front().unwrap().deviation_count, 1);
    }

    #[test]
    fn weighted_scales_by_weight() {
        let entry = EndpointDeviation::new("b", 1, 2.5);
        assert_eq!(entry.weighted(), 2.5);
    }
}
