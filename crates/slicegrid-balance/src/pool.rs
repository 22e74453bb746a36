//! Zone priority pools.
//!
//! Both pools are binary heaps of `(key, zone)` snapshots. Keys are computed
//! at push time from the caller-supplied endpoint count and a read-only map
//! of expected endpoints, so an entry must be re-pushed whenever the zone's
//! holdings change. Receiver entries also carry the `held` count they were
//! keyed on, letting the caller detect and refresh a stale entry on pop.
//!
//! - [`DonorPool`] surfaces the largest surplus (`own - expected`) first.
//! - [`ReceiverPool`] surfaces the least relatively served zone first,
//!   measured as `(held + 1) / expected`: the fill level the zone would
//!   reach with one more endpoint.
//!
//! Ties are broken by the lexicographically smaller zone name.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

/// Zone name → expected endpoint count (`nodes_ratio * total_endpoints`).
pub type Expectations = BTreeMap<String, f64>;

#[derive(Debug, Clone)]
struct DonorEntry {
    surplus: f64,
    zone: String,
}

impl PartialEq for DonorEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DonorEntry {}

impl PartialOrd for DonorEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DonorEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.surplus
            .total_cmp(&other.surplus)
            .then_with(|| other.zone.cmp(&self.zone))
    }
}

/// Zones with endpoints to spare, largest surplus first.
#[derive(Debug)]
pub struct DonorPool<'a> {
    expected: &'a Expectations,
    heap: BinaryHeap<DonorEntry>,
}

impl<'a> DonorPool<'a> {
    pub fn new(expected: &'a Expectations) -> Self {
        Self {
            expected,
            heap: BinaryHeap::new(),
        }
    }

    /// Insert `zone`, which currently holds `own` of its own endpoints.
    pub fn push(&mut self, zone: &str, own: u32) {
        let surplus = f64::from(own) - self.expected(zone);
        self.heap.push(DonorEntry {
            surplus,
            zone: zone.to_string(),
        });
    }

    /// Remove and return the zone with the largest surplus.
    pub fn pop(&mut self) -> Option<String> {
        self.heap.pop().map(|e| e.zone)
    }

    pub fn peek(&self) -> Option<&str> {
        self.heap.peek().map(|e| e.zone.as_str())
    }

    pub fn expected(&self, zone: &str) -> f64 {
        self.expected.get(zone).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[derive(Debug, Clone)]
struct ReceiverEntry {
    level: f64,
    zone: String,
    held: u32,
}

impl PartialEq for ReceiverEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ReceiverEntry {}

impl PartialOrd for ReceiverEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ReceiverEntry {
    // Inverted: the lowest service level is the heap maximum.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .level
            .total_cmp(&self.level)
            .then_with(|| other.zone.cmp(&self.zone))
    }
}

/// Zones that can absorb leftover endpoints, least served first.
#[derive(Debug)]
pub struct ReceiverPool<'a> {
    expected: &'a Expectations,
    heap: BinaryHeap<ReceiverEntry>,
}

impl<'a> ReceiverPool<'a> {
    pub fn new(expected: &'a Expectations) -> Self {
        Self {
            expected,
            heap: BinaryHeap::new(),
        }
    }

    /// Insert `zone`, whose group currently holds `held` endpoints.
    pub fn push(&mut self, zone: &str, held: u32) {
        let expected = self.expected.get(zone).copied().unwrap_or(0.0);
        let level = if expected > 0.0 {
            (f64::from(held) + 1.0) / expected
        } else {
            f64::INFINITY
        };
        self.heap.push(ReceiverEntry {
            level,
            zone: zone.to_string(),
            held,
        });
    }

    /// Remove and return the least relatively served zone, together with
    /// the `held` count its entry was keyed on.
    pub fn pop(&mut self) -> Option<(String, u32)> {
        self.heap.pop().map(|e| (e.zone, e.held))
    }

    pub fn peek(&self) -> Option<&str> {
        self.heap.peek().map(|e| e.zone.as_str())
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
