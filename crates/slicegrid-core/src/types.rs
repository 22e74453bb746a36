//! Domain types shared by the balancing strategies and the evaluator.
//!
//! A [`Region`] is the immutable input: zones with their endpoint counts and
//! their share of client-originating nodes. Every strategy turns a region into
//! [`SliceGroups`], a label-keyed map of [`SliceGroup`]s.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of a zone in a region.
pub type ZoneName = String;

/// Result of a balancing run: group label → slice group.
pub type SliceGroups = BTreeMap<String, SliceGroup>;

// ── Region ─────────────────────────────────────────────────────────

/// Per-zone input to a balancing run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneInfo {
    /// Endpoints physically located in this zone.
    pub endpoints: u32,
    /// Fraction of client-originating nodes in this zone (0.0..=1.0).
    pub nodes_ratio: f64,
}

/// A set of zones and the region-wide endpoint total.
///
/// `zones` is optional so that a missing zone map can be represented and
/// rejected by the strategies as a precondition violation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub zones: Option<BTreeMap<ZoneName, ZoneInfo>>,
    pub total_endpoints: u32,
}

impl Region {
    /// Build a region, deriving `total_endpoints` from the zones.
    ///
    /// Returns `None` if the endpoint total does not fit in a `u32`.
    pub fn new(zones: BTreeMap<ZoneName, ZoneInfo>) -> Option<Self> {
        let total_endpoints = zones
            .values()
            .try_fold(0u32, |total, z| total.checked_add(z.endpoints))?;
        Some(Self {
            zones: Some(zones),
            total_endpoints,
        })
    }

    /// Number of zones, or zero when the zone map is missing.
    pub fn zone_count(&self) -> usize {
        self.zones.as_ref().map_or(0, BTreeMap::len)
    }

    /// Endpoints a zone should hold given its share of nodes.
    pub fn expected_endpoints(&self, zone: &ZoneInfo) -> f64 {
        zone.nodes_ratio * f64::from(self.total_endpoints)
    }
}

// ── Slice groups ───────────────────────────────────────────────────

/// Endpoints contributed by one zone to one slice group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedEndpoints {
    pub number: u32,
    /// Routing weight of each contributed endpoint.
    pub weight: f64,
}

/// A named, routable bundle of endpoints assembled from one or more zones.
///
/// `zone_traffic_weights` says which zones' *traffic* is routed here;
/// `composition` says which zones' *endpoints* serve it. The two are
/// independent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SliceGroup {
    pub label: String,
    pub zone_traffic_weights: BTreeMap<ZoneName, f64>,
    pub composition: BTreeMap<ZoneName, WeightedEndpoints>,
}

impl SliceGroup {
    /// An empty group with no traffic and no endpoints.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    /// A zone-local group: the zone's own endpoints serving only its own traffic.
    pub fn local(zone: &str, endpoints: u32) -> Self {
        let mut group = Self::new(zone);
        group.zone_traffic_weights.insert(zone.to_string(), 1.0);
        if endpoints > 0 {
            group.add_endpoints(zone, endpoints, 1.0);
        }
        group
    }

    /// Total endpoints in this group across all contributing zones.
    pub fn size(&self) -> u32 {
        self.composition.values().map(|w| w.number).sum()
    }

    /// Endpoints contributed by `zone`.
    pub fn endpoints_from(&self, zone: &str) -> u32 {
        self.composition.get(zone).map_or(0, |w| w.number)
    }

    /// Add `count` endpoints from `zone`, setting the contribution's weight.
    pub fn add_endpoints(&mut self, zone: &str, count: u32, weight: f64) {
        let entry = self
            .composition
            .entry(zone.to_string())
            .or_insert(WeightedEndpoints { number: 0, weight });
        entry.number += count;
        entry.weight = weight;
    }

    /// Remove one endpoint contributed by `zone`.
    ///
    /// Returns `false` (and leaves the group untouched) if `zone` has
    /// nothing left in this group. The entry is kept at zero so the
    /// zone's contribution stays visible.
    pub fn remove_endpoint(&mut self, zone: &str) -> bool {
        match self.composition.get_mut(zone) {
            Some(entry) if entry.number > 0 => {
                entry.number -= 1;
                true
            }
            _ => false,
        }
    }

    /// Whether traffic from `zone` is routed to this group.
    pub fn receives_traffic_from(&self, zone: &str) -> bool {
        self.zone_traffic_weights
            .get(zone)
            .is_some_and(|w| *w > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(endpoints: u32, nodes_ratio: f64) -> ZoneInfo {
        ZoneInfo {
            endpoints,
            nodes_ratio,
        }
    }

    #[test]
    fn region_new_sums_endpoints() {
        let region = Region::new(BTreeMap::from([
            ("a".to_string(), zone(4, 0.5)),
            ("b".to_string(), zone(6, 0.5)),
        ]))
        .unwrap();
        assert_eq!(region.total_endpoints, 10);
        assert_eq!(region.zone_count(), 2);
    }

    #[test]
    fn region_new_rejects_overflowing_total() {
        let zones = BTreeMap::from([
            ("a".to_string(), zone(u32::MAX, 0.5)),
            ("b".to_string(), zone(2, 0.5)),
        ]);
        assert!(Region::new(zones).is_none());

        let exact = BTreeMap::from([
            ("a".to_string(), zone(u32::MAX - 2, 0.5)),
            ("b".to_string(), zone(2, 0.5)),
        ]);
        assert_eq!(Region::new(exact).unwrap().total_endpoints, u32::MAX);
    }

    #[test]
    fn missing_zones_count_as_zero() {
        let region = Region::default();
        assert!(region.zones.is_none());
        assert_eq!(region.zone_count(), 0);
    }

    #[test]
    fn expected_endpoints_follows_ratio() {
        let region = Region::new(BTreeMap::from([
            ("a".to_string(), zone(10, 0.5)),
            ("b".to_string(), zone(0, 0.3)),
            ("c".to_string(), zone(0, 0.2)),
        ]))
        .unwrap();
        let b = region.zones.as_ref().unwrap()["b"];
        assert_eq!(region.expected_endpoints(&b), 3.0);
    }

    #[test]
    fn local_group_routes_own_traffic() {
        let group = SliceGroup::local("us-east-1a", 3);
        assert_eq!(group.label, "us-east-1a");
        assert_eq!(group.size(), 3);
        assert!(group.receives_traffic_from("us-east-1a"));
        assert!(!group.receives_traffic_from("us-east-1b"));
    }

    #[test]
    fn local_group_with_no_endpoints_is_empty() {
        let group = SliceGroup::local("a", 0);
        assert!(group.composition.is_empty());
        assert_eq!(group.size(), 0);
        assert!(group.receives_traffic_from("a"));
    }

    #[test]
    fn add_and_remove_endpoints() {
        let mut group = SliceGroup::local("a", 2);
        group.add_endpoints("b", 1, 1.0);
        assert_eq!(group.size(), 3);
        assert_eq!(group.endpoints_from("b"), 1);

        assert!(group.remove_endpoint("a"));
        assert!(group.remove_endpoint("a"));
        assert!(!group.remove_endpoint("a"));
        assert_eq!(group.endpoints_from("a"), 0);
        assert!(group.composition.contains_key("a"));
        assert!(!group.remove_endpoint("missing"));
        assert_eq!(group.size(), 1);
    }

    #[test]
    fn slice_group_serializes_to_json() {
        let group = SliceGroup::local("a", 2);
        let json = serde_json::to_value(&group).unwrap();
        assert_eq!(json["label"], "a");
        assert_eq!(json["composition"]["a"]["number"], 2);
        assert_eq!(json["zone_traffic_weights"]["a"], 1.0);
    }
}
