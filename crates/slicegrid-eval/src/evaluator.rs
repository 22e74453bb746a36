//! Traffic evaluation of a slice-group partition.
//!
//! Each zone originates `nodes_ratio` of the region's traffic. A zone's
//! traffic is split across the non-empty groups that list it in
//! `zone_traffic_weights`, proportionally to that weight; inside a group it
//! is split over endpoints proportionally to each contribution's `weight`.
//!
//! The ideal endpoint carries exactly `1 / total_endpoints` of all traffic.
//! An endpoint's deviation is `|load * total_endpoints - 1|`.

use std::collections::BTreeMap;

use serde::Serialize;
use slicegrid_core::{Region, SliceGroup, SliceGroups};

/// Metrics for one partition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    /// Fraction (0.0..=1.0) of traffic served inside its zone of origin.
    pub in_zone_traffic: f64,
    pub max_deviation: f64,
    pub mean_deviation: f64,
    /// Population standard deviation of per-endpoint deviations.
    pub deviation_sd: f64,
    pub endpoints: u32,
    /// EndpointSlices needed to publish every non-empty group.
    pub endpoint_slices: u32,
    /// Set when some zone's traffic has nowhere to go.
    pub invalid: bool,
}

impl Evaluation {
    pub fn invalid(endpoints: u32) -> Self {
        Self {
            in_zone_traffic: 0.0,
            max_deviation: 0.0,
            mean_deviation: 0.0,
            deviation_sd: 0.0,
            endpoints,
            endpoint_slices: 0,
            invalid: true,
        }
    }
}

/// Sum of `number * weight` over the contributions that can serve traffic.
fn capacity(group: &SliceGroup) -> f64 {
    group
        .composition
        .values()
        .filter(|w| w.number > 0 && w.weight > 0.0)
        .map(|w| f64::from(w.number) * w.weight)
        .sum()
}

/// Evaluate `groups` as a partition of `region`.
pub fn evaluate(region: &Region, groups: &SliceGroups, endpoints_per_slice: u32) -> Evaluation {
    let total = region.total_endpoints;
    let Some(zones) = region.zones.as_ref() else {
        return Evaluation::invalid(total);
    };
    if total == 0 {
        return Evaluation::invalid(total);
    }

    let capacities: BTreeMap<&str, f64> = groups
        .iter()
        .map(|(label, group)| (label.as_str(), capacity(group)))
        .collect();

    // (group label, contributing zone) → load carried by each such endpoint.
    let mut loads: BTreeMap<(&str, &str), f64> = BTreeMap::new();
    let mut in_zone = 0.0;

    for (origin, zone) in zones {
        if zone.nodes_ratio <= 0.0 {
            continue;
        }

        let serving: Vec<(&str, &SliceGroup, f64)> = groups
            .iter()
            .filter(|(label, _)| capacities[label.as_str()] > 0.0)
            .filter_map(|(label, group)| {
                group
                    .zone_traffic_weights
                    .get(origin)
                    .filter(|w| **w > 0.0)
                    .map(|w| (label.as_str(), group, *w))
            })
            .collect();
        let weight_sum: f64 = serving.iter().map(|(_, _, w)| w).sum();
        if serving.is_empty() || weight_sum <= 0.0 {
            return Evaluation::invalid(total);
        }

        for (label, group, weight) in serving {
            let share = zone.nodes_ratio * weight / weight_sum;
            let group_capacity = capacities[label];
            for (contributor, endpoints) in &group.composition {
                if endpoints.number == 0 || endpoints.weight <= 0.0 {
                    continue;
                }
                let per_endpoint = share * endpoints.weight / group_capacity;
                *loads.entry((label, contributor.as_str())).or_insert(0.0) += per_endpoint;
                if contributor == origin {
                    in_zone += per_endpoint * f64::from(endpoints.number);
                }
            }
        }
    }

    let mut counted = 0u32;
    let mut max_deviation = 0.0f64;
    let mut weighted_sum = 0.0;
    let mut deviations = Vec::new();
    for (label, group) in groups {
        for (contributor, endpoints) in &group.composition {
            if endpoints.number == 0 {
                continue;
            }
            let load = loads
                .get(&(label.as_str(), contributor.as_str()))
                .copied()
                .unwrap_or(0.0);
            let deviation = (load * f64::from(total) - 1.0).abs();
            counted += endpoints.number;
            max_deviation = max_deviation.max(deviation);
            weighted_sum += deviation * f64::from(endpoints.number);
            deviations.push((deviation, endpoints.number));
        }
    }
    if counted == 0 {
        return Evaluation::invalid(total);
    }

    let n = f64::from(counted);
    let mean_deviation = weighted_sum / n;
    let variance = deviations
        .iter()
        .map(|(d, count)| f64::from(*count) * (d - mean_deviation).powi(2))
        .sum::<f64>()
        / n;

    let per_slice = endpoints_per_slice.max(1);
    let endpoint_slices = groups
        .values()
        .map(SliceGroup::size)
        .filter(|size| *size > 0)
        .map(|size| size.div_ceil(per_slice))
        .sum();

    Evaluation {
        in_zone_traffic: in_zone,
        max_deviation,
        mean_deviation,
        deviation_sd: variance.sqrt(),
        endpoints: total,
        endpoint_slices,
        invalid: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slicegrid_balance::{LocalSharedAlgorithm, OriginalAlgorithm, SliceAlgorithm};
    use slicegrid_core::ZoneInfo;

    fn region(zones: &[(&str, u32, f64)]) -> Region {
        Region::new(
            zones
                .iter()
                .map(|(n, e, r)| {
                    (
                        n.to_string(),
                        ZoneInfo {
                            endpoints: *e,
                            nodes_ratio: *r,
                        },
                    )
                })
                .collect(),
        )
        .unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn balanced_merge_has_no_deviation() {
        let region = region(&[("a", 10, 0.5), ("b", 0, 0.3), ("c", 0, 0.2)]);
        let groups = LocalSharedAlgorithm::default()
            .create_slice_groups(&region)
            .unwrap();

        let eval = evaluate(&region, &groups, 100);

        assert!(!eval.invalid);
        assert!(approx(eval.in_zone_traffic, 0.5));
        assert!(approx(eval.max_deviation, 0.0));
        assert!(approx(eval.mean_deviation, 0.0));
        assert_eq!(eval.endpoint_slices, 2);
        assert_eq!(eval.endpoints, 10);
    }

    #[test]
    fn skewed_original_deviates() {
        let region = region(&[("a", 3, 0.5), ("b", 1, 0.5)]);
        let groups = OriginalAlgorithm.create_slice_groups(&region).unwrap();

        let eval = evaluate(&region, &groups, 100);

        assert!(approx(eval.in_zone_traffic, 1.0));
        assert!(approx(eval.max_deviation, 1.0));
        assert!(approx(eval.mean_deviation, 0.5));
        assert!(approx(eval.deviation_sd, (1.0f64 / 12.0).sqrt()));
    }

    #[test]
    fn unrouted_zone_is_invalid() {
        let region = region(&[("a", 3, 0.5), ("b", 0, 0.5)]);
        let groups = OriginalAlgorithm.create_slice_groups(&region).unwrap();

        // b's group exists but holds no endpoints.
        assert!(evaluate(&region, &groups, 100).invalid);
    }

    #[test]
    fn empty_region_is_invalid() {
        let region = region(&[("a", 0, 1.0)]);
        assert!(evaluate(&region, &SliceGroups::new(), 100).invalid);
        assert!(evaluate(&Region::default(), &SliceGroups::new(), 100).invalid);
    }

    #[test]
    fn idle_endpoints_count_as_full_deviation() {
        let region = region(&[("a", 2, 1.0), ("b", 2, 0.0)]);
        let groups = OriginalAlgorithm.create_slice_groups(&region).unwrap();

        let eval = evaluate(&region, &groups, 100);

        // a's endpoints carry double load, b's carry none.
        assert!(approx(eval.max_deviation, 1.0));
        assert!(approx(eval.mean_deviation, 1.0));
        assert!(approx(eval.deviation_sd, 0.0));
    }

    #[test]
    fn slices_round_up_per_group() {
        let region = region(&[("a", 250, 1.0)]);
        let groups = OriginalAlgorithm.create_slice_groups(&region).unwrap();

        assert_eq!(evaluate(&region, &groups, 100).endpoint_slices, 3);
        assert_eq!(evaluate(&region, &groups, 0).endpoint_slices, 250);
    }
}
