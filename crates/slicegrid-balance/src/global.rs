//! Shared global strategy: pool endpoints region-wide.
//!
//! Every zone contributes `ceil(endpoints * w)` endpoints to a single
//! [`GLOBAL_LABEL`] group and keeps the rest in a local group. A zone with a
//! local group sends `1 - w` of its traffic there and `w` to the global
//! group; a zone with nothing left locally sends everything global.
//!
//! Below `global_threshold` total endpoints the region is too small for
//! locality to matter and `w` is forced to 1.

use slicegrid_core::{Region, SliceGroup, SliceGroups};
use tracing::debug;

use crate::error::{BalanceError, BalanceResult};
use crate::strategy::SliceAlgorithm;

/// Label of the region-wide shared group.
pub const GLOBAL_LABEL: &str = "global";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SharedGlobalAlgorithm {
    /// Fraction (0.0..=1.0) of each zone's endpoints and traffic sent to the
    /// global group.
    pub global_weight: f64,
    /// Regions with fewer endpoints than this go fully global.
    pub global_threshold: u32,
}

impl Default for SharedGlobalAlgorithm {
    fn default() -> Self {
        Self::new(0.4, 100)
    }
}

impl SharedGlobalAlgorithm {
    pub fn new(global_weight: f64, global_threshold: u32) -> Self {
        Self {
            global_weight: global_weight.clamp(0.0, 1.0),
            global_threshold,
        }
    }

    /// Weight actually applied to `region`.
    pub fn effective_weight(&self, region: &Region) -> f64 {
        if region.total_endpoints < self.global_threshold {
            1.0
        } else {
            self.global_weight
        }
    }
}

impl SliceAlgorithm for SharedGlobalAlgorithm {
    fn name(&self) -> &'static str {
        "SharedGlobal"
    }

    fn create_slice_groups(&self, region: &Region) -> BalanceResult<SliceGroups> {
        let zones = region.zones.as_ref().ok_or(BalanceError::MissingZones)?;
        let weight = self.effective_weight(region);

        let mut groups = SliceGroups::new();
        let mut global = SliceGroup::new(GLOBAL_LABEL);

        for (name, zone) in zones {
            let shared = ((f64::from(zone.endpoints) * weight).ceil() as u32).min(zone.endpoints);
            let local = zone.endpoints - shared;

            if shared > 0 {
                global.add_endpoints(name, shared, 1.0);
            }

            if local > 0 {
                let mut group = SliceGroup::local(name, local);
                group.zone_traffic_weights.insert(name.clone(), 1.0 - weight);
                groups.insert(name.clone(), group);
                if weight > 0.0 {
                    global.zone_traffic_weights.insert(name.clone(), weight);
                }
            } else {
                global.zone_traffic_weights.insert(name.clone(), 1.0);
            }
        }

        debug!(
            weight,
            global_endpoints = global.size(),
            local_groups = groups.len(),
            "built shared global slice groups"
        );

        if !global.zone_traffic_weights.is_empty() {
            groups.insert(GLOBAL_LABEL.to_string(), global);
        }
        Ok(groups)
    }
}
