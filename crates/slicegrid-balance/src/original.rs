//! One slice group per zone, no cross-zone sharing.

use slicegrid_core::{Region, SliceGroup, SliceGroups};

use crate::error::{BalanceError, BalanceResult};
use crate::strategy::SliceAlgorithm;

/// Every zone gets a group holding exactly its own endpoints and routing
/// exactly its own traffic.
///
/// Zones without endpoints still get a (empty) group so their traffic has
/// somewhere to go.
#[derive(Debug, Clone, Copy, Default)]
pub struct OriginalAlgorithm;

impl SliceAlgorithm for OriginalAlgorithm {
    fn name(&self) -> &'static str {
        "Original"
    }

    fn create_slice_groups(&self, region: &Region) -> BalanceResult<SliceGroups> {
        let zones = region.zones.as_ref().ok_or(BalanceError::MissingZones)?;
        Ok(zones
            .iter()
            .map(|(name, zone)| (name.clone(), SliceGroup::local(name, zone.endpoints)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slicegrid_core::ZoneInfo;
    use std::collections::BTreeMap;

    #[test]
    fn one_group_per_zone() {
        let region = Region::new(BTreeMap::from([
            ("a".to_string(), ZoneInfo { endpoints: 3, nodes_ratio: 0.5 }),
            ("b".to_string(), ZoneInfo { endpoints: 0, nodes_ratio: 0.5 }),
        ]))
        .unwrap();

        let groups = OriginalAlgorithm.create_slice_groups(&region).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups["a"].size(), 3);
        assert_eq!(groups["a"].endpoints_from("a"), 3);
        assert_eq!(groups["b"].size(), 0);
        assert!(groups["b"].receives_traffic_from("b"));
    }

    #[test]
    fn rejects_missing_zones() {
        let err = OriginalAlgorithm
            .create_slice_groups(&Region::default())
            .unwrap_err();
        assert_eq!(err, BalanceError::MissingZones);
    }
}
