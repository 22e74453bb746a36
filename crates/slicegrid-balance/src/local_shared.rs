//! Local-shared engine: zone-local slice groups balanced by borrowing
//! endpoints from zones with a surplus.
//!
//! A run goes through four steps:
//! 1. **Classify** every zone: seed a local group, queue whole-endpoint
//!    deficits, and collect donor / receiver candidates.
//! 2. **Merge** all zones without endpoints into one shared pseudo-zone whose
//!    demand is served first.
//! 3. **Satisfy deficits**: move single endpoints from the largest donor to
//!    the front of the needed queue. Running out of donors makes the whole
//!    run infeasible.
//! 4. **Spread surplus**: hand any whole endpoint still above a donor's
//!    expectation to the least relatively served zone.
//!
//! An infeasible run is retried on the same input with the fully global
//! strategy; a partially balanced result is never returned.

use std::collections::BTreeMap;

use slicegrid_core::{Region, SliceGroup, SliceGroups};
use tracing::{debug, info, instrument};

use crate::deviation::{DeviationQueue, EndpointDeviation};
use crate::error::{BalanceError, BalanceResult};
use crate::global::SharedGlobalAlgorithm;
use crate::original::OriginalAlgorithm;
use crate::pool::{DonorPool, Expectations, ReceiverPool};
use crate::strategy::SliceAlgorithm;

/// Label prefix of the group shared by zones without endpoints.
pub const MERGED_PREFIX: &str = "merged";

/// Outcome of a single balancing pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Balance {
    Balanced(SliceGroups),
    /// Donors ran out before every deficit was covered.
    Infeasible,
}

/// Zone classification for one region.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// One local group per zone that has endpoints.
    pub groups: SliceGroups,
    pub expected: Expectations,
    /// Zones short by at least one whole endpoint.
    pub needed: DeviationQueue,
    /// Zones with no endpoints at all.
    pub urgent: DeviationQueue,
    /// Zones at or above their expectation.
    pub donors: Vec<String>,
    /// Zones that own a group and can absorb leftovers.
    pub receivers: Vec<String>,
}

/// Sort every zone of `region` into groups, queues and candidate lists.
pub fn classify(region: &Region) -> BalanceResult<Classification> {
    let zones = region.zones.as_ref().ok_or(BalanceError::MissingZones)?;

    let mut classification = Classification {
        groups: SliceGroups::new(),
        expected: BTreeMap::new(),
        needed: DeviationQueue::new(),
        urgent: DeviationQueue::new(),
        donors: Vec::new(),
        receivers: Vec::new(),
    };

    for (name, zone) in zones {
        let expected = region.expected_endpoints(zone);
        // Negative: the zone must borrow. Positive: it can lend.
        let deviation = f64::from(zone.endpoints) - expected;
        classification.expected.insert(name.clone(), expected);

        if zone.endpoints == 0 {
            classification
                .urgent
                .push(EndpointDeviation::new(name.clone(), 1, -deviation));
            continue;
        }

        classification
            .groups
            .insert(name.clone(), SliceGroup::local(name, zone.endpoints));
        classification.receivers.push(name.clone());
        if !deviation.is_sign_negative() {
            classification.donors.push(name.clone());
        }

        // Fractional shortfalls round away; only whole endpoints are queued.
        if deviation <= -1.0 {
            let count = (-deviation).floor() as u32;
            classification
                .needed
                .push(EndpointDeviation::new(name.clone(), count, 1.0));
        }
    }

    Ok(classification)
}

/// Zone-local slice groups with greedy endpoint sharing.
#[derive(Debug, Clone)]
pub struct LocalSharedAlgorithm {
    /// Strategy used when redistribution is infeasible.
    fallback: SharedGlobalAlgorithm,
}

impl Default for LocalSharedAlgorithm {
    fn default() -> Self {
        Self {
            fallback: SharedGlobalAlgorithm::new(1.0, 100),
        }
    }
}

impl LocalSharedAlgorithm {
    pub fn with_fallback(fallback: SharedGlobalAlgorithm) -> Self {
        Self { fallback }
    }

    /// Run one balancing pass without falling back.
    ///
    /// Regions with fewer endpoints than zones are handed to
    /// [`OriginalAlgorithm`] directly.
    #[instrument(skip(self, region), fields(zones = region.zone_count(), endpoints = region.total_endpoints))]
    pub fn balance(&self, region: &Region) -> BalanceResult<Balance> {
        let zone_count = region.zone_count();
        if region.zones.is_none() {
            return Err(BalanceError::MissingZones);
        }
        if (region.total_endpoints as usize) < zone_count {
            debug!("fewer endpoints than zones, using original strategy");
            return OriginalAlgorithm
                .create_slice_groups(region)
                .map(Balance::Balanced);
        }

        let Classification {
            mut groups,
            expected,
            mut needed,
            mut urgent,
            donors,
            receivers,
        } = classify(region)?;

        merge_urgent(&mut urgent, &mut groups, &mut needed);

        debug!(
            needed = needed.len(),
            units = needed.total_units(),
            donors = donors.len(),
            "classified zones"
        );

        let mut donor_pool = DonorPool::new(&expected);
        for zone in &donors {
            donor_pool.push(zone, own_endpoints(&groups, zone));
        }

        if !satisfy_deficits(&mut needed, &mut groups, &mut donor_pool) {
            return Ok(Balance::Infeasible);
        }

        let mut receiver_pool = ReceiverPool::new(&expected);
        for zone in &receivers {
            receiver_pool.push(zone, held_endpoints(&groups, zone));
        }
        spread_surplus(&mut groups, &mut donor_pool, &mut receiver_pool);

        Ok(Balance::Balanced(groups))
    }
}

impl SliceAlgorithm for LocalSharedAlgorithm {
    fn name(&self) -> &'static str {
        "LocalShared"
    }

    fn create_slice_groups(&self, region: &Region) -> BalanceResult<SliceGroups> {
        match self.balance(region)? {
            Balance::Balanced(groups) => Ok(groups),
            Balance::Infeasible => {
                info!("local balancing infeasible, switching to shared global algorithm");
                self.fallback.create_slice_groups(region)
            }
        }
    }
}

/// Fold every urgent zone into one shared group and queue its demand first.
fn merge_urgent(urgent: &mut DeviationQueue, groups: &mut SliceGroups, needed: &mut DeviationQueue) {
    let mut label = MERGED_PREFIX.to_string();
    let mut merged = SliceGroup::default();
    let mut demand = 0.0;

    while let Some(zone) = urgent.pop_front() {
        label.push('-');
        label.push_str(&zone.zone_name);
        demand += zone.weighted();
        merged.zone_traffic_weights.insert(zone.zone_name, 1.0);
    }

    if demand == 0.0 {
        return;
    }

    // Round up so a fractional demand still gets one endpoint.
    let count = demand.ceil() as u32;
    merged.label = label.clone();
    groups.insert(label.clone(), merged);
    needed.push_front(EndpointDeviation::new(label, count, 1.0));
}

/// Phase 1. Returns `false` if donors run out with demand outstanding.
fn satisfy_deficits(
    needed: &mut DeviationQueue,
    groups: &mut SliceGroups,
    donors: &mut DonorPool<'_>,
) -> bool {
    while let Some(receiver) = needed.front_mut() {
        if receiver.deviation_count == 0 {
            needed.pop_front();
            continue;
        }

        let Some(donor) = donors.pop() else {
            debug!(
                receiver = %receiver.zone_name,
                outstanding = receiver.deviation_count,
                "donor pool exhausted"
            );
            return false;
        };

        transfer(groups, &donor, &receiver.zone_name);

        let own = own_endpoints(groups, &donor);
        if f64::from(own) > donors.expected(&donor) {
            donors.push(&donor, own);
        }

        receiver.deviation_count -= 1;
        if receiver.deviation_count == 0 {
            needed.pop_front();
        }
    }
    true
}

/// Phase 2. Moves whole surplus endpoints to the least served zones.
fn spread_surplus(
    groups: &mut SliceGroups,
    donors: &mut DonorPool<'_>,
    receivers: &mut ReceiverPool<'_>,
) {
    while let Some(donor) = donors.pop() {
        let own = own_endpoints(groups, &donor);
        if f64::from(own) - donors.expected(&donor) < 1.0 {
            break;
        }

        let Some(receiver) = next_receiver(groups, receivers, &donor) else {
            break;
        };

        transfer(groups, &donor, &receiver);
        debug!(%donor, %receiver, "spread surplus endpoint");

        receivers.push(&receiver, held_endpoints(groups, &receiver));
        donors.push(&donor, own - 1);
    }
}

/// Pop the best receiver other than `donor`, refreshing stale entries.
fn next_receiver(groups: &SliceGroups, receivers: &mut ReceiverPool<'_>, donor: &str) -> Option<String> {
    let mut skipped = None;
    let found = loop {
        let Some((zone, held)) = receivers.pop() else {
            break None;
        };
        let current = held_endpoints(groups, &zone);
        if current != held {
            receivers.push(&zone, current);
            continue;
        }
        if zone == donor {
            skipped = Some(zone);
            continue;
        }
        break Some(zone);
    };

    if let Some(zone) = skipped {
        receivers.push(&zone, held_endpoints(groups, &zone));
    }
    found
}

/// Move one of `donor`'s own endpoints into `receiver`'s group.
fn transfer(groups: &mut SliceGroups, donor: &str, receiver: &str) {
    let removed = groups
        .get_mut(donor)
        .is_some_and(|group| group.remove_endpoint(donor));
    debug_assert!(removed, "donor {donor} had no endpoint to give");
    if !removed {
        return;
    }
    if let Some(group) = groups.get_mut(receiver) {
        group.add_endpoints(donor, 1, 1.0);
    }
}

/// Endpoints `zone` still holds in its own group.
fn own_endpoints(groups: &SliceGroups, zone: &str) -> u32 {
    groups.get(zone).map_or(0, |g| g.endpoints_from(zone))
}

/// Endpoints in `zone`'s group from any zone.
fn held_endpoints(groups: &SliceGroups, zone: &str) -> u32 {
    groups.get(zone).map_or(0, SliceGroup::size)
}
