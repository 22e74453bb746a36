//! Strategy capability and name-based selection.

use slicegrid_core::{Region, SliceGroups, StrategyConfig};
use tracing::{info, warn};

use crate::error::BalanceResult;
use crate::global::SharedGlobalAlgorithm;
use crate::local_shared::LocalSharedAlgorithm;
use crate::original::OriginalAlgorithm;

/// Anything that can turn a region into slice groups.
///
/// Implementations either return a complete partition or a
/// precondition error; recoverable failures are handled internally.
pub trait SliceAlgorithm: Send + Sync + std::fmt::Debug {
    /// Canonical strategy name, as accepted by [`algorithm_by_name`].
    fn name(&self) -> &'static str;

    fn create_slice_groups(&self, region: &Region) -> BalanceResult<SliceGroups>;
}

/// Look up a strategy by name. Both `X` and `XAlgorithm` are accepted.
///
/// Unknown names log a warning and return [`LocalSharedAlgorithm`].
pub fn algorithm_by_name(name: &str) -> Box<dyn SliceAlgorithm> {
    match name {
        "SharedGlobal" | "SharedGlobalAlgorithm" => {
            info!("SharedGlobalAlgorithm created");
            Box::new(SharedGlobalAlgorithm::new(0.4, 100))
        }
        "SharedMultiZone" | "SharedMultiZoneAlgorithm" => {
            info!("SharedMultiZoneAlgorithm created");
            Box::new(SharedGlobalAlgorithm::new(1.0, 100))
        }
        "LocalShared" | "LocalSharedAlgorithm" => {
            info!("LocalSharedAlgorithm created");
            Box::new(LocalSharedAlgorithm::default())
        }
        "Original" | "OriginalAlgorithm" => {
            info!("OriginalAlgorithm created");
            Box::new(OriginalAlgorithm)
        }
        unknown => {
            warn!(
                algorithm = unknown,
                "unknown algorithm, using LocalSharedAlgorithm"
            );
            Box::new(LocalSharedAlgorithm::default())
        }
    }
}

/// Build the configured strategy, applying global weight/threshold
/// overrides when it is a global variant.
pub fn algorithm_from_config(config: &StrategyConfig) -> Box<dyn SliceAlgorithm> {
    let base = algorithm_by_name(&config.algorithm);
    if base.name() != "SharedGlobal" {
        return base;
    }

    let defaults = if config.algorithm.starts_with("SharedMultiZone") {
        SharedGlobalAlgorithm::new(1.0, 100)
    } else {
        SharedGlobalAlgorithm::default()
    };
    Box::new(SharedGlobalAlgorithm::new(
        config.global_weight.unwrap_or(defaults.global_weight),
        config.global_threshold.unwrap_or(defaults.global_threshold),
    ))
}
