//! slicegrid balancing — partition endpoints into zone-aware slice groups.
//!
//! Every strategy implements [`SliceAlgorithm`]: given a [`Region`], produce
//! a label-keyed map of slice groups. The interesting one is the
//! local-shared engine; the others are simple fallbacks it leans on.
//!
//! # Components
//!
//! - **`deviation`** — work-lists of zones still needing endpoints
//! - **`pool`** — donor / receiver priority pools over zone names
//! - **`local_shared`** — classification + two-phase greedy redistribution
//! - **`original`** — one group per zone, no sharing
//! - **`global`** — region-wide pooled group with a local/global traffic split
//! - **`strategy`** — the [`SliceAlgorithm`] trait and name lookup
//!
//! [`Region`]: slicegrid_core::Region

pub mod deviation;
pub mod error;
pub mod global;
pub mod local_shared;
pub mod original;
pub mod pool;
pub mod strategy;

pub use deviation::{DeviationQueue, EndpointDeviation};
pub use error::{BalanceError, BalanceResult};
pub use global::SharedGlobalAlgorithm;
pub use local_shared::{Balance, Classification, LocalSharedAlgorithm, classify};
pub use original::OriginalAlgorithm;
pub use pool::{DonorPool, Expectations, ReceiverPool};
pub use strategy::{SliceAlgorithm, algorithm_by_name, algorithm_from_config};
