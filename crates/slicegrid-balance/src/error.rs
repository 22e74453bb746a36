//! Balancing error types.

use thiserror::Error;

/// Precondition violations that abort a balancing call.
///
/// An infeasible redistribution is not an error; see
/// [`Balance::Infeasible`](crate::Balance::Infeasible).
#[derive(Debug, Error, PartialEq)]
pub enum BalanceError {
    #[error("region has no zone details")]
    MissingZones,
}

pub type BalanceResult<T> = Result<T, BalanceError>;
