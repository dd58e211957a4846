use thiserror::Error;

use crate::repository::RepositoryError;

/// Failures reported by [`super::RocketMiner`] queries.
///
/// Bounds and blank-argument failures are raised before any result is
/// produced. Storage failures pass through untouched.
#[derive(Debug, Error)]
pub enum MiningError {
    #[error("Less {subject} retrieved than requested")]
    NotEnoughResults {
        subject: &'static str,
        requested: i64,
        available: usize,
    },

    #[error("Cannot be Blank")]
    BlankArgument,

    #[error("Revenue of {provider} in {year} exceeds the supported range")]
    RevenueOverflow { provider: String, year: i32 },

    #[error(transparent)]
    DataAccess(#[from] RepositoryError),
}

impl MiningError {
    /// True for caller mistakes (bad `k`, blank orbit) as opposed to storage failures.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::NotEnoughResults { .. } | Self::BlankArgument)
    }
}
