//! Ranking and aggregation queries over the launch catalog.
//!
//! Every query loads a fresh snapshot of launches from the repository, then
//! filters, groups or sorts, and truncates to the requested `k`. Nothing is
//! cached between calls and no entity is ever modified.
//!
//! Queries bounded by `k` fail with [`MiningError::NotEnoughResults`] when `k`
//! is negative or larger than the number of distinct results available after
//! filtering and grouping.

mod error;
mod rank;

pub use error::MiningError;
pub use rank::{top_k, Reliability, Tally};

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::models::*;
use crate::repository::{load_launches, Repository};

/// Returned by [`RocketMiner::dominant_country`] when nothing reached the orbit.
pub const NO_ROCKET_IN_ORBIT: &str = "No Rocket in this Orbit";

const ROCKETS: &str = "rockets";
const PROVIDERS: &str = "launch service providers";
const LAUNCHES: &str = "launches";

/// Stateless query engine over a [`Repository`].
pub struct RocketMiner<R> {
    repository: R,
}

impl<R: Repository> RocketMiner<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Top-k rockets by number of successful launches.
    pub fn most_launched_rockets(&self, k: i64) -> Result<Vec<Arc<Rocket>>, MiningError> {
        tracing::info!("Find most active {} rockets", k);
        let launches = self.launches()?;

        let counts = Tally::collect(
            launches.iter().filter(|launch| launch.is_successful()),
            |launch| Arc::clone(launch.launch_vehicle()),
            || 0u64,
            |count, _| *count += 1,
        );
        tracing::debug!(rockets = counts.len(), "grouped successful launches");

        let k = within(k, counts.len(), ROCKETS)?;
        Ok(counts.top_k(k))
    }

    /// Top-k providers by share of successful launches.
    pub fn most_reliable_launch_service_providers(
        &self,
        k: i64,
    ) -> Result<Vec<Arc<LaunchServiceProvider>>, MiningError> {
        tracing::info!("Find most reliable {} launch service providers", k);
        self.rank_reliability(k, LaunchOutcome::Successful)
    }

    /// Top-k providers by share of failed launches.
    pub fn least_reliable_launch_service_providers(
        &self,
        k: i64,
    ) -> Result<Vec<Arc<LaunchServiceProvider>>, MiningError> {
        tracing::info!("Find least reliable {} launch service providers", k);
        self.rank_reliability(k, LaunchOutcome::Failed)
    }

    /// Per-provider share of launches that ended with `outcome`, in the
    /// order providers were first seen.
    pub fn reliability(
        &self,
        outcome: LaunchOutcome,
    ) -> Result<Vec<(Arc<LaunchServiceProvider>, Reliability)>, MiningError> {
        let launches = self.launches()?;
        Ok(reliability_by_provider(&launches, outcome).into_entries())
    }

    pub fn most_recent_launches(&self, k: i64) -> Result<Vec<Arc<Launch>>, MiningError> {
        tracing::info!("Find most recent {} launches", k);
        let mut launches = self.launches()?;
        launches.sort_by(|a, b| b.launch_date().cmp(&a.launch_date()));
        truncate(launches, k)
    }

    pub fn most_recent_failed_launches(&self, k: i64) -> Result<Vec<Arc<Launch>>, MiningError> {
        tracing::info!("Find {} most recent failed launches", k);
        let mut launches = self.launches()?;
        launches.retain(|launch| launch.is_failed());
        launches.sort_by(|a, b| b.launch_date().cmp(&a.launch_date()));
        truncate(launches, k)
    }

    pub fn most_expensive_launches(&self, k: i64) -> Result<Vec<Arc<Launch>>, MiningError> {
        tracing::info!("Find most expensive {} launches", k);
        let mut launches = self.launches()?;
        launches.sort_by(|a, b| b.price().cmp(&a.price()));
        truncate(launches, k)
    }

    /// Cheapest successful launches, cheapest first.
    pub fn most_affordable_launches(&self, k: i64) -> Result<Vec<Arc<Launch>>, MiningError> {
        tracing::info!("Find {} most affordable successful launches", k);
        let mut launches = self.launches()?;
        launches.retain(|launch| launch.is_successful());
        launches.sort_by(|a, b| a.price().cmp(&b.price()));
        truncate(launches, k)
    }

    pub fn most_expensive_failed_launches(&self, k: i64) -> Result<Vec<Arc<Launch>>, MiningError> {
        tracing::info!("Find {} most expensive failed launches", k);
        let mut launches = self.launches()?;
        launches.retain(|launch| launch.is_failed());
        launches.sort_by(|a, b| b.price().cmp(&a.price()));
        truncate(launches, k)
    }

    /// Top-k providers by summed launch price within `year`.
    ///
    /// Fails with [`MiningError::RevenueOverflow`] when a provider's sum
    /// leaves the range of [`Decimal`].
    pub fn highest_revenue_launch_service_providers(
        &self,
        k: i64,
        year: i32,
    ) -> Result<Vec<Arc<LaunchServiceProvider>>, MiningError> {
        tracing::info!("Find {} highest revenue launch service providers in {}", k, year);
        let launches = self.launches()?;

        let mut revenue: Tally<Arc<LaunchServiceProvider>, Decimal> = Tally::new();
        for launch in launches.iter().filter(|launch| launch.year() == year) {
            let provider = launch.launch_service_provider();
            let sum = revenue.entry(Arc::clone(provider), || Decimal::ZERO);
            *sum = sum
                .checked_add(launch.price())
                .ok_or_else(|| MiningError::RevenueOverflow {
                    provider: provider.name().to_string(),
                    year,
                })?;
        }
        tracing::debug!(providers = revenue.len(), year, "summed revenue");

        let k = within(k, revenue.len(), PROVIDERS)?;
        Ok(revenue.top_k(k))
    }

    /// The country whose providers flew the most successful launches to `orbit`.
    ///
    /// Returns [`NO_ROCKET_IN_ORBIT`] when no successful launch matches.
    pub fn dominant_country(&self, orbit: &str) -> Result<String, MiningError> {
        tracing::info!("Find most dominant country in orbit {}", orbit);
        if orbit.trim().is_empty() {
            return Err(MiningError::BlankArgument);
        }

        let launches = self.launches()?;
        let per_provider = Tally::collect(
            launches
                .iter()
                .filter(|launch| launch.is_successful() && launch.orbit() == orbit),
            |launch| Arc::clone(launch.launch_service_provider()),
            || 0u64,
            |count, _| *count += 1,
        );

        let mut per_country: Tally<String, u64> = Tally::new();
        for (provider, count) in per_provider.into_entries() {
            *per_country.entry(provider.country().to_string(), || 0) += count;
        }
        tracing::debug!(countries = per_country.len(), orbit, "grouped launches by country");

        Ok(per_country
            .top_k(1)
            .into_iter()
            .next()
            .unwrap_or_else(|| NO_ROCKET_IN_ORBIT.to_string()))
    }

    fn rank_reliability(
        &self,
        k: i64,
        outcome: LaunchOutcome,
    ) -> Result<Vec<Arc<LaunchServiceProvider>>, MiningError> {
        let launches = self.launches()?;
        let rates = reliability_by_provider(&launches, outcome);
        tracing::debug!(providers = rates.len(), outcome = outcome.as_str(), "computed reliability");

        let k = within(k, rates.len(), PROVIDERS)?;
        Ok(rates.top_k(k))
    }

    fn launches(&self) -> Result<Vec<Arc<Launch>>, MiningError> {
        Ok(load_launches(&self.repository)?)
    }
}

fn reliability_by_provider(
    launches: &[Arc<Launch>],
    outcome: LaunchOutcome,
) -> Tally<Arc<LaunchServiceProvider>, Reliability> {
    Tally::collect(
        launches,
        |launch| Arc::clone(launch.launch_service_provider()),
        Reliability::default,
        |rate, launch| rate.record(launch.launch_outcome() == outcome),
    )
}

/// Checks `0 <= k <= available` and converts `k` to a count.
fn within(k: i64, available: usize, subject: &'static str) -> Result<usize, MiningError> {
    match usize::try_from(k) {
        Ok(n) if n <= available => Ok(n),
        _ => Err(MiningError::NotEnoughResults {
            subject,
            requested: k,
            available,
        }),
    }
}

fn truncate(mut launches: Vec<Arc<Launch>>, k: i64) -> Result<Vec<Arc<Launch>>, MiningError> {
    let k = within(k, launches.len(), LAUNCHES)?;
    launches.truncate(k);
    Ok(launches)
}
