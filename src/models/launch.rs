use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity::{Entity, EntityKind};
use super::payload::Payload;
use super::provider::LaunchServiceProvider;
use super::rocket::Rocket;
use super::validate::{not_blank, ValidationError};

/// How a launch ended. Outcomes are strictly binary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LaunchOutcome {
    Successful,
    Failed,
}

impl LaunchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Successful => "successful",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "successful" => Some(Self::Successful),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// A single rocket flight.
///
/// The provider defaults to the vehicle's manufacturer. Equality and hashing
/// use `(launch_date, launch_vehicle, launch_service_provider, orbit)`.
#[derive(Debug, Clone, Serialize)]
pub struct Launch {
    id: Uuid,
    launch_date: NaiveDate,
    launch_vehicle: Arc<Rocket>,
    launch_service_provider: Arc<LaunchServiceProvider>,
    payloads: Vec<Payload>,
    launch_site: String,
    orbit: String,
    launch_outcome: LaunchOutcome,
    price: Decimal,
}

impl Launch {
    pub fn new(
        launch_date: NaiveDate,
        launch_vehicle: Arc<Rocket>,
        launch_site: impl Into<String>,
        orbit: impl Into<String>,
        launch_outcome: LaunchOutcome,
        price: Decimal,
    ) -> Result<Self, ValidationError> {
        let launch_site = launch_site.into();
        let orbit = orbit.into();

        not_blank(&launch_site, "launchSite cannot be null or empty")?;
        not_blank(&orbit, "orbit cannot be null or empty")?;
        non_negative(price)?;

        Ok(Self {
            id: Uuid::new_v4(),
            launch_date,
            launch_service_provider: Arc::clone(launch_vehicle.manufacturer()),
            launch_vehicle,
            payloads: Vec::new(),
            launch_site,
            orbit,
            launch_outcome,
            price,
        })
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn launch_date(&self) -> NaiveDate {
        self.launch_date
    }

    pub fn year(&self) -> i32 {
        self.launch_date.year()
    }

    pub fn launch_vehicle(&self) -> &Arc<Rocket> {
        &self.launch_vehicle
    }

    pub fn launch_service_provider(&self) -> &Arc<LaunchServiceProvider> {
        &self.launch_service_provider
    }

    pub fn payloads(&self) -> &[Payload] {
        &self.payloads
    }

    pub fn launch_site(&self) -> &str {
        &self.launch_site
    }

    pub fn orbit(&self) -> &str {
        &self.orbit
    }

    pub fn launch_outcome(&self) -> LaunchOutcome {
        self.launch_outcome
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn is_successful(&self) -> bool {
        self.launch_outcome == LaunchOutcome::Successful
    }

    pub fn is_failed(&self) -> bool {
        self.launch_outcome == LaunchOutcome::Failed
    }

    pub fn set_launch_service_provider(&mut self, provider: Arc<LaunchServiceProvider>) {
        self.launch_service_provider = provider;
    }

    pub fn set_launch_site(&mut self, launch_site: impl Into<String>) -> Result<(), ValidationError> {
        let launch_site = launch_site.into();
        not_blank(&launch_site, "launchSite cannot be null or empty")?;
        self.launch_site = launch_site;
        Ok(())
    }

    pub fn set_orbit(&mut self, orbit: impl Into<String>) -> Result<(), ValidationError> {
        let orbit = orbit.into();
        not_blank(&orbit, "orbit cannot be null or empty")?;
        self.orbit = orbit;
        Ok(())
    }

    pub fn set_launch_outcome(&mut self, outcome: LaunchOutcome) {
        self.launch_outcome = outcome;
    }

    pub fn set_price(&mut self, price: Decimal) -> Result<(), ValidationError> {
        non_negative(price)?;
        self.price = price;
        Ok(())
    }

    /// Adds a payload unless an equal one is already aboard.
    pub fn add_payload(&mut self, payload: Payload) {
        if !self.payloads.contains(&payload) {
            self.payloads.push(payload);
        }
    }

    pub fn set_payloads(&mut self, payloads: Vec<Payload>) {
        self.payloads.clear();
        for payload in payloads {
            self.add_payload(payload);
        }
    }
}

fn non_negative(price: Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ValidationError::Negative("price cannot be a negative value"));
    }
    Ok(())
}

impl Entity for Launch {
    const KIND: EntityKind = EntityKind::Launch;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl PartialEq for Launch {
    fn eq(&self, other: &Self) -> bool {
        self.launch_date == other.launch_date
            && self.launch_vehicle == other.launch_vehicle
            && self.launch_service_provider == other.launch_service_provider
            && self.orbit == other.orbit
    }
}

impl Eq for Launch {}

impl Hash for Launch {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.launch_date.hash(state);
        self.launch_vehicle.hash(state);
        self.launch_service_provider.hash(state);
        self.orbit.hash(state);
    }
}

impl fmt::Display for Launch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} from {} to {} ({}, {})",
            self.launch_date,
            self.launch_vehicle.name(),
            self.launch_site,
            self.orbit,
            self.launch_outcome.as_str(),
            self.price
        )
    }
}
