//! JSON catalog input and the in-memory repository built from it.
//!
//! A catalog names its cross references instead of nesting them: rockets name
//! their manufacturer, launches name their rocket (and optionally a provider
//! other than the manufacturer). [`Catalog::build`] validates every record,
//! resolves the names and fills in the back-reference id sets.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::*;
use crate::repository::{Record, Repository, RepositoryError};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{kind} '{name}': {source}")]
    Invalid {
        kind: EntityKind,
        name: String,
        #[source]
        source: ValidationError,
    },

    #[error("duplicate {kind} '{name}'")]
    Duplicate { kind: EntityKind, name: String },

    #[error("{kind} '{name}' references unknown {missing} '{reference}'")]
    UnknownReference {
        kind: EntityKind,
        name: String,
        missing: EntityKind,
        reference: String,
    },
}

/// Input for a launch service provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInput {
    pub name: String,
    pub year_founded: i32,
    pub country: String,
    pub headquarters: Option<String>,
}

/// Input for a rocket. `manufacturer` is a provider name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RocketInput {
    pub name: String,
    pub country: String,
    pub manufacturer: String,
    pub mass_to_leo: Option<String>,
    pub mass_to_gto: Option<String>,
    pub mass_to_other: Option<String>,
}

/// Input for a launch. `rocket` is a rocket name; `provider` defaults to the
/// rocket's manufacturer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchInput {
    pub launch_date: NaiveDate,
    pub rocket: String,
    pub provider: Option<String>,
    pub launch_site: String,
    pub orbit: String,
    pub outcome: LaunchOutcome,
    pub price: Decimal,
    #[serde(default)]
    pub payloads: Vec<PayloadInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadInput {
    pub name: String,
    #[serde(rename = "type")]
    pub payload_type: String,
    pub mass: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// A whole catalog document.
///
/// Provider and rocket names are the references other records use, so each
/// must be unique within the document. This is stricter than entity
/// equality: two providers named alike but founded in different years are
/// distinct entities, yet a catalog cannot hold both. User emails must be
/// unique as well.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub providers: Vec<ProviderInput>,
    #[serde(default)]
    pub rockets: Vec<RocketInput>,
    #[serde(default)]
    pub launches: Vec<LaunchInput>,
    #[serde(default)]
    pub users: Vec<UserInput>,
}

impl Catalog {
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        let catalog = Self::from_json_str(&content)
            .with_context(|| format!("Failed to parse catalog {}", path.display()))?;
        Ok(catalog)
    }

    /// Validate and link every record into a [`Snapshot`].
    pub fn build(&self) -> Result<Snapshot, CatalogError> {
        let mut providers = Vec::with_capacity(self.providers.len());
        let mut provider_index = HashMap::new();
        for input in &self.providers {
            let kind = EntityKind::LaunchServiceProvider;
            let reject = |source| invalid(kind, &input.name, source);

            let mut provider = LaunchServiceProvider::new(&input.name, input.year_founded, &input.country)
                .map_err(reject)?;
            if let Some(hq) = &input.headquarters {
                provider.set_headquarters(hq).map_err(reject)?;
            }
            unique(&mut provider_index, kind, &input.name, providers.len())?;
            providers.push(provider);
        }

        // Rocket ids are fixed before the providers are frozen so each
        // provider can list the rockets it builds.
        let mut rocket_plan = Vec::with_capacity(self.rockets.len());
        let mut rocket_index = HashMap::new();
        for input in &self.rockets {
            let maker = *provider_index.get(&input.manufacturer).ok_or_else(|| {
                CatalogError::UnknownReference {
                    kind: EntityKind::Rocket,
                    name: input.name.clone(),
                    missing: EntityKind::LaunchServiceProvider,
                    reference: input.manufacturer.clone(),
                }
            })?;
            unique(&mut rocket_index, EntityKind::Rocket, &input.name, rocket_plan.len())?;
            let id = Uuid::new_v4();
            providers[maker].add_rocket(id);
            rocket_plan.push((id, maker));
        }
        let providers: Vec<Arc<LaunchServiceProvider>> = providers.into_iter().map(Arc::new).collect();

        let mut rockets = Vec::with_capacity(self.rockets.len());
        for (input, &(id, maker)) in self.rockets.iter().zip(&rocket_plan) {
            let reject = |source| invalid(EntityKind::Rocket, &input.name, source);

            let mut rocket = Rocket::new(&input.name, &input.country, Arc::clone(&providers[maker]))
                .map_err(reject)?
                .with_id(id);
            if let Some(mass) = &input.mass_to_leo {
                rocket.set_mass_to_leo(mass).map_err(reject)?;
            }
            if let Some(mass) = &input.mass_to_gto {
                rocket.set_mass_to_gto(mass).map_err(reject)?;
            }
            if let Some(mass) = &input.mass_to_other {
                rocket.set_mass_to_other(mass).map_err(reject)?;
            }
            rockets.push(rocket);
        }

        let mut launch_plan = Vec::with_capacity(self.launches.len());
        for input in &self.launches {
            let vehicle = *rocket_index.get(&input.rocket).ok_or_else(|| {
                CatalogError::UnknownReference {
                    kind: EntityKind::Launch,
                    name: launch_label(input),
                    missing: EntityKind::Rocket,
                    reference: input.rocket.clone(),
                }
            })?;
            let provider = match &input.provider {
                Some(name) => Some(*provider_index.get(name).ok_or_else(|| {
                    CatalogError::UnknownReference {
                        kind: EntityKind::Launch,
                        name: launch_label(input),
                        missing: EntityKind::LaunchServiceProvider,
                        reference: name.clone(),
                    }
                })?),
                None => None,
            };
            let id = Uuid::new_v4();
            rockets[vehicle].add_launch(id);
            launch_plan.push((id, vehicle, provider));
        }
        let rockets: Vec<Arc<Rocket>> = rockets.into_iter().map(Arc::new).collect();

        let mut launches = Vec::with_capacity(self.launches.len());
        for (input, &(id, vehicle, provider)) in self.launches.iter().zip(&launch_plan) {
            let label = launch_label(input);
            let reject = |source| invalid(EntityKind::Launch, &label, source);

            let mut launch = Launch::new(
                input.launch_date,
                Arc::clone(&rockets[vehicle]),
                &input.launch_site,
                &input.orbit,
                input.outcome,
                input.price,
            )
            .map_err(reject)?
            .with_id(id);
            if let Some(provider) = provider {
                launch.set_launch_service_provider(Arc::clone(&providers[provider]));
            }
            for payload in &input.payloads {
                launch.add_payload(build_payload(payload)?);
            }
            launches.push(Arc::new(launch));
        }

        let mut users = Vec::with_capacity(self.users.len());
        let mut emails = HashMap::new();
        for input in &self.users {
            let user = User::new(&input.first_name, &input.last_name, &input.email, &input.password)
                .map_err(|source| invalid(EntityKind::User, &input.email, source))?;
            unique(&mut emails, EntityKind::User, &input.email, users.len())?;
            users.push(Arc::new(user));
        }

        Ok(Snapshot {
            providers,
            rockets,
            launches,
            users,
        })
    }
}

fn build_payload(input: &PayloadInput) -> Result<Payload, CatalogError> {
    let reject = |source| invalid(EntityKind::Payload, &input.name, source);
    let mut payload = Payload::new(&input.name, &input.payload_type).map_err(reject)?;
    if let Some(mass) = &input.mass {
        payload.set_mass(mass).map_err(reject)?;
    }
    Ok(payload)
}

fn invalid(kind: EntityKind, name: &str, source: ValidationError) -> CatalogError {
    CatalogError::Invalid {
        kind,
        name: name.to_string(),
        source,
    }
}

fn unique(
    index: &mut HashMap<String, usize>,
    kind: EntityKind,
    name: &str,
    slot: usize,
) -> Result<(), CatalogError> {
    if index.insert(name.to_string(), slot).is_some() {
        return Err(CatalogError::Duplicate {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}

fn launch_label(input: &LaunchInput) -> String {
    format!("{} on {}", input.rocket, input.launch_date)
}

/// A fully linked, in-memory set of entities.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub providers: Vec<Arc<LaunchServiceProvider>>,
    pub rockets: Vec<Arc<Rocket>>,
    pub launches: Vec<Arc<Launch>>,
    pub users: Vec<Arc<User>>,
}

impl Snapshot {
    /// A snapshot holding only launches, as the mining engine needs.
    pub fn from_launches(launches: Vec<Arc<Launch>>) -> Self {
        Self {
            launches,
            ..Self::default()
        }
    }
}

impl Repository for Snapshot {
    fn load_all(&self, kind: EntityKind) -> Result<Vec<Record>, RepositoryError> {
        let records = match kind {
            EntityKind::LaunchServiceProvider => self
                .providers
                .iter()
                .cloned()
                .map(Record::LaunchServiceProvider)
                .collect(),
            EntityKind::Rocket => self.rockets.iter().cloned().map(Record::Rocket).collect(),
            EntityKind::Launch => self.launches.iter().cloned().map(Record::Launch).collect(),
            EntityKind::Payload => self
                .launches
                .iter()
                .flat_map(|launch| launch.payloads().iter().cloned())
                .map(|payload| Record::Payload(Arc::new(payload)))
                .collect(),
            EntityKind::User => self.users.iter().cloned().map(Record::User).collect(),
        };
        Ok(records)
    }
}
