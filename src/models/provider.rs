use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;
use uuid::Uuid;

use super::entity::{Entity, EntityKind};
use super::validate::{below, not_blank, ValidationError};

const BLANK_PARAM: &str = "Constructor param cannot be null or empty";
const LONG_PARAM: &str = "Constructor param cannot exceed 128 characters";
const YEAR_RANGE: &str = "Constructor parameter year cannot be negative or larger than 2999";

/// An organisation that manufactures rockets and/or conducts launches.
///
/// Providers are identified by the composite natural key
/// `(name, year_founded, country)`. Grouping launches "by provider" relies on
/// this: two instances with the same key merge into one group regardless of
/// headquarters or the rockets they list.
#[derive(Debug, Clone, Serialize)]
pub struct LaunchServiceProvider {
    id: Uuid,
    name: String,
    year_founded: i32,
    country: String,
    headquarters: Option<String>,
    /// Ids of the rockets this provider manufactures.
    #[serde(skip)]
    rockets: BTreeSet<Uuid>,
}

impl LaunchServiceProvider {
    pub fn new(
        name: impl Into<String>,
        year_founded: i32,
        country: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        let country = country.into();

        not_blank(&name, BLANK_PARAM)?;
        below(&name, 128, LONG_PARAM)?;

        if year_founded <= 0 || year_founded >= 3000 {
            return Err(ValidationError::OutOfRange(YEAR_RANGE));
        }

        not_blank(&country, BLANK_PARAM)?;
        below(&country, 128, LONG_PARAM)?;

        Ok(Self {
            id: Uuid::new_v4(),
            name,
            year_founded,
            country,
            headquarters: None,
            rockets: BTreeSet::new(),
        })
    }

    /// Restore a stored identity.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn year_founded(&self) -> i32 {
        self.year_founded
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn headquarters(&self) -> Option<&str> {
        self.headquarters.as_deref()
    }

    pub fn rockets(&self) -> &BTreeSet<Uuid> {
        &self.rockets
    }

    pub fn set_headquarters(&mut self, headquarters: impl Into<String>) -> Result<(), ValidationError> {
        let headquarters = headquarters.into();
        not_blank(&headquarters, "Headquarters cannot be null or empty")?;
        below(&headquarters, 128, "Headquarters cannot exceed 128 characters")?;
        self.headquarters = Some(headquarters);
        Ok(())
    }

    pub fn set_rockets(&mut self, rockets: BTreeSet<Uuid>) {
        self.rockets = rockets;
    }

    pub fn add_rocket(&mut self, rocket_id: Uuid) {
        self.rockets.insert(rocket_id);
    }
}

impl Entity for LaunchServiceProvider {
    const KIND: EntityKind = EntityKind::LaunchServiceProvider;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl PartialEq for LaunchServiceProvider {
    fn eq(&self, other: &Self) -> bool {
        self.year_founded == other.year_founded
            && self.name == other.name
            && self.country == other.country
    }
}

impl Eq for LaunchServiceProvider {}

impl Hash for LaunchServiceProvider {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.year_founded.hash(state);
        self.country.hash(state);
    }
}

impl fmt::Display for LaunchServiceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, founded {})", self.name, self.country, self.year_founded)?;
        if let Some(hq) = &self.headquarters {
            write!(f, ", headquartered in {}", hq)?;
        }
        Ok(())
    }
}
