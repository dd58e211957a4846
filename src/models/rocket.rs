use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use super::entity::{Entity, EntityKind};
use super::provider::LaunchServiceProvider;
use super::validate::{below, mass, not_blank, ValidationError};

const BLANK_PARAMS: &str = "Rocket constructor parameters cannot be null or empty";

/// A launch vehicle.
///
/// A rocket always has a manufacturer. The launches it flew are kept as a set
/// of launch ids (a back reference, not ownership).
#[derive(Debug, Clone, Serialize)]
pub struct Rocket {
    id: Uuid,
    name: String,
    country: String,
    manufacturer: Arc<LaunchServiceProvider>,
    mass_to_leo: Option<String>,
    mass_to_gto: Option<String>,
    mass_to_other: Option<String>,
    #[serde(skip)]
    launches: BTreeSet<Uuid>,
}

impl Rocket {
    pub fn new(
        name: impl Into<String>,
        country: impl Into<String>,
        manufacturer: Arc<LaunchServiceProvider>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        let country = country.into();

        not_blank(&name, BLANK_PARAMS)?;
        not_blank(&country, BLANK_PARAMS)?;
        below(&name, 128, "name cannot exceed 128 characters")?;
        below(&country, 128, "country cannot exceed 128 characters")?;

        Ok(Self {
            id: Uuid::new_v4(),
            name,
            country,
            manufacturer,
            mass_to_leo: None,
            mass_to_gto: None,
            mass_to_other: None,
            launches: BTreeSet::new(),
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

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn manufacturer(&self) -> &Arc<LaunchServiceProvider> {
        &self.manufacturer
    }

    pub fn mass_to_leo(&self) -> Option<&str> {
        self.mass_to_leo.as_deref()
    }

    pub fn mass_to_gto(&self) -> Option<&str> {
        self.mass_to_gto.as_deref()
    }

    pub fn mass_to_other(&self) -> Option<&str> {
        self.mass_to_other.as_deref()
    }

    pub fn launches(&self) -> &BTreeSet<Uuid> {
        &self.launches
    }

    pub fn set_mass_to_leo(&mut self, value: &str) -> Result<(), ValidationError> {
        self.mass_to_leo = Some(mass(
            value,
            "massToLEO cannot be null or empty",
            "massToLEO cannot be a negative value",
        )?);
        Ok(())
    }

    pub fn set_mass_to_gto(&mut self, value: &str) -> Result<(), ValidationError> {
        self.mass_to_gto = Some(mass(
            value,
            "massToGTO cannot be null or empty",
            "massToGTO cannot be a negative value",
        )?);
        Ok(())
    }

    pub fn set_mass_to_other(&mut self, value: &str) -> Result<(), ValidationError> {
        self.mass_to_other = Some(mass(
            value,
            "massToOther cannot be null or empty",
            "massToOther cannot be a negative value",
        )?);
        Ok(())
    }

    pub fn set_launches(&mut self, launches: BTreeSet<Uuid>) {
        self.launches = launches;
    }

    pub fn add_launch(&mut self, launch_id: Uuid) {
        self.launches.insert(launch_id);
    }
}

impl Entity for Rocket {
    const KIND: EntityKind = EntityKind::Rocket;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl PartialEq for Rocket {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.country == other.country
            && self.manufacturer == other.manufacturer
    }
}

impl Eq for Rocket {}

impl Hash for Rocket {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.country.hash(state);
        self.manufacturer.hash(state);
    }
}

impl fmt::Display for Rocket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) by {}",
            self.name,
            self.country,
            self.manufacturer.name()
        )
    }
}
