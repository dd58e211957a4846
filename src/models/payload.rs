use std::hash::{Hash, Hasher};

use serde::Serialize;
use uuid::Uuid;

use super::entity::{Entity, EntityKind};
use super::validate::{below, mass, not_blank, ValidationError};

const BLANK_PARAMS: &str = "Payload constructor parameters cannot be null or empty";

/// Cargo carried by a launch.
///
/// Hashing uses `(name, type)` while equality additionally compares the mass,
/// so equal payloads always hash alike.
#[derive(Debug, Clone, Serialize)]
pub struct Payload {
    id: Uuid,
    name: String,
    #[serde(rename = "type")]
    payload_type: String,
    mass: Option<String>,
}

impl Payload {
    pub fn new(name: impl Into<String>, payload_type: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        let payload_type = payload_type.into();

        not_blank(&name, BLANK_PARAMS)?;
        not_blank(&payload_type, BLANK_PARAMS)?;
        below(&name, 128, "name cannot exceed 128 characters")?;
        below(&payload_type, 128, "type cannot exceed 128 characters")?;

        Ok(Self {
            id: Uuid::new_v4(),
            name,
            payload_type,
            mass: None,
        })
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn payload_type(&self) -> &str {
        &self.payload_type
    }

    pub fn mass(&self) -> Option<&str> {
        self.mass.as_deref()
    }

    pub fn set_mass(&mut self, value: &str) -> Result<(), ValidationError> {
        self.mass = Some(mass(
            value,
            "mass cannot be null or empty",
            "mass cannot be a negative value",
        )?);
        Ok(())
    }
}

impl Entity for Payload {
    const KIND: EntityKind = EntityKind::Payload;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl PartialEq for Payload {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.payload_type == other.payload_type && self.mass == other.mass
    }
}

impl Eq for Payload {}

impl Hash for Payload {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.payload_type.hash(state);
    }
}
