use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kinds of entity a repository can hand back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Rocket,
    LaunchServiceProvider,
    Launch,
    Payload,
    User,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rocket => "rocket",
            Self::LaunchServiceProvider => "launch_service_provider",
            Self::Launch => "launch",
            Self::Payload => "payload",
            Self::User => "user",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common surface of every stored entity.
///
/// The id is an opaque storage identity. Equality between entities is always
/// defined on their natural key, never on the id.
pub trait Entity {
    const KIND: EntityKind;

    fn id(&self) -> Uuid;
}
