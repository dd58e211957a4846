//! The storage port consumed by the mining engine.
//!
//! Storage offers exactly one capability: load every entity of a given kind
//! as an unordered collection. Adapters live in [`crate::catalog`] (in-memory)
//! and [`crate::db`] (SQLite).

use std::sync::Arc;

use thiserror::Error;

use crate::models::*;

/// Opaque data access failure. The engine never interprets it and hands it
/// back to the caller unchanged.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("data access failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("invalid {kind} record {id}: {source}")]
    InvalidRecord {
        kind: EntityKind,
        id: String,
        #[source]
        source: ValidationError,
    },

    #[error("{kind} record {id} references missing {missing}")]
    DanglingReference {
        kind: EntityKind,
        id: String,
        missing: EntityKind,
    },

    #[error("expected {expected} records, found {found}")]
    KindMismatch {
        expected: EntityKind,
        found: EntityKind,
    },

    #[error("storage lock poisoned")]
    LockPoisoned,
}

/// One loaded entity, tagged by kind.
#[derive(Debug, Clone)]
pub enum Record {
    Rocket(Arc<Rocket>),
    LaunchServiceProvider(Arc<LaunchServiceProvider>),
    Launch(Arc<Launch>),
    Payload(Arc<Payload>),
    User(Arc<User>),
}

impl Record {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Rocket(_) => EntityKind::Rocket,
            Self::LaunchServiceProvider(_) => EntityKind::LaunchServiceProvider,
            Self::Launch(_) => EntityKind::Launch,
            Self::Payload(_) => EntityKind::Payload,
            Self::User(_) => EntityKind::User,
        }
    }
}

pub trait Repository {
    /// Load every entity of `kind`. May be empty; order is unspecified.
    fn load_all(&self, kind: EntityKind) -> Result<Vec<Record>, RepositoryError>;
}

impl<R: Repository + ?Sized> Repository for &R {
    fn load_all(&self, kind: EntityKind) -> Result<Vec<Record>, RepositoryError> {
        (**self).load_all(kind)
    }
}

impl<R: Repository + ?Sized> Repository for Arc<R> {
    fn load_all(&self, kind: EntityKind) -> Result<Vec<Record>, RepositoryError> {
        (**self).load_all(kind)
    }
}

impl<R: Repository + ?Sized> Repository for Box<R> {
    fn load_all(&self, kind: EntityKind) -> Result<Vec<Record>, RepositoryError> {
        (**self).load_all(kind)
    }
}

/// Load all launches, rejecting records of any other kind.
pub fn load_launches<R: Repository + ?Sized>(repo: &R) -> Result<Vec<Arc<Launch>>, RepositoryError> {
    repo.load_all(EntityKind::Launch)?
        .into_iter()
        .map(|record| match record {
            Record::Launch(launch) => Ok(launch),
            other => Err(RepositoryError::KindMismatch {
                expected: EntityKind::Launch,
                found: other.kind(),
            }),
        })
        .collect()
}
