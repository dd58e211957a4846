mod schema;

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::Snapshot;
use crate::models::*;
use crate::repository::{Record, Repository, RepositoryError};

/// A stored value that could not be decoded.
#[derive(Debug, Error)]
#[error("corrupt {table}.{column} value '{value}'")]
pub struct CorruptColumn {
    table: &'static str,
    column: &'static str,
    value: String,
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(e: rusqlite::Error) -> Self {
        RepositoryError::Backend(Box::new(e))
    }
}

/// Row counts written by [`Database::import`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub providers: usize,
    pub rockets: usize,
    pub launches: usize,
    pub payloads: usize,
    pub users: usize,
}

/// SQLite-backed launch catalog.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    /// `<data dir>/rocket-miner.db` for the current platform.
    pub fn default_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "rocket-miner")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Ok(dirs.data_dir().join("rocket-miner.db"))
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.lock()?;
        let applied = schema::run_migrations(&conn)?;
        if !applied.is_empty() {
            tracing::info!(count = applied.len(), "Database schema migrated");
        }
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, RepositoryError> {
        self.conn.lock().map_err(|_| RepositoryError::LockPoisoned)
    }

    // ============================================================
    // Import
    // ============================================================

    /// Write every entity reachable from `snapshot` in one transaction.
    ///
    /// Providers and rockets referenced by launches are stored even when the
    /// snapshot does not list them separately. Providers sharing a natural key
    /// are stored once, under the id of the first one seen.
    pub fn import(&self, snapshot: &Snapshot) -> Result<ImportSummary> {
        let mut rockets: Vec<&Arc<Rocket>> = Vec::new();
        let mut seen = HashSet::new();

        let vehicles = snapshot.launches.iter().map(|launch| launch.launch_vehicle());
        for rocket in snapshot.rockets.iter().chain(vehicles) {
            if seen.insert(rocket.id()) {
                rockets.push(rocket);
            }
        }

        let mut providers: Vec<&Arc<LaunchServiceProvider>> = Vec::new();
        let mut by_key: HashMap<&LaunchServiceProvider, Uuid> = HashMap::new();
        let mut stored_id: HashMap<Uuid, Uuid> = HashMap::new();
        let makers = rockets.iter().map(|rocket| rocket.manufacturer());
        let operators = snapshot
            .launches
            .iter()
            .map(|launch| launch.launch_service_provider());
        for provider in snapshot.providers.iter().chain(makers).chain(operators) {
            if stored_id.contains_key(&provider.id()) {
                continue;
            }
            let kept = *by_key.entry(&**provider).or_insert_with(|| {
                providers.push(provider);
                provider.id()
            });
            stored_id.insert(provider.id(), kept);
        }
        let provider_id = |provider: &LaunchServiceProvider| {
            stored_id
                .get(&provider.id())
                .copied()
                .unwrap_or_else(|| provider.id())
                .to_string()
        };

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut summary = ImportSummary::default();

        for provider in &providers {
            tx.execute(
                "INSERT INTO launch_service_providers (id, name, year_founded, country, headquarters)
                 VALUES (?, ?, ?, ?, ?)",
                (
                    provider.id().to_string(),
                    provider.name(),
                    provider.year_founded(),
                    provider.country(),
                    provider.headquarters(),
                ),
            )?;
            summary.providers += 1;
        }

        for rocket in &rockets {
            tx.execute(
                "INSERT INTO rockets (id, name, country, manufacturer_id, mass_to_leo, mass_to_gto, mass_to_other)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                (
                    rocket.id().to_string(),
                    rocket.name(),
                    rocket.country(),
                    provider_id(&**rocket.manufacturer()),
                    rocket.mass_to_leo(),
                    rocket.mass_to_gto(),
                    rocket.mass_to_other(),
                ),
            )?;
            summary.rockets += 1;
        }

        for launch in &snapshot.launches {
            tx.execute(
                "INSERT INTO launches (id, launch_date, rocket_id, provider_id, launch_site, orbit, outcome, price)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                (
                    launch.id().to_string(),
                    launch.launch_date().to_string(),
                    launch.launch_vehicle().id().to_string(),
                    provider_id(&**launch.launch_service_provider()),
                    launch.launch_site(),
                    launch.orbit(),
                    launch.launch_outcome().as_str(),
                    launch.price().to_string(),
                ),
            )?;
            summary.launches += 1;

            for payload in launch.payloads() {
                tx.execute(
                    "INSERT INTO payloads (id, launch_id, name, type, mass) VALUES (?, ?, ?, ?, ?)",
                    (
                        payload.id().to_string(),
                        launch.id().to_string(),
                        payload.name(),
                        payload.payload_type(),
                        payload.mass(),
                    ),
                )?;
                summary.payloads += 1;
            }
        }

        for user in &snapshot.users {
            tx.execute(
                "INSERT INTO users (id, first_name, last_name, email, password) VALUES (?, ?, ?, ?, ?)",
                (
                    user.id().to_string(),
                    user.first_name(),
                    user.last_name(),
                    user.email(),
                    user.password(),
                ),
            )?;
            summary.users += 1;
        }

        tx.commit()?;
        tracing::info!(
            providers = summary.providers,
            rockets = summary.rockets,
            launches = summary.launches,
            "Imported catalog"
        );
        Ok(summary)
    }

    // ============================================================
    // Loading
    // ============================================================

    /// Rebuild the linked entity graph from the tables.
    pub fn load_snapshot(&self) -> Result<Snapshot, RepositoryError> {
        let rows = self.read_rows()?;
        assemble(rows)
    }

    fn read_rows(&self) -> Result<Rows, RepositoryError> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT id, name, year_founded, country, headquarters
             FROM launch_service_providers ORDER BY rowid",
        )?;
        let providers = stmt
            .query_map([], |row| {
                Ok(ProviderRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    year_founded: row.get(2)?,
                    country: row.get(3)?,
                    headquarters: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = conn.prepare(
            "SELECT id, name, country, manufacturer_id, mass_to_leo, mass_to_gto, mass_to_other
             FROM rockets ORDER BY rowid",
        )?;
        let rockets = stmt
            .query_map([], |row| {
                Ok(RocketRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    country: row.get(2)?,
                    manufacturer_id: row.get(3)?,
                    mass_to_leo: row.get(4)?,
                    mass_to_gto: row.get(5)?,
                    mass_to_other: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = conn.prepare(
            "SELECT id, launch_date, rocket_id, provider_id, launch_site, orbit, outcome, price
             FROM launches ORDER BY rowid",
        )?;
        let launches = stmt
            .query_map([], |row| {
                Ok(LaunchRow {
                    id: row.get(0)?,
                    launch_date: row.get(1)?,
                    rocket_id: row.get(2)?,
                    provider_id: row.get(3)?,
                    launch_site: row.get(4)?,
                    orbit: row.get(5)?,
                    outcome: row.get(6)?,
                    price: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = conn.prepare(
            "SELECT id, launch_id, name, type, mass FROM payloads ORDER BY rowid",
        )?;
        let payloads = stmt
            .query_map([], |row| {
                Ok(PayloadRow {
                    id: row.get(0)?,
                    launch_id: row.get(1)?,
                    name: row.get(2)?,
                    payload_type: row.get(3)?,
                    mass: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = conn.prepare(
            "SELECT id, first_name, last_name, email, password FROM users ORDER BY rowid",
        )?;
        let users = stmt
            .query_map([], |row| {
                Ok(UserRow {
                    id: row.get(0)?,
                    first_name: row.get(1)?,
                    last_name: row.get(2)?,
                    email: row.get(3)?,
                    password: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Rows {
            providers,
            rockets,
            launches,
            payloads,
            users,
        })
    }
}

impl Repository for Database {
    fn load_all(&self, kind: EntityKind) -> Result<Vec<Record>, RepositoryError> {
        self.load_snapshot()?.load_all(kind)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

// ============================================================
// Row decoding
// ============================================================

struct ProviderRow {
    id: String,
    name: String,
    year_founded: i32,
    country: String,
    headquarters: Option<String>,
}

struct RocketRow {
    id: String,
    name: String,
    country: String,
    manufacturer_id: String,
    mass_to_leo: Option<String>,
    mass_to_gto: Option<String>,
    mass_to_other: Option<String>,
}

struct LaunchRow {
    id: String,
    launch_date: String,
    rocket_id: String,
    provider_id: String,
    launch_site: String,
    orbit: String,
    outcome: String,
    price: String,
}

struct PayloadRow {
    id: String,
    launch_id: String,
    name: String,
    payload_type: String,
    mass: Option<String>,
}

struct UserRow {
    id: String,
    first_name: String,
    last_name: String,
    email: String,
    password: String,
}

struct Rows {
    providers: Vec<ProviderRow>,
    rockets: Vec<RocketRow>,
    launches: Vec<LaunchRow>,
    payloads: Vec<PayloadRow>,
    users: Vec<UserRow>,
}

fn assemble(rows: Rows) -> Result<Snapshot, RepositoryError> {
    let mut rockets_by_maker: HashMap<Uuid, BTreeSet<Uuid>> = HashMap::new();
    for row in &rows.rockets {
        rockets_by_maker
            .entry(parse_uuid("rockets", "manufacturer_id", &row.manufacturer_id)?)
            .or_default()
            .insert(parse_uuid("rockets", "id", &row.id)?);
    }

    let mut providers = HashMap::new();
    let mut provider_order = Vec::with_capacity(rows.providers.len());
    for row in rows.providers {
        let id = parse_uuid("launch_service_providers", "id", &row.id)?;
        let reject = |source| invalid(EntityKind::LaunchServiceProvider, &row.id, source);

        let mut provider = LaunchServiceProvider::new(row.name, row.year_founded, row.country)
            .map_err(reject)?
            .with_id(id);
        if let Some(hq) = row.headquarters {
            provider.set_headquarters(hq).map_err(reject)?;
        }
        provider.set_rockets(rockets_by_maker.remove(&id).unwrap_or_default());
        providers.insert(id, Arc::new(provider));
        provider_order.push(id);
    }

    let mut launches_by_rocket: HashMap<Uuid, BTreeSet<Uuid>> = HashMap::new();
    for row in &rows.launches {
        launches_by_rocket
            .entry(parse_uuid("launches", "rocket_id", &row.rocket_id)?)
            .or_default()
            .insert(parse_uuid("launches", "id", &row.id)?);
    }

    let mut rockets = HashMap::new();
    let mut rocket_order = Vec::with_capacity(rows.rockets.len());
    for row in rows.rockets {
        let id = parse_uuid("rockets", "id", &row.id)?;
        let maker = parse_uuid("rockets", "manufacturer_id", &row.manufacturer_id)?;
        let manufacturer = providers
            .get(&maker)
            .ok_or_else(|| dangling(EntityKind::Rocket, &row.id, EntityKind::LaunchServiceProvider))?;
        let reject = |source| invalid(EntityKind::Rocket, &row.id, source);

        let mut rocket = Rocket::new(row.name, row.country, Arc::clone(manufacturer))
            .map_err(reject)?
            .with_id(id);
        if let Some(mass) = &row.mass_to_leo {
            rocket.set_mass_to_leo(mass).map_err(reject)?;
        }
        if let Some(mass) = &row.mass_to_gto {
            rocket.set_mass_to_gto(mass).map_err(reject)?;
        }
        if let Some(mass) = &row.mass_to_other {
            rocket.set_mass_to_other(mass).map_err(reject)?;
        }
        rocket.set_launches(launches_by_rocket.remove(&id).unwrap_or_default());
        rockets.insert(id, Arc::new(rocket));
        rocket_order.push(id);
    }

    let mut payloads_by_launch: HashMap<Uuid, Vec<Payload>> = HashMap::new();
    for row in rows.payloads {
        let reject = |source| invalid(EntityKind::Payload, &row.id, source);
        let mut payload = Payload::new(row.name.as_str(), row.payload_type.as_str())
            .map_err(reject)?
            .with_id(parse_uuid("payloads", "id", &row.id)?);
        if let Some(mass) = &row.mass {
            payload.set_mass(mass).map_err(reject)?;
        }
        payloads_by_launch
            .entry(parse_uuid("payloads", "launch_id", &row.launch_id)?)
            .or_default()
            .push(payload);
    }

    let mut launches = Vec::with_capacity(rows.launches.len());
    for row in rows.launches {
        let id = parse_uuid("launches", "id", &row.id)?;
        let vehicle = rockets
            .get(&parse_uuid("launches", "rocket_id", &row.rocket_id)?)
            .ok_or_else(|| dangling(EntityKind::Launch, &row.id, EntityKind::Rocket))?;
        let provider = providers
            .get(&parse_uuid("launches", "provider_id", &row.provider_id)?)
            .ok_or_else(|| dangling(EntityKind::Launch, &row.id, EntityKind::LaunchServiceProvider))?;
        let launch_date = NaiveDate::from_str(&row.launch_date)
            .map_err(|_| corrupt("launches", "launch_date", &row.launch_date))?;
        let outcome = LaunchOutcome::parse(&row.outcome)
            .ok_or_else(|| corrupt("launches", "outcome", &row.outcome))?;
        let price = Decimal::from_str(&row.price).map_err(|_| corrupt("launches", "price", &row.price))?;

        let mut launch = Launch::new(
            launch_date,
            Arc::clone(vehicle),
            row.launch_site,
            row.orbit,
            outcome,
            price,
        )
        .map_err(|source| invalid(EntityKind::Launch, &row.id, source))?
        .with_id(id);
        launch.set_launch_service_provider(Arc::clone(provider));
        launch.set_payloads(payloads_by_launch.remove(&id).unwrap_or_default());
        launches.push(Arc::new(launch));
    }

    let mut users = Vec::with_capacity(rows.users.len());
    for row in rows.users {
        let user = User::new(row.first_name, row.last_name, row.email, row.password)
            .map_err(|source| invalid(EntityKind::User, &row.id, source))?
            .with_id(parse_uuid("users", "id", &row.id)?);
        users.push(Arc::new(user));
    }

    Ok(Snapshot {
        providers: provider_order
            .iter()
            .filter_map(|id| providers.get(id).cloned())
            .collect(),
        rockets: rocket_order
            .iter()
            .filter_map(|id| rockets.get(id).cloned())
            .collect(),
        launches,
        users,
    })
}

fn parse_uuid(table: &'static str, column: &'static str, s: &str) -> Result<Uuid, RepositoryError> {
    Uuid::parse_str(s).map_err(|_| corrupt(table, column, s))
}

fn corrupt(table: &'static str, column: &'static str, value: &str) -> RepositoryError {
    RepositoryError::Backend(Box::new(CorruptColumn {
        table,
        column,
        value: value.to_string(),
    }))
}

fn invalid(kind: EntityKind, id: &str, source: ValidationError) -> RepositoryError {
    RepositoryError::InvalidRecord {
        kind,
        id: id.to_string(),
        source,
    }
}

fn dangling(kind: EntityKind, id: &str, missing: EntityKind) -> RepositoryError {
    RepositoryError::DanglingReference {
        kind,
        id: id.to_string(),
        missing,
    }
}
