//! Shared launch fixture: 3 providers, 5 rockets and 10 launches in 2017.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use rocket_miner::catalog::Snapshot;
use rocket_miner::models::*;

pub const ORBITS: [&str; 4] = [
    "Low Earth Orbit",
    "Medium Earth Orbit",
    "High Earth Orbit",
    "Geo-Synchronous Orbit",
];

pub struct Fixture {
    pub providers: Vec<Arc<LaunchServiceProvider>>,
    pub rockets: Vec<Arc<Rocket>>,
    pub launches: Vec<Arc<Launch>>,
}

impl Fixture {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            providers: self.providers.clone(),
            rockets: self.rockets.clone(),
            launches: self.launches.clone(),
            users: Vec::new(),
        }
    }
}

pub fn provider(name: &str, year: i32, country: &str) -> Arc<LaunchServiceProvider> {
    Arc::new(LaunchServiceProvider::new(name, year, country).expect("valid provider"))
}

pub fn rocket(name: &str, manufacturer: &Arc<LaunchServiceProvider>) -> Arc<Rocket> {
    Arc::new(Rocket::new(name, "USA", Arc::clone(manufacturer)).expect("valid rocket"))
}

pub fn launch(
    date: (i32, u32, u32),
    vehicle: &Arc<Rocket>,
    orbit: &str,
    outcome: LaunchOutcome,
    price: i64,
) -> Arc<Launch> {
    let (year, month, day) = date;
    let launch_date = NaiveDate::from_ymd_opt(year, month, day).expect("valid date");
    Arc::new(
        Launch::new(
            launch_date,
            Arc::clone(vehicle),
            "VAFB",
            orbit,
            outcome,
            Decimal::from(price),
        )
        .expect("valid launch"),
    )
}

/// Providers: ULA (all successful), SpaceX (1 of 3 successful), ESA (all failed).
pub fn fixture() -> Fixture {
    use LaunchOutcome::{Failed, Successful};

    let providers = vec![
        provider("ULA", 1990, "USA"),
        provider("SpaceX", 2002, "USA"),
        provider("ESA", 1975, "Europe"),
    ];

    let maker_of_rocket = [0, 1, 2, 2, 1];
    let rockets: Vec<Arc<Rocket>> = maker_of_rocket
        .iter()
        .enumerate()
        .map(|(i, &maker)| rocket(&format!("rocket_{}", i), &providers[maker]))
        .collect();

    let months = [1, 6, 4, 3, 4, 11, 6, 5, 12, 5];
    let rocket_of_launch = [0, 0, 0, 0, 1, 1, 1, 2, 2, 3];
    let outcomes = [
        Successful, Successful, Successful, Successful, Successful, Failed, Failed, Failed, Failed,
        Failed,
    ];
    let prices = [
        999_999_999,
        99_999_999,
        9_999_999,
        999_999,
        99_999,
        9_999,
        999,
        99,
        9,
        1,
    ];

    let launches = (0..10)
        .map(|i| {
            launch(
                (2017, months[i], 1),
                &rockets[rocket_of_launch[i]],
                ORBITS[i % ORBITS.len()],
                outcomes[i],
                prices[i],
            )
        })
        .collect();

    Fixture {
        providers,
        rockets,
        launches,
    }
}
