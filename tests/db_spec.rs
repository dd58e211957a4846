mod common;

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use speculate2::speculate;

use rocket_miner::catalog::Snapshot;
use rocket_miner::db::{Database, ImportSummary};
use rocket_miner::mining::RocketMiner;
use rocket_miner::models::*;
use rocket_miner::repository::{Repository, RepositoryError};

fn launch_with_cargo() -> Snapshot {
    let maker = common::provider("Rocket Lab", 2006, "New Zealand");
    let electron = common::rocket("Electron", &maker);

    let mut launch = Launch::new(
        NaiveDate::from_ymd_opt(2019, 5, 5).expect("valid date"),
        electron,
        "Mahia LC-1A",
        "LEO",
        LaunchOutcome::Successful,
        "7500000.25".parse::<Decimal>().expect("decimal"),
    )
    .expect("valid launch");
    let mut cubesat = Payload::new("SPARC-1", "cubesat").expect("valid payload");
    cubesat.set_mass("4").expect("valid mass");
    launch.add_payload(cubesat);

    let mut snapshot = Snapshot::from_launches(vec![Arc::new(launch)]);
    snapshot.users.push(Arc::new(
        User::new("Peter", "Beck", "peter@example.com", "electron1").expect("valid user"),
    ));
    snapshot
}

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.migrate().expect("Failed to run migrations");
        let fixture = common::fixture();
    }

    describe "migrate" {
        it "can run more than once" {
            db.migrate().expect("Second migration run failed");
            assert!(db.load_snapshot().expect("Load failed").launches.is_empty());
        }
    }

    describe "import" {
        it "reports what it wrote" {
            let summary = db.import(&fixture.snapshot()).expect("Import failed");
            assert_eq!(
                summary,
                ImportSummary {
                    providers: 3,
                    rockets: 5,
                    launches: 10,
                    payloads: 0,
                    users: 0,
                }
            );
        }

        it "stores providers and rockets reachable from launches" {
            let summary = db.import(&launch_with_cargo()).expect("Import failed");
            assert_eq!((summary.providers, summary.rockets), (1, 1));
            assert_eq!((summary.payloads, summary.users), (1, 1));

            let snapshot = db.load_snapshot().expect("Load failed");
            assert_eq!(snapshot.providers[0].name(), "Rocket Lab");
            assert_eq!(snapshot.rockets[0].name(), "Electron");
        }

        it "stores providers sharing a natural key once" {
            let original = common::provider("ULA", 1990, "USA");
            let mut ula = LaunchServiceProvider::new("ULA", 1990, "USA").expect("valid provider");
            ula.set_headquarters("Centennial").expect("valid headquarters");
            let twin = Arc::new(ula);

            let atlas = common::rocket("Atlas V", &original);
            let delta = common::rocket("Delta IV", &twin);
            let snapshot = Snapshot::from_launches(vec![
                common::launch((2019, 1, 1), &atlas, "LEO", LaunchOutcome::Successful, 10),
                common::launch((2019, 2, 1), &delta, "LEO", LaunchOutcome::Failed, 10),
            ]);

            let summary = db.import(&snapshot).expect("Import failed");
            assert_eq!((summary.providers, summary.rockets, summary.launches), (1, 2, 2));

            let stored = db.load_snapshot().expect("Load failed");
            assert_eq!(stored.providers.len(), 1);
            assert_eq!(stored.providers[0].id(), original.id());
            assert_eq!(stored.providers[0].rockets().len(), 2);
            for launch in &stored.launches {
                assert!(Arc::ptr_eq(launch.launch_service_provider(), &stored.providers[0]));
            }

            let rates = RocketMiner::new(db.clone())
                .reliability(LaunchOutcome::Successful)
                .expect("query failed");
            assert_eq!(rates.len(), 1);
        }

        it "rolls back when a row is rejected" {
            db.import(&fixture.snapshot()).expect("Import failed");
            assert!(db.import(&fixture.snapshot()).is_err());
            assert_eq!(db.load_snapshot().expect("Load failed").launches.len(), 10);
        }
    }

    describe "load_snapshot" {
        it "restores launches in import order" {
            db.import(&fixture.snapshot()).expect("Import failed");
            let snapshot = db.load_snapshot().expect("Load failed");

            assert_eq!(snapshot.launches, fixture.launches);
            for (stored, original) in snapshot.launches.iter().zip(&fixture.launches) {
                assert_eq!(stored.id(), original.id());
                assert_eq!(stored.price(), original.price());
                assert_eq!(stored.launch_outcome(), original.launch_outcome());
                assert_eq!(stored.launch_site(), original.launch_site());
            }
            assert_eq!(snapshot.providers, fixture.providers);
        }

        it "rebuilds back references" {
            db.import(&fixture.snapshot()).expect("Import failed");
            let snapshot = db.load_snapshot().expect("Load failed");

            let workhorse = &snapshot.rockets[0];
            assert_eq!(workhorse.launches().len(), 4);
            assert!(workhorse.launches().contains(&fixture.launches[0].id()));

            let spacex = &snapshot.providers[1];
            assert_eq!(spacex.rockets().len(), 2);
            assert!(spacex.rockets().contains(&fixture.rockets[1].id()));
            assert!(spacex.rockets().contains(&fixture.rockets[4].id()));
        }

        it "keeps payloads exact prices and passwords" {
            db.import(&launch_with_cargo()).expect("Import failed");
            let snapshot = db.load_snapshot().expect("Load failed");

            let launch = &snapshot.launches[0];
            assert_eq!(launch.price(), "7500000.25".parse::<Decimal>().expect("decimal"));
            assert_eq!(launch.payloads().len(), 1);
            assert_eq!(launch.payloads()[0].mass(), Some("4"));
            assert!(snapshot.users[0].is_password_match("electron1"));
        }
    }

    describe "repository" {
        it "serves each kind" {
            db.import(&launch_with_cargo()).expect("Import failed");
            for kind in [
                EntityKind::LaunchServiceProvider,
                EntityKind::Rocket,
                EntityKind::Launch,
                EntityKind::Payload,
                EntityKind::User,
            ] {
                let records = db.load_all(kind).expect("Load failed");
                assert_eq!(records.len(), 1, "{} records", kind);
                assert_eq!(records[0].kind(), kind);
            }
        }

        it "answers queries like the in-memory snapshot" {
            db.import(&fixture.snapshot()).expect("Import failed");
            let stored = RocketMiner::new(db.clone());
            let memory = RocketMiner::new(fixture.snapshot());

            assert_eq!(
                stored.most_launched_rockets(2).expect("query failed"),
                memory.most_launched_rockets(2).expect("query failed"),
            );
            assert_eq!(
                stored.least_reliable_launch_service_providers(3).expect("query failed"),
                memory.least_reliable_launch_service_providers(3).expect("query failed"),
            );
            assert_eq!(
                stored.highest_revenue_launch_service_providers(3, 2017).expect("query failed"),
                memory.highest_revenue_launch_service_providers(3, 2017).expect("query failed"),
            );
            assert_eq!(
                stored.most_recent_launches(10).expect("query failed"),
                memory.most_recent_launches(10).expect("query failed"),
            );
            assert_eq!(stored.dominant_country(common::ORBITS[0]).expect("query failed"), "USA");
        }
    }

    describe "on disk" {
        before {
            let dir = tempfile::tempdir().expect("tempdir");
            let path = dir.path().join("nested").join("launches.db");
        }

        it "persists across connections" {
            {
                let db = Database::open(path.clone()).expect("Open failed");
                db.migrate().expect("Migration failed");
                db.import(&fixture.snapshot()).expect("Import failed");
            }

            let db = Database::open(path.clone()).expect("Reopen failed");
            db.migrate().expect("Migration failed");
            assert_eq!(db.load_snapshot().expect("Load failed").launches.len(), 10);
        }

        it "surfaces undecodable columns" {
            {
                let db = Database::open(path.clone()).expect("Open failed");
                db.migrate().expect("Migration failed");
                db.import(&fixture.snapshot()).expect("Import failed");
            }
            let raw = rusqlite::Connection::open(&path).expect("raw open");
            raw.execute("UPDATE launches SET price = 'lots' WHERE rowid = 1", [])
                .expect("raw update");

            let db = Database::open(path.clone()).expect("Reopen failed");
            let err = db.load_snapshot().unwrap_err();
            assert!(matches!(err, RepositoryError::Backend(_)));
            assert_eq!(err.to_string(), "data access failure: corrupt launches.price value 'lots'");
        }

        it "rejects stored rows that fail validation" {
            {
                let db = Database::open(path.clone()).expect("Open failed");
                db.migrate().expect("Migration failed");
                db.import(&fixture.snapshot()).expect("Import failed");
            }
            let raw = rusqlite::Connection::open(&path).expect("raw open");
            raw.execute("UPDATE launches SET orbit = '  '", []).expect("raw update");

            let db = Database::open(path.clone()).expect("Reopen failed");
            let err = db.load_snapshot().unwrap_err();
            assert!(matches!(
                err,
                RepositoryError::InvalidRecord { kind: EntityKind::Launch, .. }
            ));
            assert!(err.to_string().ends_with("orbit cannot be null or empty"));
        }

        it "reports launches whose rocket is gone" {
            {
                let db = Database::open(path.clone()).expect("Open failed");
                db.migrate().expect("Migration failed");
                db.import(&fixture.snapshot()).expect("Import failed");
            }
            // Foreign keys are off on a plain connection.
            let raw = rusqlite::Connection::open(&path).expect("raw open");
            raw.execute("DELETE FROM rockets WHERE name = 'rocket_3'", [])
                .expect("raw delete");

            let db = Database::open(path.clone()).expect("Reopen failed");
            let miner = RocketMiner::new(db);
            let err = miner.most_recent_launches(1).unwrap_err();
            assert!(!err.is_invalid_argument());
            assert!(err.to_string().ends_with("references missing rocket"));
        }
    }
}
