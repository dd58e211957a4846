//! Ranking and aggregation queries over a catalog of rocket launches.
//!
//! The [`mining::RocketMiner`] answers questions such as "most active
//! rocket", "most reliable provider" or "dominant country per orbit" over the
//! launches a [`repository::Repository`] hands it. Entities in [`models`]
//! validate their fields on construction.

pub mod catalog;
pub mod config;
pub mod db;
pub mod mining;
pub mod models;
pub mod render;
pub mod repository;
