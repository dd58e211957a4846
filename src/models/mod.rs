//! Domain models for the launch catalog.
//!
//! # Core Concepts
//!
//! - [`LaunchServiceProvider`]: Organisation that builds rockets and/or flies them.
//!   Identified by `(name, year_founded, country)`.
//! - [`Rocket`]: Launch vehicle with a required manufacturer. Identified by
//!   `(name, country, manufacturer)`.
//! - [`Launch`]: One flight: date, vehicle, provider, site, orbit, outcome and price.
//! - [`Payload`]: Cargo aboard a launch.
//! - [`User`]: Platform account, identified by email.
//!
//! Every constructor and setter validates its input and reports the first
//! rule that failed as a [`ValidationError`]. Back references (the launches a
//! rocket flew, the rockets a provider builds) are sets of entity ids, so the
//! object graph only points one way: launch → rocket → provider.

mod entity;
mod launch;
mod payload;
mod provider;
mod rocket;
mod user;
mod validate;

pub use entity::*;
pub use launch::*;
pub use payload::*;
pub use provider::*;
pub use rocket::*;
pub use user::*;
pub use validate::ValidationError;
