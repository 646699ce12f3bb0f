//! Parking finder server.
//!
//! Answers "where can I park near here?": facilities within a radius of the
//! user's location, ranked by driving distance from a routing service, or
//! the single nearest facility.

pub mod catalog;
pub mod config;
pub mod domain;
pub mod geo;
pub mod routing;
pub mod search;
pub mod session;
pub mod web;
