//! Domain types for the parking finder.
//!
//! These types represent validated location data. Coordinates enforce their
//! invariants at construction time, so code that receives them can trust
//! their validity.

mod coordinate;
mod facility;

pub use coordinate::{Coordinate, InvalidCoordinate};
pub use facility::{EnrichedFacility, Facility, RoadMetrics};
