//! Collision queries for navigation
//!
//! Built on top of rapier3d

mod query;
mod world;

pub use query::{CollisionQuery, OpenSpace, line_of_sight};
pub use world::{ColliderHandle, ObstacleQuery, Physics, RaycastHit, layers};
