//! Grid navigation for game agents
//!
//! This crate provides:
//! - Walkability grids sampled from rapier3d collision geometry
//! - 8-connected A* with octile costs and no corner cutting
//! - Path simplification by collinearity and line of sight
//! - Per-agent steering with sticky corners, smoothing and turn limits
//! - A per-tick system over a hecs world

pub mod ai;
pub mod animation;
pub mod core;
pub mod ecs;
pub mod physics;

// Re-exports for convenience
pub use glam;
pub use hecs;
pub use rapier3d;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::ai::{
        GoalPolicy, GoalProvider, Grid, KinematicMover, NavError, Navigator, Path, PathFinder,
        Pursuer, SteeringController, SteeringOutput, update_agents,
    };
    pub use crate::animation::{Locomotion, LocomotionDisplay, LocomotionTrack};
    pub use crate::core::{GridConfig, NavConfig, SteeringConfig};
    pub use crate::ecs::{LookPivot, Name, Transform};
    pub use crate::physics::{CollisionQuery, Physics, layers};
    pub use glam::{Quat, Vec2, Vec3};
}
