//! AI and navigation module
//!
//! Grid pathfinding, path post-processing, and the steering controller
//! that turns paths into smooth agent motion.

mod error;
mod goal;
mod grid;
mod nav;
mod pathfinding;
mod postprocess;
mod steering;
mod system;

pub use error::NavError;
pub use goal::{GoalPolicy, GoalProvider, TargetGoal};
pub use grid::{Cell, CellCoord, DIAGONAL_COST, Grid, STRAIGHT_COST};
pub use nav::Navigator;
pub use pathfinding::{CellPath, Path, PathFinder, find_path};
pub use postprocess::{remove_collinear, simplify, straighten};
pub use steering::{KinematicMover, SteeringController, SteeringOutput};
pub use system::{Pursuer, update_agents};
