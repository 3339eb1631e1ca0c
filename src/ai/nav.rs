//! Shared navigation context handed to steering each tick

use glam::Vec3;

use super::error::NavError;
use super::grid::Grid;
use super::pathfinding::{Path, PathFinder};
use super::postprocess::simplify;
use crate::physics::{CollisionQuery, line_of_sight};

/// A built grid together with the collision query it was built from.
///
/// Read-only; many agents can plan against one navigator.
pub struct Navigator<'a, Q: CollisionQuery + ?Sized> {
    grid: &'a Grid,
    obstacles: &'a Q,
}

impl<'a, Q: CollisionQuery + ?Sized> Navigator<'a, Q> {
    /// Create a navigator
    pub fn new(grid: &'a Grid, obstacles: &'a Q) -> Self {
        Self { grid, obstacles }
    }

    /// The walkability grid
    pub fn grid(&self) -> &'a Grid {
        self.grid
    }

    /// The obstacle query
    pub fn obstacles(&self) -> &'a Q {
        self.obstacles
    }

    /// Find and simplify a path between two world points
    ///
    /// # Errors
    ///
    /// See [`PathFinder::find_path`]
    pub fn plan(&self, start: Vec3, goal: Vec3) -> Result<Path, NavError> {
        let raw = PathFinder::new(self.grid).find_path(start, goal)?;
        Ok(simplify(raw, self.obstacles, self.grid.cast_height))
    }

    /// Whether `to` can be seen from `from` at the grid's cast height.
    ///
    /// Both ends are lifted from the height of `to`, so an agent standing
    /// above the grid plane tests against the same ground level its path
    /// was simplified at.
    pub fn can_see(&self, from: Vec3, to: Vec3, end_margin: f32) -> bool {
        let ground = to.y + self.grid.cast_height;
        line_of_sight(
            self.obstacles,
            Vec3::new(from.x, ground, from.z),
            Vec3::new(to.x, ground, to.z),
            end_margin,
        )
    }
}
