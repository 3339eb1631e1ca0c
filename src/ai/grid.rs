//! Walkability grid
//!
//! A fixed 2D occupancy grid over a world-aligned rectangle on the XZ plane.
//! Cells are sampled once against collision geometry and only change on an
//! explicit rebuild or manual edit.

use glam::{Quat, Vec3};
use smallvec::SmallVec;

use super::error::NavError;
use crate::core::{ConfigError, GridConfig};
use crate::physics::CollisionQuery;

/// Cost of an orthogonal step
pub const STRAIGHT_COST: u32 = 10;
/// Cost of a diagonal step (fixed-point sqrt(2))
pub const DIAGONAL_COST: u32 = 14;

/// Fraction of the cell size covered by the walkability probe (per side)
const PROBE_HALF_EXTENT: f32 = 0.45;

/// Integer cell coordinates; `y` indexes the world Z axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    /// Column
    pub x: usize,
    /// Row
    pub y: usize,
}

impl CellCoord {
    /// Create a coordinate
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Octile distance in step-cost units
    #[must_use]
    pub fn octile_distance(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x) as u32;
        let dy = self.y.abs_diff(other.y) as u32;
        DIAGONAL_COST * dx.min(dy) + STRAIGHT_COST * dx.abs_diff(dy)
    }

    /// Squared Euclidean distance in cells
    #[must_use]
    pub fn distance_squared(self, other: Self) -> usize {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx * dx + dy * dy
    }
}

/// A single grid cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    /// Integer coordinates
    pub coord: CellCoord,
    /// World-space center on the grid plane
    pub center: Vec3,
    /// Whether agents may stand here
    pub walkable: bool,
}

/// A 2D navigation grid
#[derive(Debug, Clone)]
pub struct Grid {
    /// Width in cells (X)
    pub cols: usize,
    /// Depth in cells (Z)
    pub rows: usize,
    /// Cell size in world units
    pub cell_size: f32,
    /// Minimum corner of the grid rectangle
    pub origin: Vec3,
    /// Free height required above a walkable cell
    pub clearance_height: f32,
    /// Ring radius used when snapping endpoints to walkable cells
    pub ring_search_radius: u32,
    /// Height above the grid plane for visibility rays
    pub cast_height: f32,
    /// Row-major cells, id = y * cols + x
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a grid with its minimum corner at the world origin.
    ///
    /// All cells start walkable.
    ///
    /// # Panics
    ///
    /// In debug builds, if `cell_size` is not a positive number. Use
    /// [`Grid::from_config`] to get an error instead.
    #[must_use]
    pub fn new(cols: usize, rows: usize, cell_size: f32) -> Self {
        debug_assert!(cell_size > 0.0, "cell size must be positive, got {cell_size}");
        let defaults = GridConfig::default();
        let mut grid = Self {
            cols: cols.max(1),
            rows: rows.max(1),
            cell_size,
            origin: Vec3::ZERO,
            clearance_height: defaults.clearance_height,
            ring_search_radius: defaults.ring_search_radius,
            cast_height: defaults.cast_height,
            cells: Vec::new(),
        };
        grid.layout_cells();
        grid
    }

    /// Move the grid so its minimum corner sits at `origin`
    #[must_use]
    pub fn with_origin(mut self, origin: Vec3) -> Self {
        self.origin = origin;
        let walkable: Vec<bool> = self.cells.iter().map(|c| c.walkable).collect();
        self.layout_cells();
        for (cell, walk) in self.cells.iter_mut().zip(walkable) {
            cell.walkable = walk;
        }
        self
    }

    /// Set the nearest-walkable search radius
    #[must_use]
    pub fn with_ring_search_radius(mut self, radius: u32) -> Self {
        self.ring_search_radius = radius;
        self
    }

    /// Create an all-walkable grid with the layout described by `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the bounds or cell size are invalid
    pub fn from_config(config: &GridConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let cols = ((config.size.x / config.cell_size).round() as usize).max(1);
        let rows = ((config.size.y / config.cell_size).round() as usize).max(1);
        let origin = config.center - Vec3::new(config.size.x, 0.0, config.size.y) * 0.5;

        let mut grid = Self {
            cols,
            rows,
            cell_size: config.cell_size,
            origin,
            clearance_height: config.clearance_height,
            ring_search_radius: config.ring_search_radius,
            cast_height: config.cast_height,
            cells: Vec::new(),
        };
        grid.layout_cells();
        Ok(grid)
    }

    /// Build a grid by probing every cell against collision geometry.
    ///
    /// Issues one box query per cell; call at startup, never per tick.
    ///
    /// # Errors
    ///
    /// Returns an error if the bounds or cell size are invalid
    pub fn build<Q: CollisionQuery + ?Sized>(
        config: &GridConfig,
        query: &Q,
    ) -> Result<Self, ConfigError> {
        let mut grid = Self::from_config(config)?;
        grid.rebuild(query);
        Ok(grid)
    }

    /// Re-sample every cell against collision geometry
    pub fn rebuild<Q: CollisionQuery + ?Sized>(&mut self, query: &Q) {
        let half_height = self.clearance_height * 0.5;
        let half_extents = Vec3::new(
            self.cell_size * PROBE_HALF_EXTENT,
            half_height,
            self.cell_size * PROBE_HALF_EXTENT,
        );

        for cell in &mut self.cells {
            let probe = cell.center + Vec3::Y * half_height;
            cell.walkable = !query.box_overlap(probe, half_extents, Quat::IDENTITY);
        }

        log::info!(
            "Built navigation grid {}x{} (cell {}), {} of {} cells walkable",
            self.cols,
            self.rows,
            self.cell_size,
            self.walkable_count(),
            self.cells.len()
        );
    }

    fn layout_cells(&mut self) {
        let mut cells = Vec::with_capacity(self.cols * self.rows);
        for y in 0..self.rows {
            for x in 0..self.cols {
                let coord = CellCoord::new(x, y);
                cells.push(Cell {
                    coord,
                    center: self.cell_center(coord),
                    walkable: true,
                });
            }
        }
        self.cells = cells;
    }

    /// Total number of cells
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the grid has no cells (never true for a built grid)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of walkable cells
    #[must_use]
    pub fn walkable_count(&self) -> usize {
        self.cells.iter().filter(|c| c.walkable).count()
    }

    /// Flat cell id for a coordinate
    #[must_use]
    pub fn index(&self, coord: CellCoord) -> usize {
        coord.y * self.cols + coord.x
    }

    /// Coordinate for a flat cell id
    #[must_use]
    pub fn coord(&self, index: usize) -> CellCoord {
        CellCoord::new(index % self.cols, index / self.cols)
    }

    /// Whether a coordinate lies inside the grid
    #[must_use]
    pub fn contains(&self, coord: CellCoord) -> bool {
        coord.x < self.cols && coord.y < self.rows
    }

    /// Get a cell
    #[must_use]
    pub fn cell(&self, coord: CellCoord) -> Option<&Cell> {
        if self.contains(coord) {
            self.cells.get(self.index(coord))
        } else {
            None
        }
    }

    /// Iterate over all cells in id order
    pub fn cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.iter()
    }

    /// Set a cell's walkability
    pub fn set_walkable(&mut self, coord: CellCoord, walkable: bool) {
        if self.contains(coord) {
            let index = self.index(coord);
            self.cells[index].walkable = walkable;
        }
    }

    /// Check if a cell is walkable (false outside the grid)
    #[must_use]
    pub fn is_walkable(&self, coord: CellCoord) -> bool {
        self.cell(coord).is_some_and(|c| c.walkable)
    }

    /// World position of a cell center
    #[must_use]
    pub fn cell_center(&self, coord: CellCoord) -> Vec3 {
        self.origin
            + Vec3::new(
                (coord.x as f32 + 0.5) * self.cell_size,
                0.0,
                (coord.y as f32 + 0.5) * self.cell_size,
            )
    }

    /// Convert a world position to cell coordinates
    ///
    /// # Errors
    ///
    /// Returns [`NavError::OutOfBounds`] outside the grid rectangle
    pub fn world_to_cell(&self, point: Vec3) -> Result<CellCoord, NavError> {
        let local = point - self.origin;
        let x = (local.x / self.cell_size).floor();
        let y = (local.z / self.cell_size).floor();

        // NaN fails both comparisons
        if !(x >= 0.0 && y >= 0.0) || x >= self.cols as f32 || y >= self.rows as f32 {
            return Err(NavError::OutOfBounds);
        }
        Ok(CellCoord::new(x as usize, y as usize))
    }

    /// Find the nearest walkable cell by expanding square rings.
    ///
    /// Ring `r` holds the cells at Chebyshev distance `r` from the snapped
    /// cell and is scanned column by column (X ascending, then Z ascending).
    ///
    /// # Errors
    ///
    /// Returns [`NavError::OutOfBounds`] if `point` is outside the grid and
    /// [`NavError::NoWalkableCellFound`] if every ring up to
    /// `max_ring_radius` is blocked
    pub fn closest_walkable(
        &self,
        point: Vec3,
        max_ring_radius: u32,
    ) -> Result<CellCoord, NavError> {
        let start = self.world_to_cell(point)?;
        let (sx, sy) = (start.x as i64, start.y as i64);

        for r in 0..=i64::from(max_ring_radius) {
            for dx in -r..=r {
                let nx = sx + dx;
                if nx < 0 || nx >= self.cols as i64 {
                    continue;
                }
                let on_edge_column = dx.abs() == r;
                let mut dy = -r;
                while dy <= r {
                    let ny = sy + dy;
                    if ny >= 0 && ny < self.rows as i64 {
                        let coord = CellCoord::new(nx as usize, ny as usize);
                        if self.is_walkable(coord) {
                            return Ok(coord);
                        }
                    }
                    // Interior columns only contribute their two end cells
                    dy += if on_edge_column || r == 0 { 1 } else { 2 * r };
                }
            }
        }

        Err(NavError::NoWalkableCellFound)
    }

    /// Resolve a world point to a walkable cell, falling back to the ring
    /// search when the point is blocked or outside the grid
    ///
    /// # Errors
    ///
    /// Propagates the ring search failure
    pub fn snap_walkable(&self, point: Vec3) -> Result<CellCoord, NavError> {
        match self.world_to_cell(point) {
            Ok(coord) if self.is_walkable(coord) => Ok(coord),
            _ => self.closest_walkable(point, self.ring_search_radius),
        }
    }

    /// Walkable 8-connected neighbors with their step costs.
    ///
    /// A diagonal is only offered when both orthogonal cells it passes
    /// between are walkable.
    #[must_use]
    pub fn neighbors(&self, coord: CellCoord) -> SmallVec<[(CellCoord, u32); 8]> {
        let mut result = SmallVec::new();
        let (x, y) = (coord.x as i64, coord.y as i64);

        for dx in -1..=1_i64 {
            for dy in -1..=1_i64 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let (nx, ny) = (x + dx, y + dy);
                if nx < 0 || ny < 0 || nx >= self.cols as i64 || ny >= self.rows as i64 {
                    continue;
                }
                let next = CellCoord::new(nx as usize, ny as usize);
                if !self.is_walkable(next) {
                    continue;
                }

                if dx != 0 && dy != 0 {
                    let side_a = CellCoord::new(nx as usize, coord.y);
                    let side_b = CellCoord::new(coord.x, ny as usize);
                    if !self.is_walkable(side_a) || !self.is_walkable(side_b) {
                        continue;
                    }
                    result.push((next, DIAGONAL_COST));
                } else {
                    result.push((next, STRAIGHT_COST));
                }
            }
        }

        result
    }
}
