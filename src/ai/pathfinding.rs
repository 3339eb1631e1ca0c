//! A* pathfinding on the walkability grid
//!
//! 8-connected search with 10/14 step costs and an octile heuristic.
//! Per-query scratch (g, parent, open/closed) lives in arrays indexed by
//! cell id, so one `&Grid` can serve many concurrent searches.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use glam::Vec3;

use super::error::NavError;
use super::grid::{CellCoord, Grid};

/// Ordered world-space waypoints produced by a path query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    /// Waypoints in world coordinates, start first
    pub waypoints: Vec<Vec3>,
    /// Grid cost of the raw cell path (10 per straight step, 14 per diagonal)
    pub cost: u32,
}

impl Path {
    /// Check if the path holds no waypoints
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Number of waypoints
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Total world-space length
    #[must_use]
    pub fn length(&self) -> f32 {
        self.waypoints
            .windows(2)
            .map(|pair| pair[0].distance(pair[1]))
            .sum()
    }
}

/// Raw A* result in cell coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellPath {
    /// Cells from start to goal inclusive
    pub cells: Vec<CellCoord>,
    /// g-value of the goal cell
    pub cost: u32,
}

const NO_PARENT: u32 = u32::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeState {
    Unseen,
    Open,
    Closed,
}

/// Search scratch for one query
struct Scratch {
    g: Vec<u32>,
    parent: Vec<u32>,
    state: Vec<NodeState>,
}

impl Scratch {
    fn new(len: usize) -> Self {
        Self {
            g: vec![u32::MAX; len],
            parent: vec![NO_PARENT; len],
            state: vec![NodeState::Unseen; len],
        }
    }
}

/// A* open-set entry
#[derive(Debug, Clone)]
struct Node {
    index: usize,
    g: u32,
    h: u32,
    /// Squared cell distance to goal
    goal_distance: usize,
    /// Insertion order
    seq: u64,
}

impl Node {
    fn f(&self) -> u32 {
        self.g + self.h
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Node {}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap: lowest f, then h, then distance to goal,
        // then the earliest inserted
        other
            .f()
            .cmp(&self.f())
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| other.goal_distance.cmp(&self.goal_distance))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Path queries over a shared, read-only grid
#[derive(Debug, Clone, Copy)]
pub struct PathFinder<'a> {
    grid: &'a Grid,
}

impl<'a> PathFinder<'a> {
    /// Create a path finder for `grid`
    #[must_use]
    pub fn new(grid: &'a Grid) -> Self {
        Self { grid }
    }

    /// The grid searched by this path finder
    #[must_use]
    pub fn grid(&self) -> &'a Grid {
        self.grid
    }

    /// Find a path between two world points.
    ///
    /// Endpoints on blocked or outside cells are snapped to the nearest
    /// walkable cell first. Waypoints are cell centers.
    ///
    /// # Errors
    ///
    /// Returns the snap failure, [`NavError::DegenerateQuery`] when both
    /// endpoints land in one cell, or [`NavError::NoPath`]
    pub fn find_path(&self, start: Vec3, goal: Vec3) -> Result<Path, NavError> {
        let start_cell = self.grid.snap_walkable(start)?;
        let goal_cell = self.grid.snap_walkable(goal)?;
        let cell_path = self.find_cell_path(start_cell, goal_cell)?;

        let waypoints = cell_path
            .cells
            .iter()
            .map(|&c| self.grid.cell_center(c))
            .collect();

        Ok(Path {
            waypoints,
            cost: cell_path.cost,
        })
    }

    /// A* between two walkable cells
    ///
    /// # Errors
    ///
    /// Returns [`NavError::DegenerateQuery`] if `start == goal`,
    /// [`NavError::NoWalkableCellFound`] if either cell is blocked or outside
    /// the grid, and [`NavError::NoPath`] if the open set runs dry
    pub fn find_cell_path(&self, start: CellCoord, goal: CellCoord) -> Result<CellPath, NavError> {
        let grid = self.grid;
        if !grid.is_walkable(start) || !grid.is_walkable(goal) {
            return Err(NavError::NoWalkableCellFound);
        }
        if start == goal {
            return Err(NavError::DegenerateQuery);
        }

        let start_index = grid.index(start);
        let goal_index = grid.index(goal);

        let mut scratch = Scratch::new(grid.len());
        let mut open_set = BinaryHeap::new();
        let mut seq = 0_u64;

        scratch.g[start_index] = 0;
        scratch.state[start_index] = NodeState::Open;
        open_set.push(Node {
            index: start_index,
            g: 0,
            h: start.octile_distance(goal),
            goal_distance: start.distance_squared(goal),
            seq,
        });

        while let Some(current) = open_set.pop() {
            // Skip entries superseded by a cheaper push
            if scratch.state[current.index] == NodeState::Closed
                || current.g != scratch.g[current.index]
            {
                continue;
            }
            scratch.state[current.index] = NodeState::Closed;

            if current.index == goal_index {
                return Ok(CellPath {
                    cells: reconstruct(grid, &scratch, start_index, goal_index),
                    cost: current.g,
                });
            }

            let coord = grid.coord(current.index);
            for (next, step) in grid.neighbors(coord) {
                let next_index = grid.index(next);
                if scratch.state[next_index] == NodeState::Closed {
                    continue;
                }

                let tentative_g = current.g + step;
                if scratch.state[next_index] == NodeState::Unseen
                    || tentative_g < scratch.g[next_index]
                {
                    scratch.g[next_index] = tentative_g;
                    scratch.parent[next_index] = current.index as u32;
                    scratch.state[next_index] = NodeState::Open;

                    seq += 1;
                    open_set.push(Node {
                        index: next_index,
                        g: tentative_g,
                        h: next.octile_distance(goal),
                        goal_distance: next.distance_squared(goal),
                        seq,
                    });
                }
            }
        }

        Err(NavError::NoPath)
    }
}

fn reconstruct(grid: &Grid, scratch: &Scratch, start: usize, goal: usize) -> Vec<CellCoord> {
    let mut cells = vec![grid.coord(goal)];
    let mut current = goal;

    while current != start {
        let parent = scratch.parent[current];
        if parent == NO_PARENT {
            break;
        }
        current = parent as usize;
        cells.push(grid.coord(current));
    }

    cells.reverse();
    cells
}

/// Find a path using A* algorithm
///
/// # Errors
///
/// See [`PathFinder::find_path`]
pub fn find_path(grid: &Grid, start: Vec3, goal: Vec3) -> Result<Path, NavError> {
    PathFinder::new(grid).find_path(start, goal)
}
