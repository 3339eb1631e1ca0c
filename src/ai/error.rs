//! Recoverable navigation query failures

use std::fmt;

/// Why a grid or path query produced no result.
///
/// None of these are fatal: steering treats every variant as "hold position
/// until the next scheduled repath".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavError {
    /// World point lies outside the grid rectangle
    OutOfBounds,
    /// Ring search around a point found no walkable cell
    NoWalkableCellFound,
    /// Start and goal are in disconnected regions
    NoPath,
    /// Start and goal resolve to the same cell
    DegenerateQuery,
}

impl fmt::Display for NavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds => write!(f, "point is outside the navigation grid"),
            Self::NoWalkableCellFound => write!(f, "no walkable cell within search radius"),
            Self::NoPath => write!(f, "no path between start and goal"),
            Self::DegenerateQuery => write!(f, "start and goal resolve to the same cell"),
        }
    }
}

impl std::error::Error for NavError {}
