//! Path post-processing
//!
//! Turns a staircase of cell centers into a short list of corners: first
//! collinear points are dropped, then visibility rays shortcut everything
//! the agent could walk straight past. Endpoints are never touched.

use glam::{Vec2, Vec3};

use super::pathfinding::Path;
use crate::physics::{CollisionQuery, line_of_sight};

/// Segments whose unit directions have a larger dot product are merged
pub const COLLINEAR_DOT: f32 = 0.999;

/// Rays stop this far short of the target waypoint
const STRAIGHTEN_MARGIN: f32 = 0.01;

/// Simplify a raw path. The result never has more waypoints than the input.
#[must_use]
pub fn simplify<Q: CollisionQuery + ?Sized>(mut path: Path, query: &Q, cast_height: f32) -> Path {
    remove_collinear(&mut path.waypoints);
    straighten(&mut path.waypoints, query, cast_height);
    path
}

fn planar_direction(from: Vec3, to: Vec3) -> Vec2 {
    Vec2::new(to.x - from.x, to.z - from.z).normalize_or_zero()
}

/// Drop interior points whose incoming and outgoing XZ directions are
/// (nearly) parallel
pub fn remove_collinear(points: &mut Vec<Vec3>) {
    if points.len() <= 2 {
        return;
    }

    for i in (0..points.len() - 2).rev() {
        let incoming = planar_direction(points[i], points[i + 1]);
        let outgoing = planar_direction(points[i + 1], points[i + 2]);
        if incoming.dot(outgoing) > COLLINEAR_DOT {
            points.remove(i + 1);
        }
    }
}

/// Shortcut to the farthest visible point from each kept point
pub fn straighten<Q: CollisionQuery + ?Sized>(
    points: &mut Vec<Vec3>,
    query: &Q,
    cast_height: f32,
) {
    if points.len() <= 2 {
        return;
    }

    let lift = Vec3::Y * cast_height;
    let mut i = 0;
    while i + 2 < points.len() {
        let from = points[i] + lift;
        let farthest = (i + 2..points.len())
            .rev()
            .find(|&j| line_of_sight(query, from, points[j] + lift, STRAIGHTEN_MARGIN));

        if let Some(far) = farthest {
            points.drain(i + 1..far);
        }
        i += 1;
    }
}
