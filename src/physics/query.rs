//! Collision query capability consumed by navigation

use glam::{Quat, Vec3};

/// Read-only collision queries against static world geometry.
///
/// The grid build uses `box_overlap`; path simplification and corner
/// selection use `raycast`. Both must honour the same obstacle filter.
pub trait CollisionQuery {
    /// Whether an oriented box overlaps any obstacle
    fn box_overlap(&self, center: Vec3, half_extents: Vec3, rotation: Quat) -> bool;

    /// Whether a ray hits any obstacle within `max_distance`.
    ///
    /// `direction` is expected to be normalized.
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> bool;
}

impl<T: CollisionQuery + ?Sized> CollisionQuery for &T {
    fn box_overlap(&self, center: Vec3, half_extents: Vec3, rotation: Quat) -> bool {
        (**self).box_overlap(center, half_extents, rotation)
    }

    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> bool {
        (**self).raycast(origin, direction, max_distance)
    }
}

/// Empty world: nothing overlaps, nothing blocks
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenSpace;

impl CollisionQuery for OpenSpace {
    fn box_overlap(&self, _center: Vec3, _half_extents: Vec3, _rotation: Quat) -> bool {
        false
    }

    fn raycast(&self, _origin: Vec3, _direction: Vec3, _max_distance: f32) -> bool {
        false
    }
}

/// Check for an unobstructed segment between two points.
///
/// The ray stops `end_margin` short of `to` so geometry touching the target
/// point does not count. Points closer than the margin are always visible.
pub fn line_of_sight<Q: CollisionQuery + ?Sized>(
    query: &Q,
    from: Vec3,
    to: Vec3,
    end_margin: f32,
) -> bool {
    let offset = to - from;
    let distance = offset.length();
    if distance <= end_margin {
        return true;
    }
    !query.raycast(from, offset / distance, distance - end_margin)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Blocks every ray that crosses the plane x = 0
    struct WallAtOrigin;

    impl CollisionQuery for WallAtOrigin {
        fn box_overlap(&self, center: Vec3, half_extents: Vec3, _rotation: Quat) -> bool {
            (center.x - half_extents.x..=center.x + half_extents.x).contains(&0.0)
        }

        fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> bool {
            let end = origin + direction * max_distance;
            origin.x.signum() != end.x.signum()
        }
    }

    #[test]
    fn test_open_space_sees_everything() {
        assert!(line_of_sight(
            &OpenSpace,
            Vec3::ZERO,
            Vec3::new(100.0, 0.0, 100.0),
            0.01
        ));
    }

    #[test]
    fn test_wall_blocks_line_of_sight() {
        let from = Vec3::new(-2.0, 0.5, 0.0);
        let to = Vec3::new(2.0, 0.5, 0.0);
        assert!(!line_of_sight(&WallAtOrigin, from, to, 0.05));
        assert!(line_of_sight(&WallAtOrigin, from, Vec3::new(-0.5, 0.5, 3.0), 0.05));
    }

    #[test]
    fn test_coincident_points_are_visible() {
        let p = Vec3::new(-1.0, 0.0, 0.0);
        assert!(line_of_sight(&WallAtOrigin, p, p + Vec3::X * 0.01, 0.05));
    }

    fn overlaps_at<Q: CollisionQuery>(query: Q, x: f32) -> bool {
        query.box_overlap(Vec3::new(x, 0.0, 0.0), Vec3::splat(0.5), Quat::IDENTITY)
    }

    #[test]
    fn test_reference_forwarding() {
        let wall = WallAtOrigin;
        assert!(overlaps_at(&wall, 0.0));
        assert!(!overlaps_at(&wall, 3.0));
    }
}
