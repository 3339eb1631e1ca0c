//! Static collision world using rapier3d

use glam::{Quat, Vec3};
use rapier3d::na::{self, UnitQuaternion};
use rapier3d::parry::shape::Cuboid;
use rapier3d::prelude::*;

use super::query::CollisionQuery;

/// Handle to an obstacle collider in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderHandle(pub rapier3d::geometry::ColliderHandle);

/// Convert glam Quat to rapier3d UnitQuaternion
fn quat_to_rapier(q: Quat) -> UnitQuaternion<f32> {
    UnitQuaternion::from_quaternion(na::Quaternion::new(q.w, q.x, q.y, q.z))
}

fn isometry(position: Vec3, rotation: Quat) -> Isometry<f32> {
    Isometry::from_parts(
        na::Translation3::new(position.x, position.y, position.z),
        quat_to_rapier(rotation),
    )
}

/// Collision layer bits used by obstacle filters
pub mod layers {
    /// Walls, props and anything agents must walk around
    pub const OBSTACLE: u32 = 1 << 0;
    /// Characters (players, agents)
    pub const CHARACTER: u32 = 1 << 1;
    /// Everything
    pub const ALL: u32 = u32::MAX;
}

/// Static collision world for navigation queries.
///
/// Holds fixed colliders only; nothing is simulated. After adding or
/// removing colliders call [`Physics::update_queries`] before querying.
pub struct Physics {
    /// Island manager (needed for collider removal)
    island_manager: IslandManager,
    /// Rigid body set (empty, colliders are parentless)
    rigid_body_set: RigidBodySet,
    /// Collider set
    collider_set: ColliderSet,
    /// Query pipeline for raycasting and overlap tests
    query_pipeline: QueryPipeline,
    /// Colliders changed since the last pipeline update
    dirty: bool,
}

impl Physics {
    /// Create an empty collision world
    pub fn new() -> Self {
        Self {
            island_manager: IslandManager::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            query_pipeline: QueryPipeline::new(),
            dirty: false,
        }
    }

    /// Add a solid box obstacle on the given layers
    pub fn add_box(
        &mut self,
        center: Vec3,
        half_extents: Vec3,
        rotation: Quat,
        layers: u32,
    ) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .position(isometry(center, rotation))
            .collision_groups(InteractionGroups::new(
                Group::from_bits_truncate(layers),
                Group::ALL,
            ))
            .build();

        self.dirty = true;
        ColliderHandle(self.collider_set.insert(collider))
    }

    /// Add an axis-aligned wall on the obstacle layer
    pub fn add_wall(&mut self, center: Vec3, half_extents: Vec3) -> ColliderHandle {
        self.add_box(center, half_extents, Quat::IDENTITY, layers::OBSTACLE)
    }

    /// Add a trigger volume (sensor). Triggers never block navigation queries.
    pub fn add_trigger(&mut self, center: Vec3, half_extents: Vec3, layers: u32) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .position(isometry(center, Quat::IDENTITY))
            .collision_groups(InteractionGroups::new(
                Group::from_bits_truncate(layers),
                Group::ALL,
            ))
            .sensor(true)
            .build();

        self.dirty = true;
        ColliderHandle(self.collider_set.insert(collider))
    }

    /// Remove a collider
    pub fn remove(&mut self, handle: ColliderHandle) {
        let removed = self.collider_set.remove(
            handle.0,
            &mut self.island_manager,
            &mut self.rigid_body_set,
            false,
        );
        if removed.is_some() {
            self.dirty = true;
        }
    }

    /// Number of colliders in the world
    pub fn collider_count(&self) -> usize {
        self.collider_set.len()
    }

    /// Refresh the acceleration structure after collider edits
    pub fn update_queries(&mut self) {
        self.query_pipeline.update(&self.collider_set);
        self.dirty = false;
    }

    /// Cast a ray against colliders on `layers` and return the first hit
    pub fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: u32,
    ) -> Option<RaycastHit> {
        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![direction.x, direction.y, direction.z],
        );

        self.query_pipeline
            .cast_ray(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_distance,
                true,
                obstacle_filter(layers),
            )
            .map(|(handle, distance)| {
                let point = ray.point_at(distance);
                RaycastHit {
                    collider: ColliderHandle(handle),
                    point: Vec3::new(point.x, point.y, point.z),
                    distance,
                }
            })
    }

    /// Find any collider on `layers` overlapping an oriented box
    pub fn overlap_box(
        &self,
        center: Vec3,
        half_extents: Vec3,
        rotation: Quat,
        layers: u32,
    ) -> Option<ColliderHandle> {
        let shape = Cuboid::new(vector![half_extents.x, half_extents.y, half_extents.z]);

        self.query_pipeline
            .intersection_with_shape(
                &self.rigid_body_set,
                &self.collider_set,
                &isometry(center, rotation),
                &shape,
                obstacle_filter(layers),
            )
            .map(ColliderHandle)
    }

    /// Navigation view of this world that only sees colliders on `mask`
    pub fn obstacles(&self, mask: u32) -> ObstacleQuery<'_> {
        if self.dirty {
            log::warn!("Collision queries issued before update_queries(); results may be stale");
        }
        ObstacleQuery {
            physics: self,
            mask,
        }
    }
}

impl Default for Physics {
    fn default() -> Self {
        Self::new()
    }
}

/// Solid colliders on `layers`; sensors are ignored
fn obstacle_filter(layers: u32) -> QueryFilter<'static> {
    QueryFilter::new()
        .exclude_sensors()
        .groups(InteractionGroups::new(
            Group::ALL,
            Group::from_bits_truncate(layers),
        ))
}

/// Result of a raycast
#[derive(Debug, Clone)]
pub struct RaycastHit {
    /// The collider that was hit
    pub collider: ColliderHandle,
    /// The point of intersection
    pub point: Vec3,
    /// Distance from ray origin
    pub distance: f32,
}

/// [`CollisionQuery`] over a [`Physics`] world filtered by a layer mask
#[derive(Clone, Copy)]
pub struct ObstacleQuery<'a> {
    physics: &'a Physics,
    mask: u32,
}

impl CollisionQuery for ObstacleQuery<'_> {
    fn box_overlap(&self, center: Vec3, half_extents: Vec3, rotation: Quat) -> bool {
        self.physics
            .overlap_box(center, half_extents, rotation, self.mask)
            .is_some()
    }

    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> bool {
        self.physics
            .raycast(origin, direction, max_distance, self.mask)
            .is_some()
    }
}
