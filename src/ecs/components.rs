//! Common ECS components

use glam::{Quat, Vec3};

use crate::ai::KinematicMover;

/// Transform component for position and rotation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in world space
    pub position: Vec3,
    /// Rotation as a quaternion
    pub rotation: Quat,
}

impl Transform {
    /// Create a new transform at the origin
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transform with just a position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Get the forward direction (negative Z in local space)
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Translate by a delta
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl KinematicMover for Transform {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn apply(&mut self, delta: Vec3) {
        self.translate(delta);
    }

    fn pin_height(&mut self, y: f32) {
        self.position.y = y;
    }
}

/// Separately rotated look pivot (head, turret).
///
/// When present, steering turns this instead of the entity's transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookPivot(pub Quat);

impl Default for LookPivot {
    fn default() -> Self {
        Self(Quat::IDENTITY)
    }
}

/// Name component for debugging
#[derive(Debug, Clone)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}
