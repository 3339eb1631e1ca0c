//! Per-tick navigation system over a hecs world

use glam::Vec3;
use hecs::Entity;
use rustc_hash::FxHashMap;

use super::goal::{GoalPolicy, TargetGoal};
use super::nav::Navigator;
use super::steering::SteeringController;
use crate::animation::{Locomotion, LocomotionTrack};
use crate::ecs::{LookPivot, Transform};
use crate::physics::CollisionQuery;

/// Chases another entity using a distance-band policy
#[derive(Debug, Clone, Copy)]
pub struct Pursuer {
    /// Entity to pursue
    pub target: Entity,
    /// Band policy relative to the target
    pub policy: GoalPolicy,
}

impl Pursuer {
    pub fn new(target: Entity, policy: GoalPolicy) -> Self {
        Self { target, policy }
    }
}

/// Tick every pursuing agent once.
///
/// Agents need a [`Transform`], [`SteeringController`], [`Pursuer`] and
/// [`LocomotionTrack`]. Facing goes to the [`LookPivot`] when the entity has
/// one, otherwise to the transform's rotation. Agents whose target no longer
/// exists hold position.
///
/// Returns the number of agents walking this tick.
pub fn update_agents<Q: CollisionQuery + ?Sized>(
    world: &mut hecs::World,
    nav: &Navigator<'_, Q>,
    dt: f32,
) -> usize {
    // Snapshot targets first; a target may itself be a moving agent
    let mut targets: FxHashMap<Entity, (Vec3, Vec3)> = FxHashMap::default();
    for (_, pursuer) in world.query::<&Pursuer>().iter() {
        if targets.contains_key(&pursuer.target) {
            continue;
        }
        if let Ok(transform) = world.get::<&Transform>(pursuer.target) {
            targets.insert(pursuer.target, (transform.position, transform.forward()));
        }
    }

    let mut walking = 0;
    for (entity, (transform, controller, pursuer, track, pivot)) in world.query_mut::<(
        &mut Transform,
        &mut SteeringController,
        &Pursuer,
        &mut LocomotionTrack,
        Option<&mut LookPivot>,
    )>() {
        let output = match targets.get(&pursuer.target) {
            Some(&(target, target_forward)) => {
                let mut goals = TargetGoal {
                    policy: pursuer.policy,
                    target,
                    target_forward,
                };
                controller.tick(dt, nav, &mut goals, transform, track)
            }
            None => {
                log::trace!("{:?} lost target {:?}", entity, pursuer.target);
                let mut hold = |_: Vec3| -> Option<Vec3> { None };
                controller.tick(dt, nav, &mut hold, transform, track)
            }
        };

        match pivot {
            Some(pivot) => pivot.0 = output.facing,
            None => transform.rotation = output.facing,
        }

        if output.locomotion == Locomotion::Walk {
            walking += 1;
        }
    }

    walking
}
