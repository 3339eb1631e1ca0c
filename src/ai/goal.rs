//! Goal providers
//!
//! Agent logic tells steering where it wants to be each tick, or that it
//! wants to hold position. The band policies here cover the usual melee
//! and ranged behaviours.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Source of the desired world position for one agent
pub trait GoalProvider {
    /// Where the agent at `agent_position` should head this tick.
    ///
    /// `None` means hold position.
    fn try_get_goal(&mut self, agent_position: Vec3) -> Option<Vec3>;
}

impl<F: FnMut(Vec3) -> Option<Vec3>> GoalProvider for F {
    fn try_get_goal(&mut self, agent_position: Vec3) -> Option<Vec3> {
        self(agent_position)
    }
}

/// Distance-band behaviour relative to a target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GoalPolicy {
    /// Always head for the target
    Follow,
    /// Close in, then stop to attack
    Melee {
        /// Hold when at least this close
        attack_range: f32,
        /// Ignore targets farther than this
        advance_max: f32,
    },
    /// Keep the target inside a firing band
    Ranged {
        /// Back off when closer than this
        retreat_below: f32,
        /// Inner edge of the firing band
        shoot_min: f32,
        /// Outer edge of the firing band
        shoot_max: f32,
        /// Ignore targets farther than this
        advance_max: f32,
    },
}

impl GoalPolicy {
    /// Default melee bands
    #[must_use]
    pub fn melee() -> Self {
        Self::Melee {
            attack_range: 2.0,
            advance_max: 20.0,
        }
    }

    /// Default ranged bands
    #[must_use]
    pub fn ranged() -> Self {
        Self::Ranged {
            retreat_below: 8.0,
            shoot_min: 8.0,
            shoot_max: 14.0,
            advance_max: 20.0,
        }
    }

    /// Goal for an agent given the target's position and facing
    #[must_use]
    pub fn goal(&self, agent: Vec3, target: Vec3, target_forward: Vec3) -> Option<Vec3> {
        let distance = agent.distance(target);

        match *self {
            Self::Follow => Some(target),
            Self::Melee {
                attack_range,
                advance_max,
            } => (distance > attack_range && distance <= advance_max).then_some(target),
            Self::Ranged {
                retreat_below,
                shoot_min,
                shoot_max,
                advance_max,
            } => {
                if distance < retreat_below {
                    let mut away = agent - target;
                    away.y = 0.0;
                    if away.length_squared() < 1e-4 {
                        away = -Vec3::new(target_forward.x, 0.0, target_forward.z);
                    }
                    let away = away.try_normalize().unwrap_or(Vec3::X);

                    let mut goal = target + away * shoot_min.max(0.5);
                    goal.y = agent.y;
                    Some(goal)
                } else if distance >= shoot_min && distance <= shoot_max {
                    None
                } else if distance > shoot_max && distance < advance_max {
                    Some(target)
                } else {
                    None
                }
            }
        }
    }
}

impl Default for GoalPolicy {
    fn default() -> Self {
        Self::Follow
    }
}

/// A policy bound to a target for one tick
#[derive(Debug, Clone, Copy)]
pub struct TargetGoal {
    /// Band policy
    pub policy: GoalPolicy,
    /// Target position
    pub target: Vec3,
    /// Target facing, used when retreating from directly on top of it
    pub target_forward: Vec3,
}

impl GoalProvider for TargetGoal {
    fn try_get_goal(&mut self, agent_position: Vec3) -> Option<Vec3> {
        self.policy
            .goal(agent_position, self.target, self.target_forward)
    }
}
