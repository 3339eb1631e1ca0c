//! Locomotion intent handed to an external animation system

use serde::{Deserialize, Serialize};

/// Locomotion state shown by the agent's animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locomotion {
    /// Standing still
    #[default]
    Idle,
    /// Walking along a path
    Walk,
}

/// Sink for per-tick locomotion intent
pub trait LocomotionDisplay {
    /// Show `state` at the given playback rate
    fn set_state(&mut self, state: Locomotion, playback_rate: f32);
}

impl<T: LocomotionDisplay + ?Sized> LocomotionDisplay for &mut T {
    fn set_state(&mut self, state: Locomotion, playback_rate: f32) {
        (**self).set_state(state, playback_rate);
    }
}

/// Default cross-fade duration in seconds
const DEFAULT_CROSSFADE: f32 = 0.05;

/// Locomotion display that mirrors an animator's cross-fade behaviour.
///
/// The playback rate follows every call, but a cross-fade only starts when
/// the state actually changes, so repeated Walk/Walk calls never restart
/// the clip.
#[derive(Debug, Clone, PartialEq)]
pub struct LocomotionTrack {
    /// Current state
    state: Locomotion,
    /// Current playback rate
    playback_rate: f32,
    /// Cross-fade duration used for state changes
    crossfade: f32,
    /// Number of state changes so far
    transitions: u32,
}

impl LocomotionTrack {
    /// Create a track in the Idle state
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Locomotion::Idle,
            playback_rate: 1.0,
            crossfade: DEFAULT_CROSSFADE,
            transitions: 0,
        }
    }

    /// Set the cross-fade duration
    #[must_use]
    pub fn with_crossfade(mut self, seconds: f32) -> Self {
        self.crossfade = seconds.max(0.0);
        self
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> Locomotion {
        self.state
    }

    /// Current playback rate
    #[must_use]
    pub fn playback_rate(&self) -> f32 {
        self.playback_rate
    }

    /// Cross-fade duration
    #[must_use]
    pub fn crossfade(&self) -> f32 {
        self.crossfade
    }

    /// Number of state changes (cross-fades started)
    #[must_use]
    pub fn transitions(&self) -> u32 {
        self.transitions
    }
}

impl Default for LocomotionTrack {
    fn default() -> Self {
        Self::new()
    }
}

impl LocomotionDisplay for LocomotionTrack {
    fn set_state(&mut self, state: Locomotion, playback_rate: f32) {
        self.playback_rate = playback_rate;
        if self.state != state {
            self.state = state;
            self.transitions += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_starts_idle() {
        let track = LocomotionTrack::new();
        assert_eq!(track.state(), Locomotion::Idle);
        assert_eq!(track.transitions(), 0);
        assert!((track.crossfade() - 0.05).abs() < f32::EPSILON);
    }

    #[test]
    fn test_crossfade_only_on_change() {
        let mut track = LocomotionTrack::new();

        track.set_state(Locomotion::Walk, 1.0);
        track.set_state(Locomotion::Walk, 1.5);
        track.set_state(Locomotion::Walk, 2.0);
        assert_eq!(track.transitions(), 1);
        assert!((track.playback_rate() - 2.0).abs() < f32::EPSILON);

        track.set_state(Locomotion::Idle, 1.0);
        assert_eq!(track.state(), Locomotion::Idle);
        assert_eq!(track.transitions(), 2);
    }

    #[test]
    fn test_idle_on_idle_is_not_a_transition() {
        let mut track = LocomotionTrack::new();
        track.set_state(Locomotion::Idle, 1.0);
        assert_eq!(track.transitions(), 0);
    }

    #[test]
    fn test_forwarding_through_mut_ref() {
        fn drive(mut display: impl LocomotionDisplay) {
            display.set_state(Locomotion::Walk, 0.5);
        }

        let mut track = LocomotionTrack::new().with_crossfade(-1.0);
        drive(&mut track);
        assert_eq!(track.state(), Locomotion::Walk);
        assert_eq!(track.crossfade(), 0.0);
    }
}
