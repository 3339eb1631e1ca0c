//! Animation hand-off
//!
//! Navigation only decides Idle vs Walk and a playback rate; clip playback
//! belongs to whatever animation system consumes it.

mod locomotion;

pub use locomotion::{Locomotion, LocomotionDisplay, LocomotionTrack};
