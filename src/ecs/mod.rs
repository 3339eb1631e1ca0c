//! Entity Component System module
//!
//! Components for agents living in a hecs world

mod components;

pub use components::{LookPivot, Name, Transform};
