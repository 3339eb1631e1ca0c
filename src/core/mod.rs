//! Core navigation settings
//!
//! Contains configuration types and their errors

mod config;

pub use config::{ConfigError, GridConfig, NavConfig, SteeringConfig};
