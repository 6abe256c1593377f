//! Simplified orbital kinematics.

pub mod orbits;
