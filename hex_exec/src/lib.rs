//! # Hexapod library.
//!
//! This library allows other crates in the workspace to access items defined inside the hexapod
//! crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Gait catalog - the fixed sequences of motion steps making up each gait
pub mod gait_catalog;

/// Leg kinematics - converts foot positions into joint angles and back
pub mod leg_kin;

/// Motion core - the frame synchronised scheduler producing servo demands
pub mod motion_core;

/// Executable parameters
pub mod params;

/// Sequence player - feeds the steps of a gait to the motion core
pub mod player;

/// Trajectory generator - foot positions along linear and arc trajectories
pub mod traj_gen;
