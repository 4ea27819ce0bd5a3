//! # Communications interface crate.
//!
//! Provides all common interfaces between the motion software and the
//! equipment it drives.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Demand definitions for equipment (like the leg servos)
pub mod eqpt;
