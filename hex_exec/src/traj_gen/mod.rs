//! Trajectory generator
//!
//! Computes the instantaneous foot position of each leg for a normalised
//! motion time in `[0, 1]`. Two families of trajectory exist:
//!
//! - [`linear`]: straight line interpolation between a start and a
//!   destination point.
//! - [`arc`]: a circular sweep in the XZ plane steered by the
//!   [`ShapeConfig`], with either a constant or a half-sine lifted height.
//!
//! Everything in this module is pure, the motion core owns the state.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod arc;
pub mod linear;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

pub use arc::*;
pub use linear::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The trajectory followed by a single leg during a motion step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrajectoryKind {
    /// Straight line between the start and destination points.
    Linear,

    /// Curved XZ sweep, Y held at the start height.
    ArcConstantHeight,

    /// Curved XZ sweep, Y follows a half-sine lift profile.
    ArcSinusoidalHeight,
}

/// Whether a leg's progress follows the shared motion time or mirrors it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeDirection {
    Direct,
    Reverse,
}

/// Errors which can occur while generating trajectories.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TrajGenError {
    #[error("The maximum arc trajectory radius is zero, the arc cannot be computed")]
    DegenerateArc,

    #[error("No leg follows an arc trajectory")]
    NoArcLegs,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Steering parameters of the arc trajectories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeConfig {
    /// Curvature of the sweep, scaled by 1000. 0 is straight walking,
    /// approaching +/-2000 is a sharp turn.
    pub curvature: i32,

    /// Arc length traversed by the outermost foot during one step.
    ///
    /// Units: millimeters
    pub step_length: i32,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajectoryKind {
    /// Returns true for both arc kinds.
    pub fn is_arc(&self) -> bool {
        match self {
            TrajectoryKind::Linear => false,
            TrajectoryKind::ArcConstantHeight | TrajectoryKind::ArcSinusoidalHeight => true,
        }
    }
}

impl TimeDirection {
    /// Convert the shared normalised time into this leg's relative time.
    pub fn relative(&self, motion_time: f64) -> f64 {
        match self {
            TimeDirection::Direct => motion_time,
            TimeDirection::Reverse => 1.0 - motion_time,
        }
    }
}

impl ShapeConfig {
    /// Shape used after a reset: barely curved, no step.
    pub const NEUTRAL: ShapeConfig = ShapeConfig {
        curvature: 1,
        step_length: 0,
    };
}

impl Default for ShapeConfig {
    fn default() -> Self {
        ShapeConfig::NEUTRAL
    }
}
