//! # Motion Core
//!
//! The motion scheduler. Once per hardware frame it advances the normalised
//! motion time of the active [`MotionConfig`], asks the trajectory generator
//! for the new foot positions, solves the leg kinematics and hands the
//! resulting joint angles to the servo driver.
//!
//! Processing is cooperative: each call to `proc` performs a single step of
//! the `Sync -> Calc -> TimeShift` cycle and never blocks.
//!
//! Steering parameters are double buffered. A new curvature or step length
//! is staged with `update_trajectory_config` and only becomes active when
//! the motion time reaches the step's `time_update` point, so the shape of
//! an arc never changes part way through a half step.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod calc_traj;
mod config;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::servo::Joint;
use util::{archive::ArchiveError, params::LoadError};

use crate::leg_kin::KinError;

pub use config::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Normalised motion time, `MTIME_SCALE` represents `1.0`.
pub type TimeValue = u32;

/// Integer value of a complete step.
pub const MTIME_SCALE: TimeValue = 1000;

pub const MTIME_MIN: TimeValue = 0;
pub const MTIME_MID: TimeValue = MTIME_SCALE / 2;
pub const MTIME_MAX: TimeValue = MTIME_SCALE;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors in the leg configuration, all of which disable the module.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("The motion core has been disabled and cannot be configured again")]
    ModuleDisabled,

    #[error("The {0} length is not configured")]
    Unconfigured(Joint),

    #[error(
        "The {joint} zero rotation of leg {leg} ({value} deg) is outside the \
         plausible range of +/-{} deg",
        MAX_ZERO_ROTATE_DEG
    )]
    ZeroRotationOutOfRange { joint: Joint, leg: usize, value: i16 },

    #[error("The step height must be a positive number of millimeters, found {0}")]
    InvalidStepHeight(f64),

    #[error("The start position of leg {leg} cannot be reached: {err}")]
    UnreachableStartPose { leg: usize, err: KinError },
}

/// Errors which can occur while initialising the motion core.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("Cannot load the motion core parameters: {0}")]
    ParamLoadError(LoadError),

    #[error("Invalid leg configuration: {0}")]
    ConfigError(ConfigError),

    #[error("Cannot create the motion core archive directory: {0}")]
    ArchDirError(std::io::Error),

    #[error("Cannot create the motion core archives: {0}")]
    ArchiveError(ArchiveError),
}

/// Unrecoverable errors raised during processing.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MotionCoreError {
    #[error("The motion core is disabled")]
    ModuleDisabled,

    #[error("The motion core was processed in the invalid state {0:?}, the module is now disabled")]
    InvalidState(CoreState),
}
