//! Motion configuration handed to the motion core by the sequence player

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::servo::NUM_LEGS;
use nalgebra::Point3;

use super::{TimeValue, MTIME_MIN};
use crate::{
    gait_catalog::{LegMotion, MotionStep},
    traj_gen::{TimeDirection, TrajectoryKind},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The active playback state of the motion core.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionConfig {
    /// Position each leg starts from. Arc legs derive their whole sweep from
    /// this point.
    pub start_positions: [Point3<f64>; NUM_LEGS],

    /// Destination of the linear legs.
    pub dest_positions: [Point3<f64>; NUM_LEGS],

    pub trajectories: [TrajectoryKind; NUM_LEGS],

    pub time_directions: [TimeDirection; NUM_LEGS],

    /// Current normalised time.
    pub motion_time: TimeValue,

    /// Increment of `motion_time` per frame.
    pub time_step: TimeValue,

    /// The step is complete once `motion_time` reaches this value.
    pub time_stop: TimeValue,

    /// Value of `motion_time` at which the staged steering parameters
    /// become active. Must be hit exactly.
    pub time_update: Option<TimeValue>,

    /// Legs whose start position is captured from their live position when
    /// the motion starts, rather than taken from `start_positions`.
    pub capture_start: [bool; NUM_LEGS],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for MotionConfig {
    /// An already complete motion, the core holds position.
    fn default() -> Self {
        Self {
            start_positions: [Point3::origin(); NUM_LEGS],
            dest_positions: [Point3::origin(); NUM_LEGS],
            trajectories: [TrajectoryKind::Linear; NUM_LEGS],
            time_directions: [TimeDirection::Direct; NUM_LEGS],
            motion_time: MTIME_MIN,
            time_step: 0,
            time_stop: MTIME_MIN,
            time_update: None,
            capture_start: [false; NUM_LEGS],
        }
    }
}

impl MotionConfig {
    /// Build the configuration playing `step`, advancing by `time_step`
    /// each frame.
    ///
    /// Linear legs, and arc legs without an explicit start, start from the
    /// leg's live position.
    pub fn from_step(step: &MotionStep, time_step: TimeValue) -> Self {
        let mut config = Self {
            time_directions: step.time_directions,
            motion_time: step.motion_time,
            time_step,
            time_stop: step.time_stop,
            time_update: step.time_update,
            ..Self::default()
        };

        for (i, leg) in step.legs.iter().enumerate() {
            config.trajectories[i] = leg.kind();

            match leg {
                LegMotion::Linear { dest } => {
                    config.dest_positions[i] = *dest;
                    config.capture_start[i] = true;
                }
                LegMotion::Arc {
                    start_override: Some(start),
                    ..
                } => config.start_positions[i] = *start,
                LegMotion::Arc {
                    start_override: None,
                    ..
                } => config.capture_start[i] = true,
            }
        }

        config
    }

    /// Returns true if any leg's start is taken from its live position.
    pub fn needs_capture(&self) -> bool {
        self.capture_start.iter().any(|c| *c)
    }

    /// Returns true once the motion time has reached the stop time.
    pub fn is_complete(&self) -> bool {
        self.motion_time >= self.time_stop
    }
}
