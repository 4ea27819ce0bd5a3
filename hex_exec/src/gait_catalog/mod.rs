//! # Gait Catalog
//!
//! The fixed library of gait sequences. A sequence is an ordered list of
//! [`MotionStep`]s split into three segments:
//!
//! - preparation steps `[0, main_motions_begin)`, played once,
//! - the main body `[main_motions_begin, finalize_motions_begin)`, repeated
//!   while the sequence is looped,
//! - the finalize tail `[finalize_motions_begin, total)`, played once when
//!   the sequence is stopped.
//!
//! Deciding which sequence plays is left to the sequence player, this module
//! only holds the data and the navigation rule between steps.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod sequences;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::servo::NUM_LEGS;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use crate::{
    motion_core::TimeValue,
    traj_gen::{TimeDirection, TrajectoryKind},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Maximum number of steps in a single sequence.
pub const MAX_MOTIONS: usize = 10;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The gaits available in the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gait {
    Down,
    Up,
    Move,
    UpDown,
    PushPull,
    AttackLeft,
    AttackRight,
    Dance,
    RotateX,
    RotateZ,
}

/// Vertical profile of an arc leg.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeightMode {
    Constant,
    Sinusoidal,
}

/// What a single leg does during a motion step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LegMotion {
    /// Move in a straight line from the current position to `dest`.
    Linear { dest: Point3<f64> },

    /// Sweep along the arc defined by the steering parameters.
    ///
    /// The arc's geometry is implied by its start point, which is either
    /// given explicitly or taken from the leg's live position.
    Arc {
        start_override: Option<Point3<f64>>,
        height: HeightMode,
    },
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One segment of a gait.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionStep {
    pub legs: [LegMotion; NUM_LEGS],

    pub time_directions: [TimeDirection; NUM_LEGS],

    /// Normalised time the step starts at.
    pub motion_time: TimeValue,

    /// Normalised time at which the step is complete.
    pub time_stop: TimeValue,

    /// Normalised time at which staged steering parameters become active,
    /// or `None` if the step never swaps them.
    pub time_update: Option<TimeValue>,

    /// If true the external speed multiplier does not apply to this step.
    pub ignore_ext_speed: bool,

    /// Nominal speed of the step, in percent.
    pub speed: u32,
}

/// A named, ordered list of motion steps.
#[derive(Debug)]
pub struct GaitSequence {
    pub name: &'static str,
    pub is_looped: bool,
    pub main_motions_begin: usize,
    pub finalize_motions_begin: usize,
    pub motions: &'static [MotionStep],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Gait {
    pub const ALL: [Gait; 10] = [
        Gait::Down,
        Gait::Up,
        Gait::Move,
        Gait::UpDown,
        Gait::PushPull,
        Gait::AttackLeft,
        Gait::AttackRight,
        Gait::Dance,
        Gait::RotateX,
        Gait::RotateZ,
    ];

    /// Get the sequence data of this gait.
    pub fn sequence(&self) -> &'static GaitSequence {
        match self {
            Gait::Down => &sequences::DOWN,
            Gait::Up => &sequences::UP,
            Gait::Move => &sequences::MOVE,
            Gait::UpDown => &sequences::UP_DOWN,
            Gait::PushPull => &sequences::PUSH_PULL,
            Gait::AttackLeft => &sequences::ATTACK_LEFT,
            Gait::AttackRight => &sequences::ATTACK_RIGHT,
            Gait::Dance => &sequences::DANCE,
            Gait::RotateX => &sequences::ROTATE_X,
            Gait::RotateZ => &sequences::ROTATE_Z,
        }
    }
}

impl Display for Gait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sequence().name)
    }
}

impl LegMotion {
    /// The trajectory the generator uses for this leg.
    pub fn kind(&self) -> TrajectoryKind {
        match self {
            LegMotion::Linear { .. } => TrajectoryKind::Linear,
            LegMotion::Arc {
                height: HeightMode::Constant,
                ..
            } => TrajectoryKind::ArcConstantHeight,
            LegMotion::Arc {
                height: HeightMode::Sinusoidal,
                ..
            } => TrajectoryKind::ArcSinusoidalHeight,
        }
    }
}

impl GaitSequence {
    pub fn total_motions_count(&self) -> usize {
        self.motions.len()
    }

    /// Get a step by index.
    pub fn motion(&self, index: usize) -> Option<&'static MotionStep> {
        self.motions.get(index)
    }

    /// Index of the step to play after `current`.
    ///
    /// At the end of the main body a looped sequence returns to
    /// `main_motions_begin` unless `finalizing` is set, in which case it
    /// continues into the finalize tail. Returns `None` once the last step
    /// has been played.
    pub fn next_motion(&self, current: usize, finalizing: bool) -> Option<usize> {
        let next = current + 1;
        let main_end = self.finalize_motions_begin;

        if self.is_looped && !finalizing && current < main_end && next >= main_end {
            return Some(self.main_motions_begin);
        }

        if next < self.total_motions_count() {
            Some(next)
        } else {
            None
        }
    }
}
