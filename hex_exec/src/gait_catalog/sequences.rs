//! Gait sequence data
//!
//! Positions are given in the leg frames, in millimeters.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::servo::NUM_LEGS;
use nalgebra::Point3;

use super::{GaitSequence, HeightMode, LegMotion, MotionStep};
use crate::{
    motion_core::{MTIME_MAX, MTIME_MID, MTIME_MIN},
    traj_gen::TimeDirection,
};

use HeightMode::{Constant as C, Sinusoidal as S};
use TimeDirection::{Direct as D, Reverse as R};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Foot height with the leg on the ground.
const DOWN_Y: f64 = -85.0;

/// Foot height of a raised leg in the stepping gaits.
const UP_Y: f64 = DOWN_Y + 30.0;

/// Foot height used by the up/down gait to raise the body.
const BODY_UP_Y: f64 = DOWN_Y - 70.0;

/// Tilt applied by the rotation gaits.
const TILT_Y: f64 = 20.0;

/// Foot height while the body lies on the ground.
const LAID_Y: f64 = -15.0;

const ALL_DIRECT: [TimeDirection; NUM_LEGS] = [D; NUM_LEGS];
const ALL_REVERSE: [TimeDirection; NUM_LEGS] = [R; NUM_LEGS];

// ---------------------------------------------------------------------------
// STEP BUILDERS
// ---------------------------------------------------------------------------

const fn lin(x: f64, y: f64, z: f64) -> LegMotion {
    LegMotion::Linear {
        dest: Point3::new(x, y, z),
    }
}

/// Linear motion of every leg to the standard stance, at the given heights.
const fn stance(y: [f64; NUM_LEGS]) -> [LegMotion; NUM_LEGS] {
    [
        lin(-115.0, y[0], 70.0),
        lin(-135.0, y[1], 0.0),
        lin(-115.0, y[2], -70.0),
        lin(115.0, y[3], 70.0),
        lin(135.0, y[4], 0.0),
        lin(115.0, y[5], -70.0),
    ]
}

/// Linear motion of every leg to the wide stance used while lying down.
const fn laid(y: f64) -> [LegMotion; NUM_LEGS] {
    [
        lin(-140.0, y, 83.0),
        lin(-162.0, y, 0.0),
        lin(-140.0, y, -83.0),
        lin(140.0, y, 83.0),
        lin(162.0, y, 0.0),
        lin(140.0, y, -83.0),
    ]
}

/// Arc motion of every leg, starting from the standard stance on the ground.
const fn arcs(heights: [HeightMode; NUM_LEGS]) -> [LegMotion; NUM_LEGS] {
    const fn arc(x: f64, z: f64, height: HeightMode) -> LegMotion {
        LegMotion::Arc {
            start_override: Some(Point3::new(x, DOWN_Y, z)),
            height,
        }
    }

    [
        arc(-115.0, 70.0, heights[0]),
        arc(-135.0, 0.0, heights[1]),
        arc(-115.0, -70.0, heights[2]),
        arc(115.0, 70.0, heights[3]),
        arc(135.0, 0.0, heights[4]),
        arc(115.0, -70.0, heights[5]),
    ]
}

/// Linear move to the standard stance over a full step, ignoring the
/// external speed.
pub const DOWN_STANCE_STEP: MotionStep = MotionStep {
    legs: stance([DOWN_Y; NUM_LEGS]),
    time_directions: ALL_DIRECT,
    motion_time: MTIME_MIN,
    time_stop: MTIME_MAX,
    time_update: None,
    ignore_ext_speed: true,
    speed: 100,
};

/// Half of the tripod sequence shared by the up and dance gaits.
const TRIPOD_STEPS: [MotionStep; 4] = [
    // Raise 0, 2, 4
    MotionStep {
        legs: stance([UP_Y, DOWN_Y, UP_Y, DOWN_Y, UP_Y, DOWN_Y]),
        ..DOWN_STANCE_STEP
    },
    DOWN_STANCE_STEP,
    // Raise 1, 3, 5
    MotionStep {
        legs: stance([DOWN_Y, UP_Y, DOWN_Y, UP_Y, DOWN_Y, UP_Y]),
        ..DOWN_STANCE_STEP
    },
    DOWN_STANCE_STEP,
];

const WALK_A: [HeightMode; NUM_LEGS] = [C, S, C, S, C, S];
const WALK_B: [HeightMode; NUM_LEGS] = [S, C, S, C, S, C];
const WALK_A_DIRS: [TimeDirection; NUM_LEGS] = [D, R, D, R, D, R];
const WALK_B_DIRS: [TimeDirection; NUM_LEGS] = [R, D, R, D, R, D];

/// Arc step of the walking gait, external speed applies.
const WALK_STEP: MotionStep = MotionStep {
    legs: arcs(WALK_A),
    time_directions: WALK_A_DIRS,
    motion_time: MTIME_MIN,
    time_stop: MTIME_MAX,
    time_update: Some(MTIME_MID),
    ignore_ext_speed: false,
    speed: 100,
};

const PUSH_STEP: MotionStep = MotionStep {
    legs: arcs([C; NUM_LEGS]),
    time_directions: ALL_DIRECT,
    motion_time: MTIME_MIN,
    time_stop: MTIME_MAX,
    time_update: None,
    ignore_ext_speed: true,
    speed: 15,
};

// ---------------------------------------------------------------------------
// SEQUENCES
// ---------------------------------------------------------------------------

pub static DOWN: GaitSequence = GaitSequence {
    name: "down",
    is_looped: false,
    main_motions_begin: 0,
    finalize_motions_begin: 3,
    motions: &[
        MotionStep {
            legs: laid(LAID_Y),
            speed: 20,
            ..DOWN_STANCE_STEP
        },
        // Delay
        MotionStep {
            legs: laid(LAID_Y),
            speed: 40,
            ..DOWN_STANCE_STEP
        },
        MotionStep {
            legs: laid(40.0),
            speed: 40,
            ..DOWN_STANCE_STEP
        },
    ],
};

pub static UP: GaitSequence = GaitSequence {
    name: "up",
    is_looped: false,
    main_motions_begin: 0,
    finalize_motions_begin: 7,
    motions: &[
        MotionStep {
            legs: laid(LAID_Y),
            speed: 60,
            ..DOWN_STANCE_STEP
        },
        // Delay
        MotionStep {
            legs: laid(LAID_Y),
            speed: 60,
            ..DOWN_STANCE_STEP
        },
        DOWN_STANCE_STEP,
        TRIPOD_STEPS[0],
        TRIPOD_STEPS[1],
        TRIPOD_STEPS[2],
        TRIPOD_STEPS[3],
    ],
};

pub static MOVE: GaitSequence = GaitSequence {
    name: "move",
    is_looped: true,
    main_motions_begin: 2,
    finalize_motions_begin: 4,
    motions: &[
        // Preparation: raise 1, 3, 5 then swing them half way
        MotionStep {
            legs: stance([DOWN_Y, UP_Y, DOWN_Y, UP_Y, DOWN_Y, UP_Y]),
            time_update: Some(MTIME_MAX),
            ignore_ext_speed: false,
            ..DOWN_STANCE_STEP
        },
        MotionStep {
            motion_time: MTIME_MID,
            time_update: None,
            ..WALK_STEP
        },
        // Main
        MotionStep {
            legs: arcs(WALK_B),
            time_directions: WALK_B_DIRS,
            ..WALK_STEP
        },
        WALK_STEP,
        // Finalize: bring 0, 2, 4 back half way then stand
        MotionStep {
            legs: arcs(WALK_B),
            time_directions: WALK_B_DIRS,
            time_stop: MTIME_MID,
            time_update: None,
            ..WALK_STEP
        },
        MotionStep {
            ignore_ext_speed: false,
            ..DOWN_STANCE_STEP
        },
    ],
};

pub static UP_DOWN: GaitSequence = GaitSequence {
    name: "up_down",
    is_looped: true,
    main_motions_begin: 0,
    finalize_motions_begin: 2,
    motions: &[
        MotionStep {
            legs: stance([BODY_UP_Y; NUM_LEGS]),
            speed: 20,
            ..DOWN_STANCE_STEP
        },
        MotionStep {
            speed: 20,
            ..DOWN_STANCE_STEP
        },
    ],
};

pub static PUSH_PULL: GaitSequence = GaitSequence {
    name: "push_pull",
    is_looped: true,
    main_motions_begin: 1,
    finalize_motions_begin: 3,
    motions: &[
        MotionStep {
            motion_time: MTIME_MID,
            ..PUSH_STEP
        },
        MotionStep {
            time_directions: ALL_REVERSE,
            ..PUSH_STEP
        },
        PUSH_STEP,
        MotionStep {
            time_directions: ALL_REVERSE,
            time_stop: MTIME_MID,
            ..PUSH_STEP
        },
    ],
};

pub static ATTACK_LEFT: GaitSequence = GaitSequence {
    name: "attack_left",
    is_looped: true,
    main_motions_begin: 1,
    finalize_motions_begin: 3,
    motions: &[
        MotionStep {
            legs: attack(0, 150.0),
            ..DOWN_STANCE_STEP
        },
        MotionStep {
            legs: attack(0, 250.0),
            speed: 50,
            ..DOWN_STANCE_STEP
        },
        MotionStep {
            legs: attack(0, 150.0),
            speed: 50,
            ..DOWN_STANCE_STEP
        },
        DOWN_STANCE_STEP,
    ],
};

pub static ATTACK_RIGHT: GaitSequence = GaitSequence {
    name: "attack_right",
    is_looped: true,
    main_motions_begin: 1,
    finalize_motions_begin: 3,
    motions: &[
        MotionStep {
            legs: attack(3, 150.0),
            ..DOWN_STANCE_STEP
        },
        MotionStep {
            legs: attack(3, 250.0),
            speed: 50,
            ..DOWN_STANCE_STEP
        },
        MotionStep {
            legs: attack(3, 150.0),
            speed: 50,
            ..DOWN_STANCE_STEP
        },
        DOWN_STANCE_STEP,
    ],
};

const DANCE_REST: MotionStep = MotionStep {
    legs: [
        lin(-110.0, DOWN_Y, 65.0),
        lin(-130.0, DOWN_Y, 0.0),
        lin(-110.0, DOWN_Y, -65.0),
        lin(110.0, DOWN_Y, 65.0),
        lin(130.0, DOWN_Y, 0.0),
        lin(110.0, DOWN_Y, -65.0),
    ],
    speed: 50,
    ..DOWN_STANCE_STEP
};

pub static DANCE: GaitSequence = GaitSequence {
    name: "dance",
    is_looped: true,
    main_motions_begin: 0,
    finalize_motions_begin: 8,
    motions: &[
        TRIPOD_STEPS[0],
        TRIPOD_STEPS[1],
        TRIPOD_STEPS[2],
        TRIPOD_STEPS[3],
        // Wave the left side
        MotionStep {
            legs: [
                lin(-170.0, 50.0, 170.0),
                lin(-130.0, DOWN_Y, 0.0),
                lin(-170.0, 50.0, -170.0),
                lin(110.0, DOWN_Y, 65.0),
                lin(240.0, 50.0, 0.0),
                lin(110.0, DOWN_Y, -65.0),
            ],
            ..DANCE_REST
        },
        DANCE_REST,
        // Wave the right side
        MotionStep {
            legs: [
                lin(-110.0, DOWN_Y, 65.0),
                lin(-240.0, 50.0, 0.0),
                lin(-110.0, DOWN_Y, -65.0),
                lin(170.0, 50.0, 170.0),
                lin(130.0, DOWN_Y, 0.0),
                lin(170.0, 50.0, -170.0),
            ],
            ..DANCE_REST
        },
        DANCE_REST,
    ],
};

pub static ROTATE_X: GaitSequence = GaitSequence {
    name: "rotate_x",
    is_looped: true,
    main_motions_begin: 0,
    finalize_motions_begin: 2,
    motions: &[
        MotionStep {
            legs: stance([
                DOWN_Y + TILT_Y,
                DOWN_Y,
                DOWN_Y - TILT_Y,
                DOWN_Y + TILT_Y,
                DOWN_Y,
                DOWN_Y - TILT_Y,
            ]),
            speed: 30,
            ..DOWN_STANCE_STEP
        },
        MotionStep {
            legs: stance([
                DOWN_Y - TILT_Y,
                DOWN_Y,
                DOWN_Y + TILT_Y,
                DOWN_Y - TILT_Y,
                DOWN_Y,
                DOWN_Y + TILT_Y,
            ]),
            speed: 30,
            ..DOWN_STANCE_STEP
        },
        MotionStep {
            speed: 50,
            ..DOWN_STANCE_STEP
        },
    ],
};

pub static ROTATE_Z: GaitSequence = GaitSequence {
    name: "rotate_z",
    is_looped: true,
    main_motions_begin: 0,
    finalize_motions_begin: 2,
    motions: &[
        MotionStep {
            legs: stance([
                DOWN_Y + TILT_Y,
                DOWN_Y + TILT_Y,
                DOWN_Y + TILT_Y,
                DOWN_Y - TILT_Y,
                DOWN_Y - TILT_Y,
                DOWN_Y - TILT_Y,
            ]),
            speed: 30,
            ..DOWN_STANCE_STEP
        },
        MotionStep {
            legs: stance([
                DOWN_Y - TILT_Y,
                DOWN_Y - TILT_Y,
                DOWN_Y - TILT_Y,
                DOWN_Y + TILT_Y,
                DOWN_Y + TILT_Y,
                DOWN_Y + TILT_Y,
            ]),
            speed: 30,
            ..DOWN_STANCE_STEP
        },
        MotionStep {
            speed: 50,
            ..DOWN_STANCE_STEP
        },
    ],
};

/// Standard stance with one leg raised forward to `z`.
const fn attack(leg: usize, z: f64) -> [LegMotion; NUM_LEGS] {
    let mut legs = stance([DOWN_Y; NUM_LEGS]);
    legs[leg] = lin(0.0, 0.0, z);
    legs
}
