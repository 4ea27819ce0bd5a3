//! # Sequence Player
//!
//! Turns a gait sequence into the series of [`MotionConfig`]s fed to the
//! motion core: it walks the sequence's steps, loops the main body a set
//! number of times and then plays the finalize tail.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;

use crate::{
    gait_catalog::{Gait, GaitSequence, MotionStep},
    motion_core::{MotionConfig, TimeValue, MTIME_MID},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Time steps which reach every step breakpoint exactly, i.e. the divisors
/// of `MTIME_MID`, ascending.
const TIME_STEPS: [TimeValue; 12] = [1, 2, 4, 5, 10, 20, 25, 50, 100, 125, 250, 500];

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Plays a single gait sequence.
#[derive(Debug)]
pub struct SequencePlayer {
    gait: Gait,
    sequence: &'static GaitSequence,

    /// Index of the step last handed out.
    current: Option<usize>,

    /// Number of complete passes through the main body.
    loops_done: u32,

    /// Number of main body passes to play before finalizing.
    num_loops: u32,

    stop_requested: bool,

    ext_speed_pct: u32,

    /// Time step of a step playing at 100 % speed.
    max_time_step: TimeValue,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SequencePlayer {
    pub fn new(gait: Gait, num_loops: u32, ext_speed_pct: u32, max_time_step: TimeValue) -> Self {
        Self {
            gait,
            sequence: gait.sequence(),
            current: None,
            loops_done: 0,
            num_loops,
            stop_requested: false,
            ext_speed_pct,
            max_time_step,
        }
    }

    /// Build the configuration of the next step, or `None` once the
    /// sequence has ended.
    pub fn next_config(&mut self) -> Option<MotionConfig> {
        let next = match self.current {
            None => 0,
            Some(i) => {
                if self.sequence.is_looped && i + 1 == self.sequence.finalize_motions_begin {
                    self.loops_done += 1;
                }
                self.sequence.next_motion(i, self.is_finalizing())?
            }
        };

        let step = self.sequence.motion(next)?;
        self.current = Some(next);

        let time_step = resolve_time_step(step, self.ext_speed_pct, self.max_time_step);
        debug!(
            "Playing {} step {} ({} %, time step {})",
            self.gait, next, step.speed, time_step
        );

        Some(MotionConfig::from_step(step, time_step))
    }

    /// Finalize at the end of the current main body pass.
    pub fn stop(&mut self) {
        self.stop_requested = true;
    }

    pub fn is_finalizing(&self) -> bool {
        self.stop_requested || self.loops_done >= self.num_loops
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn gait(&self) -> Gait {
        self.gait
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Resolve a step's nominal speed into the per frame time increment.
///
/// The step speed is scaled by the external speed unless the step ignores
/// it, applied to `max_time_step`, and rounded down to the nearest value
/// that lands exactly on the step's breakpoints. The result is never zero.
pub fn resolve_time_step(step: &MotionStep, ext_speed_pct: u32, max_time_step: TimeValue) -> TimeValue {
    let speed_pct = if step.ignore_ext_speed {
        step.speed
    } else {
        step.speed.saturating_mul(ext_speed_pct) / 100
    };

    let raw = max_time_step.saturating_mul(speed_pct) / 100;

    TIME_STEPS
        .iter()
        .rev()
        .find(|s| **s <= raw.min(MTIME_MID))
        .copied()
        .unwrap_or(TIME_STEPS[0])
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_resolve_time_step() {
        let mv = Gait::Move.sequence();
        let walk = &mv.motions[2];
        assert!(!walk.ignore_ext_speed);

        assert_eq!(resolve_time_step(walk, 100, 50), 50);
        assert_eq!(resolve_time_step(walk, 50, 50), 25);
        assert_eq!(resolve_time_step(walk, 30, 50), 10);
        assert_eq!(resolve_time_step(walk, 0, 50), 1);
        assert_eq!(resolve_time_step(walk, 1000, 500), 500);

        // Push-pull ignores the external speed, 15 % of 50 is rounded down
        let push = &Gait::PushPull.sequence().motions[1];
        assert_eq!(resolve_time_step(push, 10, 50), 5);
        assert_eq!(resolve_time_step(push, 200, 50), 5);

        for s in TIME_STEPS.iter() {
            assert_eq!(MTIME_MID % s, 0);
        }
    }

    #[test]
    fn test_player_loops_then_finalizes() {
        let mut player = SequencePlayer::new(Gait::Move, 2, 100, 100);

        let mut played = Vec::new();
        while let Some(config) = player.next_config() {
            assert_eq!(config.time_step, 100);
            played.push(player.current_index().unwrap());
        }

        assert_eq!(played, vec![0, 1, 2, 3, 2, 3, 4, 5]);
        assert!(player.is_finalizing());
        assert_eq!(player.next_config(), None);
    }

    #[test]
    fn test_player_stop() {
        let mut player = SequencePlayer::new(Gait::Dance, 100, 100, 100);

        for _ in 0..8 {
            assert!(player.next_config().is_some());
        }
        assert!(!player.is_finalizing());

        // The main body loops until stopped, dance has no tail
        assert!(player.next_config().is_some());
        assert_eq!(player.current_index(), Some(0));

        player.stop();
        for _ in 1..8 {
            assert!(player.next_config().is_some());
        }
        assert_eq!(player.next_config(), None);
    }

    #[test]
    fn test_player_unlooped() {
        let mut player = SequencePlayer::new(Gait::Down, 5, 100, 100);
        assert_eq!(player.gait(), Gait::Down);

        let mut count = 0;
        while player.next_config().is_some() {
            count += 1;
        }
        assert_eq!(count, 3);
    }
}
