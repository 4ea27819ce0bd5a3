//! Per frame trajectory and joint angle calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::servo::{ServoDems, NUM_LEGS};
use log::{error, warn};
use nalgebra::Point3;

use super::MotionCore;
use crate::{
    leg_kin,
    traj_gen::{linear_position, ArcPlan, TrajGenError, TrajectoryKind},
};

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotionCore {
    /// Compute the new foot positions and joint angles for the current
    /// motion time.
    ///
    /// Returns the demands for every leg whose target was reachable.
    pub(crate) fn calc(&mut self) -> ServoDems {
        let t = self.scaled_motion_time();

        let mut targets = [Point3::origin(); NUM_LEGS];
        for (target, leg) in targets.iter_mut().zip(self.legs.iter()) {
            *target = leg.position;
        }

        self.calc_linear(t, &mut targets);
        self.calc_arc(t, &mut targets);

        self.calc_angles(&targets)
    }

    /// Interpolate the linear legs.
    fn calc_linear(&self, t: f64, targets: &mut [Point3<f64>; NUM_LEGS]) {
        let config = &self.motion_config;

        for i in 0..NUM_LEGS {
            if config.trajectories[i] != TrajectoryKind::Linear {
                continue;
            }

            targets[i] = linear_position(
                &config.start_positions[i],
                &config.dest_positions[i],
                config.time_directions[i].relative(t),
            );
        }
    }

    /// Sweep the arc legs. If the arc is degenerate the arc legs keep their
    /// current positions.
    fn calc_arc(&mut self, t: f64, targets: &mut [Point3<f64>; NUM_LEGS]) {
        let config = &self.motion_config;

        let plan = match ArcPlan::new(
            &self.current_shape,
            &config.start_positions,
            &config.trajectories,
        ) {
            Ok(p) => p,
            Err(TrajGenError::NoArcLegs) => return,
            Err(e) => {
                warn!("MotionCore arc trajectory skipped: {}", e);
                self.report.degenerate_trajectory = true;
                return;
            }
        };

        for i in 0..NUM_LEGS {
            if let Some(p) = plan.position(
                i,
                &config.start_positions[i],
                config.trajectories[i],
                config.time_directions[i].relative(t),
                self.params.step_height_mm,
            ) {
                targets[i] = p;
            }
        }
    }

    /// Solve the kinematics of every leg, updating the leg states of the
    /// reachable ones.
    fn calc_angles(&mut self, targets: &[Point3<f64>; NUM_LEGS]) -> ServoDems {
        let mut dems = ServoDems::default();

        for (i, leg) in self.legs.iter_mut().enumerate() {
            match leg_kin::inverse(&leg.geometry, &targets[i]) {
                Ok(angles) => {
                    leg.position = targets[i];
                    leg.angles = angles;
                    if let Err(e) = dems.set_leg(i, angles.into()) {
                        error!("Cannot set the demands of leg {}: {}", i, e);
                    }
                }
                Err(e) => {
                    warn!("MotionCore leg {} holding position: {}", i, e);
                    self.report.unreachable[i] = true;
                }
            }
        }

        dems
    }
}
