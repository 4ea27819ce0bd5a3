//! Arc trajectory calculations
//!
//! Every leg following an arc kind sweeps around the same pivot point
//! located at `(curvature_radius, 0)` in the XZ plane. The leg furthest from
//! the pivot covers exactly `step_length` of arc over a full step, the others
//! cover the same angle and therefore a shorter distance.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::servo::NUM_LEGS;
use nalgebra::{Point2, Point3};
use std::f64::consts::PI;
use util::maths::{clamp, sign_pos};

use super::{ShapeConfig, TrajGenError, TrajectoryKind};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Scale applied to the integer curvature value.
pub const CURVATURE_SCALE: f64 = 1000.0;

/// Curvature used in place of an exact zero, which would give an infinite
/// curvature radius.
pub const CURVATURE_EPSILON: f64 = 0.001;

/// Magnitude limit of the scaled curvature.
pub const CURVATURE_LIMIT: f64 = 1.999;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Per tick arc geometry, shared by all arc legs of a motion step.
#[derive(Clone, Debug, PartialEq)]
pub struct ArcPlan {
    /// X position of the sweep pivot.
    ///
    /// Units: millimeters
    pub curvature_radius: f64,

    /// Angle swept by every arc leg over a full step.
    ///
    /// Units: radians
    pub max_arc_angle: f64,

    legs: [Option<ArcLeg>; NUM_LEGS],
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct ArcLeg {
    trajectory_radius: f64,
    start_angle_rad: f64,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert the raw integer curvature into the scaled value actually used,
/// substituting the epsilon for zero and clamping into the open interval
/// `(-2, 2)`.
pub fn effective_curvature(raw: i32) -> f64 {
    if raw == 0 {
        return CURVATURE_EPSILON;
    }

    clamp(
        &(raw as f64 / CURVATURE_SCALE),
        &-CURVATURE_LIMIT,
        &CURVATURE_LIMIT,
    )
}

/// Distance from the body origin to the pivot of the sweep.
pub fn curvature_radius(shape: &ShapeConfig) -> f64 {
    let curvature = effective_curvature(shape.curvature);

    ((2.0 - curvature) * PI / 4.0).tan() * shape.step_length as f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ArcPlan {
    /// Plan the sweep for the given shape and leg start positions.
    ///
    /// Legs whose kind is not an arc are ignored. Fails if no leg is an arc
    /// leg, or if the largest trajectory radius is zero.
    pub fn new(
        shape: &ShapeConfig,
        starts: &[Point3<f64>; NUM_LEGS],
        kinds: &[TrajectoryKind; NUM_LEGS],
    ) -> Result<Self, TrajGenError> {
        let curvature_radius = curvature_radius(shape);
        let pivot = Point2::new(curvature_radius, 0.0);

        let mut legs = [None; NUM_LEGS];
        let mut max_trajectory_radius = 0f64;

        for (i, (start, kind)) in starts.iter().zip(kinds.iter()).enumerate() {
            if !kind.is_arc() {
                continue;
            }

            // Start position relative to the pivot, in the ground plane
            let offset = start.xz() - pivot;
            let trajectory_radius = offset.norm();

            if trajectory_radius > max_trajectory_radius {
                max_trajectory_radius = trajectory_radius;
            }

            legs[i] = Some(ArcLeg {
                trajectory_radius,
                start_angle_rad: offset.y.atan2(offset.x),
            });
        }

        if legs.iter().all(|l| l.is_none()) {
            return Err(TrajGenError::NoArcLegs);
        }

        // Also catches a NaN radius
        if !(max_trajectory_radius > 0.0) {
            return Err(TrajGenError::DegenerateArc);
        }

        let max_arc_angle =
            sign_pos(curvature_radius) * shape.step_length as f64 / max_trajectory_radius;

        Ok(Self {
            curvature_radius,
            max_arc_angle,
            legs,
        })
    }

    /// Foot position of `leg` at relative time `t`.
    ///
    /// Returns `None` if the leg was not planned as an arc leg.
    pub fn position(
        &self,
        leg: usize,
        start: &Point3<f64>,
        kind: TrajectoryKind,
        t: f64,
        lift_height: f64,
    ) -> Option<Point3<f64>> {
        let arc = self.legs.get(leg).copied().flatten()?;

        let arc_angle_rad = (t - 0.5) * self.max_arc_angle + arc.start_angle_rad;

        let y = match kind {
            TrajectoryKind::ArcConstantHeight => start.y,
            TrajectoryKind::ArcSinusoidalHeight => start.y + lift_height * (t * PI).sin(),
            TrajectoryKind::Linear => return None,
        };

        let (sin, cos) = arc_angle_rad.sin_cos();

        Some(Point3::new(
            self.curvature_radius + arc.trajectory_radius * cos,
            y,
            arc.trajectory_radius * sin,
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const TOL: f64 = 1e-9;

    fn stance(y: f64) -> [Point3<f64>; NUM_LEGS] {
        [
            Point3::new(-115.0, y, 70.0),
            Point3::new(-135.0, y, 0.0),
            Point3::new(-115.0, y, -70.0),
            Point3::new(115.0, y, 70.0),
            Point3::new(135.0, y, 0.0),
            Point3::new(115.0, y, -70.0),
        ]
    }

    const ALTERNATING: [TrajectoryKind; NUM_LEGS] = [
        TrajectoryKind::ArcConstantHeight,
        TrajectoryKind::ArcSinusoidalHeight,
        TrajectoryKind::ArcConstantHeight,
        TrajectoryKind::ArcSinusoidalHeight,
        TrajectoryKind::ArcConstantHeight,
        TrajectoryKind::ArcSinusoidalHeight,
    ];

    #[test]
    fn test_effective_curvature() {
        assert_eq!(effective_curvature(0), CURVATURE_EPSILON);
        assert_eq!(effective_curvature(1000), 1.0);
        assert_eq!(effective_curvature(-500), -0.5);
        assert_eq!(effective_curvature(1999), 1.999);
        assert_eq!(effective_curvature(5000), CURVATURE_LIMIT);
        assert_eq!(effective_curvature(-2000), -CURVATURE_LIMIT);
    }

    #[test]
    fn test_zero_curvature_is_finite() {
        let shape = ShapeConfig {
            curvature: 0,
            step_length: 90,
        };
        let radius = curvature_radius(&shape);
        assert!(radius.is_finite());
        assert!(radius > 0.0);

        let plan = ArcPlan::new(&shape, &stance(-85.0), &ALTERNATING).unwrap();
        assert!(plan.max_arc_angle.is_finite());
    }

    #[test]
    fn test_midpoint_is_start() {
        let starts = stance(-85.0);

        for curvature in [-1999, -1000, -1, 1, 0, 500, 1000, 1500, 1999].iter() {
            for step_length in [-110, 40, 110].iter() {
                let shape = ShapeConfig {
                    curvature: *curvature,
                    step_length: *step_length,
                };
                let plan = ArcPlan::new(&shape, &starts, &ALTERNATING).unwrap();

                for (leg, start) in starts.iter().enumerate() {
                    let p = plan
                        .position(leg, start, ALTERNATING[leg], 0.5, 30.0)
                        .unwrap();
                    assert!((p.x - start.x).abs() < TOL, "{:?} {:?}", shape, p);
                    assert!((p.z - start.z).abs() < TOL, "{:?} {:?}", shape, p);
                }
            }
        }
    }

    #[test]
    fn test_height_profiles() {
        let starts = stance(-85.0);
        let shape = ShapeConfig {
            curvature: 1000,
            step_length: 60,
        };
        let plan = ArcPlan::new(&shape, &starts, &ALTERNATING).unwrap();

        for t in [0.0, 0.25, 0.5, 1.0].iter() {
            let constant = plan
                .position(0, &starts[0], ALTERNATING[0], *t, 30.0)
                .unwrap();
            assert_eq!(constant.y, -85.0);
        }

        let lifted = plan
            .position(1, &starts[1], ALTERNATING[1], 0.5, 30.0)
            .unwrap();
        assert!((lifted.y - -55.0).abs() < TOL);

        let landed = plan
            .position(1, &starts[1], ALTERNATING[1], 1.0, 30.0)
            .unwrap();
        assert!((landed.y - -85.0).abs() < TOL);
    }

    #[test]
    fn test_outer_leg_covers_step_length() {
        let starts = stance(-85.0);
        let shape = ShapeConfig {
            curvature: 1000,
            step_length: 80,
        };
        let plan = ArcPlan::new(&shape, &starts, &ALTERNATING).unwrap();

        // With curvature 1 the pivot sits at x = step_length, leg 1 is the
        // furthest away
        assert!((plan.curvature_radius - 80.0).abs() < 1e-6);
        let r = 80.0 + 135.0;
        assert!((plan.max_arc_angle.abs() * r - 80.0).abs() < 1e-6);
    }

    #[test]
    fn test_linear_legs_ignored() {
        let starts = stance(-85.0);
        let mut kinds = ALTERNATING;
        kinds[2] = TrajectoryKind::Linear;
        let shape = ShapeConfig {
            curvature: 1000,
            step_length: 80,
        };

        let plan = ArcPlan::new(&shape, &starts, &kinds).unwrap();
        assert_eq!(
            plan.position(2, &starts[2], TrajectoryKind::ArcConstantHeight, 0.3, 30.0),
            None
        );

        let linear = [TrajectoryKind::Linear; NUM_LEGS];
        assert_eq!(
            ArcPlan::new(&shape, &starts, &linear),
            Err(TrajGenError::NoArcLegs)
        );
    }

    #[test]
    fn test_degenerate_arc() {
        // Zero step length puts the pivot at the origin, feet at the origin
        // then have no radius at all
        let starts = [Point3::new(0.0, -85.0, 0.0); NUM_LEGS];
        let shape = ShapeConfig {
            curvature: 1000,
            step_length: 0,
        };

        assert_eq!(
            ArcPlan::new(&shape, &starts, &ALTERNATING),
            Err(TrajGenError::DegenerateArc)
        );
    }
}
