//! # Leg Kinematics
//!
//! Analytical kinematics of a three joint leg: a coxa yawing about the
//! vertical axis followed by a femur/tibia pair pitching in the leg's
//! sagittal plane.
//!
//! The inverse solve rotates the target by the coxa zero rotation, takes the
//! coxa angle from the resulting XZ direction, then solves the femur/tibia
//! triangle in the sagittal plane with the law of cosines.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Point3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use thiserror::Error;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One rigid link of a leg.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Units: millimeters
    pub length: f64,

    /// Calibration offset of the joint driving this segment.
    ///
    /// Units: degrees
    pub zero_rotation_deg: f64,
}

/// Segments of a single leg.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LegGeometry {
    pub coxa: Segment,
    pub femur: Segment,
    pub tibia: Segment,
}

/// Joint angles of a single leg.
///
/// Units: degrees
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JointAngles {
    pub coxa_deg: f64,
    pub femur_deg: f64,
    pub tibia_deg: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum KinError {
    #[error(
        "Target is out of reach: planar distance {distance:.3} mm exceeds the \
         femur/tibia reach of {reach:.3} mm"
    )]
    Unreachable { distance: f64, reach: f64 },

    #[error(
        "Target is too close to the femur joint: planar distance {distance:.3} mm \
         is below the minimum reach of {min_reach:.3} mm"
    )]
    TooClose { distance: f64, min_reach: f64 },

    #[error("Target position is not a finite point: {0:?}")]
    NonFinite(Point3<f64>),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LegGeometry {
    /// Maximum planar distance the femur/tibia pair can reach.
    pub fn max_reach(&self) -> f64 {
        self.femur.length + self.tibia.length
    }

    /// Minimum planar distance the femur/tibia pair can fold down to.
    pub fn min_reach(&self) -> f64 {
        (self.femur.length - self.tibia.length).abs()
    }
}

impl From<JointAngles> for [f64; 3] {
    fn from(angles: JointAngles) -> Self {
        [angles.coxa_deg, angles.femur_deg, angles.tibia_deg]
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Compute the joint angles placing the foot tip of `geom` at `target`.
pub fn inverse(geom: &LegGeometry, target: &Point3<f64>) -> Result<JointAngles, KinError> {
    if !target.coords.iter().all(|c| c.is_finite()) {
        return Err(KinError::NonFinite(*target));
    }

    // Rotate into the coxa's canonical frame
    let local = yaw(geom.coxa.zero_rotation_deg.to_radians()) * target;

    let coxa_rad = local.z.atan2(local.x);

    // Project onto the sagittal plane and remove the coxa
    let sagittal = yaw(coxa_rad) * local;
    let x_planar = sagittal.x - geom.coxa.length;
    let y1 = local.y;

    let fi = y1.atan2(x_planar);
    let d = (x_planar * x_planar + y1 * y1).sqrt();

    if d > geom.max_reach() {
        return Err(KinError::Unreachable {
            distance: d,
            reach: geom.max_reach(),
        });
    }
    if d == 0.0 || d < geom.min_reach() {
        return Err(KinError::TooClose {
            distance: d,
            min_reach: geom.min_reach(),
        });
    }

    // Femur/tibia triangle
    let a = geom.tibia.length;
    let b = geom.femur.length;
    let c = d;

    // Rounding at full extension can push the cosines just past 1
    let alpha = clamp(&((b * b + c * c - a * a) / (2.0 * b * c)), &-1.0, &1.0).acos();
    let gamma = clamp(&((a * a + b * b - c * c) / (2.0 * a * b)), &-1.0, &1.0).acos();

    Ok(JointAngles {
        coxa_deg: coxa_rad.to_degrees(),
        femur_deg: geom.femur.zero_rotation_deg - alpha.to_degrees() - fi.to_degrees(),
        tibia_deg: gamma.to_degrees() - geom.tibia.zero_rotation_deg,
    })
}

/// Compute the foot tip position of `geom` for the given joint angles.
///
/// This is the exact inverse of [`inverse`] over the configurations it
/// produces, i.e. with the knee bent upwards.
pub fn forward(geom: &LegGeometry, angles: &JointAngles) -> Point3<f64> {
    // Femur direction in the sagittal plane
    let psi = (geom.femur.zero_rotation_deg - angles.femur_deg).to_radians();
    let knee_x = geom.femur.length * psi.cos();
    let knee_y = geom.femur.length * psi.sin();

    // Tibia direction, measured from the femur pointing back to the hip
    let tibia_dir = psi + PI + (angles.tibia_deg + geom.tibia.zero_rotation_deg).to_radians();
    let x_planar = knee_x + geom.tibia.length * tibia_dir.cos();
    let y = knee_y + geom.tibia.length * tibia_dir.sin();

    // Back through the coxa and the zero rotation
    let sagittal = Point3::new(x_planar + geom.coxa.length, y, 0.0);
    let yaw_rad = angles.coxa_deg.to_radians() + geom.coxa.zero_rotation_deg.to_radians();

    yaw(yaw_rad).inverse() * sagittal
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Rotation about the vertical (Y) axis.
fn yaw(angle_rad: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Vector3::y_axis(), angle_rad)
}

#[cfg(test)]
mod test {
    use super::*;

    fn geom(coxa_zero: f64, femur_zero: f64, tibia_zero: f64) -> LegGeometry {
        LegGeometry {
            coxa: Segment {
                length: 45.0,
                zero_rotation_deg: coxa_zero,
            },
            femur: Segment {
                length: 75.0,
                zero_rotation_deg: femur_zero,
            },
            tibia: Segment {
                length: 140.0,
                zero_rotation_deg: tibia_zero,
            },
        }
    }

    #[test]
    fn test_regression_point() {
        let angles = inverse(&geom(0.0, 0.0, 0.0), &Point3::new(100.0, -50.0, 0.0)).unwrap();

        assert!((angles.coxa_deg - 0.0).abs() < 1e-9);
        assert!((angles.femur_deg - -97.00379476992174).abs() < 1e-9);
        assert!((angles.tibia_deg - 20.265901931310975).abs() < 1e-9);
    }

    #[test]
    fn test_coxa_zero_rotation() {
        // A quarter turn of the coxa zero maps the regression point onto +Z
        let g = geom(90.0, 0.0, 0.0);
        let angles = inverse(&g, &Point3::new(0.0, -50.0, 100.0)).unwrap();

        assert!(angles.coxa_deg.abs() < 1e-9);
        assert!((angles.femur_deg - -97.00379476992174).abs() < 1e-9);
        assert!((angles.tibia_deg - 20.265901931310975).abs() < 1e-9);

        let p = forward(&g, &angles);
        assert!(p.x.abs() < 1e-9);
        assert!((p.y - -50.0).abs() < 1e-9);
        assert!((p.z - 100.0).abs() < 1e-9);

        // Coxa angle and zero rotation combine about the same axis
        let p = forward(
            &geom(45.0, 0.0, 0.0),
            &JointAngles {
                coxa_deg: 45.0,
                ..angles
            },
        );
        assert!(p.x.abs() < 1e-9);
        assert!((p.z - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_unreachable() {
        let g = geom(0.0, 0.0, 0.0);

        match inverse(&g, &Point3::new(500.0, 0.0, 0.0)) {
            Err(KinError::Unreachable { distance, reach }) => {
                assert!((distance - 455.0).abs() < 1e-9);
                assert_eq!(reach, 215.0);
            }
            r => panic!("Expected unreachable, got {:?}", r),
        }

        // Just past full extension
        let eps = 1e-6;
        assert!(inverse(&g, &Point3::new(45.0 + 215.0 + eps, 0.0, 0.0)).is_err());
    }

    #[test]
    fn test_too_close() {
        let g = geom(0.0, 0.0, 0.0);

        // On top of the femur joint
        match inverse(&g, &Point3::new(45.0, 0.0, 0.0)) {
            Err(KinError::TooClose { .. }) => (),
            r => panic!("Expected too close, got {:?}", r),
        }

        // Inside the fold limit of 65 mm
        match inverse(&g, &Point3::new(45.0 + 30.0, -30.0, 0.0)) {
            Err(KinError::TooClose { .. }) => (),
            r => panic!("Expected too close, got {:?}", r),
        }
    }

    #[test]
    fn test_non_finite() {
        let g = geom(0.0, 0.0, 0.0);
        assert!(matches!(
            inverse(&g, &Point3::new(std::f64::NAN, 0.0, 0.0)),
            Err(KinError::NonFinite(_))
        ));
    }

    #[test]
    fn test_forward_regression_point() {
        let g = geom(0.0, 0.0, 0.0);
        let p = forward(
            &g,
            &JointAngles {
                coxa_deg: 0.0,
                femur_deg: -97.00379476992174,
                tibia_deg: 20.265901931310975,
            },
        );

        assert!((p.x - 100.0).abs() < 1e-9);
        assert!((p.y - -50.0).abs() < 1e-9);
        assert!(p.z.abs() < 1e-9);
    }

    #[test]
    fn test_round_trip() {
        let geoms = [
            geom(0.0, 0.0, 0.0),
            geom(0.0, 10.0, -5.0),
            geom(135.0, 0.0, 0.0),
            geom(315.0, 10.0, -5.0),
        ];

        for g in geoms.iter() {
            for coxa_deg in [-40.0, 0.0, 35.0].iter() {
                for femur_deg in [-97.0, -60.0, -20.0].iter() {
                    for tibia_deg in [45.0, 90.0, 120.0].iter() {
                        let angles = JointAngles {
                            coxa_deg: *coxa_deg,
                            femur_deg: *femur_deg,
                            tibia_deg: *tibia_deg,
                        };
                        let target = forward(g, &angles);
                        let solved = inverse(g, &target).unwrap();

                        assert!(
                            (solved.coxa_deg - angles.coxa_deg).abs() < 0.01,
                            "{:?} -> {:?}",
                            angles,
                            solved
                        );
                        assert!((solved.femur_deg - angles.femur_deg).abs() < 0.01);
                        assert!((solved.tibia_deg - angles.tibia_deg).abs() < 0.01);
                    }
                }
            }
        }
    }
}
