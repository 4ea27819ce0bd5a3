//! # Leg Servo Demands
//!
//! Joint identification and the per-frame angle demands handed from the motion core to the servo
//! driver. Conversion of angles into pulse widths and calibration trims belong to the driver.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt::{self, Display};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of legs on the robot.
pub const NUM_LEGS: usize = 6;

/// Number of joints on each leg.
pub const NUM_JOINTS_PER_LEG: usize = 3;

/// Total number of servo driven joints.
pub const NUM_JOINTS: usize = NUM_LEGS * NUM_JOINTS_PER_LEG;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A joint of a leg, proximal to distal.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum Joint {
    Coxa = 0,
    Femur = 1,
    Tibia = 2,
}

/// Errors raised when building joint identifiers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JointIdError {
    #[error("Joint index {0} is out of range (0..{})", NUM_JOINTS)]
    InvalidJointIndex(usize),

    #[error("Leg index {0} is out of range (0..{})", NUM_LEGS)]
    InvalidLegIndex(usize),
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Identifies one of the robot's joints.
///
/// Only built through [`JointId::new`] or `TryFrom<usize>`, so the leg index is always in range.
#[derive(Serialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub struct JointId {
    leg: usize,
    joint: Joint,
}

/// Angle demands for every joint, produced once per computed frame.
///
/// A `None` entry means no new demand for that joint (for example because the leg's target was
/// unreachable), so the driver shall keep the angle it currently holds.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct ServoDems {
    /// Demanded joint angles in degrees, indexed by `JointId::index`.
    pub pos_deg: [Option<f64>; NUM_JOINTS],
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// The actuator side of the interface.
pub trait ServoDriver {
    /// Command a joint to move to the given angle.
    fn move_joint(&mut self, joint: JointId, angle_deg: f64);
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl Joint {
    /// All joints of a leg, in driver order.
    pub const ALL: [Joint; NUM_JOINTS_PER_LEG] = [Joint::Coxa, Joint::Femur, Joint::Tibia];
}

impl Display for Joint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Joint::Coxa => f.write_str("coxa"),
            Joint::Femur => f.write_str("femur"),
            Joint::Tibia => f.write_str("tibia"),
        }
    }
}

impl JointId {
    /// Build a joint identifier, checking the leg index.
    pub fn new(leg: usize, joint: Joint) -> Result<Self, JointIdError> {
        if leg >= NUM_LEGS {
            return Err(JointIdError::InvalidLegIndex(leg));
        }
        Ok(Self { leg, joint })
    }

    pub fn leg(&self) -> usize {
        self.leg
    }

    pub fn joint(&self) -> Joint {
        self.joint
    }

    /// Flat index of the joint, `leg * 3 + joint`.
    pub fn index(&self) -> usize {
        self.leg * NUM_JOINTS_PER_LEG + self.joint as usize
    }
}

impl TryFrom<usize> for JointId {
    type Error = JointIdError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        if index >= NUM_JOINTS {
            return Err(JointIdError::InvalidJointIndex(index));
        }

        Ok(Self {
            leg: index / NUM_JOINTS_PER_LEG,
            joint: Joint::ALL[index % NUM_JOINTS_PER_LEG],
        })
    }
}

impl Display for JointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "leg {} {}", self.leg, self.joint)
    }
}

impl ServoDems {
    /// Set the demands for all three joints of a leg.
    pub fn set_leg(
        &mut self,
        leg: usize,
        angles_deg: [f64; NUM_JOINTS_PER_LEG],
    ) -> Result<(), JointIdError> {
        for (joint, angle) in Joint::ALL.iter().zip(angles_deg.iter()) {
            let id = JointId::new(leg, *joint)?;
            self.pos_deg[id.index()] = Some(*angle);
        }

        Ok(())
    }

    /// Get the demand for a single joint.
    pub fn get(&self, joint: JointId) -> Option<f64> {
        self.pos_deg[joint.index()]
    }

    /// Number of joints with a demand.
    pub fn num_demands(&self) -> usize {
        self.pos_deg.iter().filter(|d| d.is_some()).count()
    }

    /// Hand every present demand to the driver, in joint index order.
    pub fn apply<D: ServoDriver>(&self, driver: &mut D) {
        for (index, dem) in self.pos_deg.iter().enumerate() {
            if let Some(angle_deg) = dem {
                let joint = JointId {
                    leg: index / NUM_JOINTS_PER_LEG,
                    joint: Joint::ALL[index % NUM_JOINTS_PER_LEG],
                };
                driver.move_joint(joint, *angle_deg);
            }
        }
    }
}
