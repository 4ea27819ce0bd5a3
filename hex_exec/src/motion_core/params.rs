//! Parameters structure for the motion core

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::servo::{Joint, NUM_LEGS};
use serde::Deserialize;

use super::ConfigError;
use crate::leg_kin::{LegGeometry, Segment};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Value of an erased configuration cell.
pub const UNCONFIGURED: u16 = 0xFFFF;

/// Largest plausible magnitude of a zero rotation.
pub const MAX_ZERO_ROTATE_DEG: i16 = 360;

/// Default lift height of a swinging leg.
pub const DEFAULT_STEP_HEIGHT_MM: f64 = 30.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the motion core.
///
/// The lengths mirror the 16 bit cells of the configuration memory, a
/// missing length or one holding [`UNCONFIGURED`] marks unconfigured
/// hardware.
#[derive(Clone, Debug, Deserialize)]
pub struct Params {
    // ---- GEOMETRY ----
    /// Units: millimeters
    pub coxa_length_mm: Option<u16>,

    /// Units: millimeters
    pub femur_length_mm: Option<u16>,

    /// Units: millimeters
    pub tibia_length_mm: Option<u16>,

    // ---- CALIBRATION ----
    /// Zero rotation of each coxa, orienting the leg frame relative to the
    /// body.
    ///
    /// Units: degrees
    pub coxa_zero_rotate_deg: [i16; NUM_LEGS],

    /// Units: degrees
    pub femur_zero_rotate_deg: i16,

    /// Units: degrees
    pub tibia_zero_rotate_deg: i16,

    // ---- TRAJECTORY ----
    /// Lift height of legs following a sinusoidal arc.
    ///
    /// Units: millimeters
    #[serde(default = "default_step_height_mm")]
    pub step_height_mm: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            coxa_length_mm: None,
            femur_length_mm: None,
            tibia_length_mm: None,
            coxa_zero_rotate_deg: [0; NUM_LEGS],
            femur_zero_rotate_deg: 0,
            tibia_zero_rotate_deg: 0,
            step_height_mm: DEFAULT_STEP_HEIGHT_MM,
        }
    }
}

impl Params {
    /// Validate the parameters and build the geometry of every leg.
    pub fn geometry(&self) -> Result<[LegGeometry; NUM_LEGS], ConfigError> {
        let coxa_length = length(self.coxa_length_mm, Joint::Coxa)?;
        let femur_length = length(self.femur_length_mm, Joint::Femur)?;
        let tibia_length = length(self.tibia_length_mm, Joint::Tibia)?;

        let femur_zero = zero_rotation(self.femur_zero_rotate_deg, Joint::Femur, 0)?;
        let tibia_zero = zero_rotation(self.tibia_zero_rotate_deg, Joint::Tibia, 0)?;

        if !(self.step_height_mm.is_finite() && self.step_height_mm >= 0.0) {
            return Err(ConfigError::InvalidStepHeight(self.step_height_mm));
        }

        let mut geometry = [LegGeometry::default(); NUM_LEGS];

        for (leg, geom) in geometry.iter_mut().enumerate() {
            *geom = LegGeometry {
                coxa: Segment {
                    length: coxa_length,
                    zero_rotation_deg: zero_rotation(
                        self.coxa_zero_rotate_deg[leg],
                        Joint::Coxa,
                        leg,
                    )?,
                },
                femur: Segment {
                    length: femur_length,
                    zero_rotation_deg: femur_zero,
                },
                tibia: Segment {
                    length: tibia_length,
                    zero_rotation_deg: tibia_zero,
                },
            };
        }

        Ok(geometry)
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn default_step_height_mm() -> f64 {
    DEFAULT_STEP_HEIGHT_MM
}

fn length(cell: Option<u16>, joint: Joint) -> Result<f64, ConfigError> {
    match cell {
        Some(l) if l != UNCONFIGURED => Ok(l as f64),
        _ => Err(ConfigError::Unconfigured(joint)),
    }
}

fn zero_rotation(value: i16, joint: Joint, leg: usize) -> Result<f64, ConfigError> {
    // Widen first, i16::MIN has no positive counterpart
    if i32::from(value).abs() > i32::from(MAX_ZERO_ROTATE_DEG) {
        return Err(ConfigError::ZeroRotationOutOfRange { joint, leg, value });
    }

    Ok(value as f64)
}
