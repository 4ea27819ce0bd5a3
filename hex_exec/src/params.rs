//! # Hexapod Executable Parameters
//!
//! This module provides parameters for the hexapod executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use comms_if::eqpt::servo::NUM_LEGS;
use util::logger::LogParams;

use crate::{gait_catalog::Gait, motion_core::TimeValue};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HexExecParams {
    /// Logging levels
    pub log: LogParams,

    /// Period of the frame timer
    pub frame_period_s: f64,

    /// Gait to play
    pub gait: Gait,

    /// External speed multiplier, in percent
    pub ext_speed_pct: u32,

    /// Steering curvature, in thousandths
    pub curvature: i32,

    /// Step length, in millimeters
    pub step_length: i32,

    /// Number of passes through the gait's main body before finalizing
    pub num_loops: u32,

    /// Time step of a motion step played at 100 % speed
    pub max_time_step: TimeValue,

    /// Foot positions commanded at startup, in the leg frames
    pub start_positions_mm: [Point3<f64>; NUM_LEGS],
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_deserialise() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "frame_period_s = 0.02\n\
             gait = \"push_pull\"\n\
             ext_speed_pct = 80\n\
             curvature = 0\n\
             step_length = 40\n\
             num_loops = 3\n\
             max_time_step = 50\n\
             start_positions_mm = [\n"
        )
        .unwrap();
        for _ in 0..NUM_LEGS {
            writeln!(file, "    [115.0, -85.0, 70.0],").unwrap();
        }
        writeln!(file, "]\n[log]\nlevel = \"info\"").unwrap();

        let params: HexExecParams = util::params::load_from_path(file.path()).unwrap();
        assert_eq!(params.gait, Gait::PushPull);
        assert_eq!(params.num_loops, 3);
        assert_eq!(params.start_positions_mm[5], Point3::new(115.0, -85.0, 70.0));
        assert_eq!(params.log.level, util::logger::LevelFilter::Info);
    }

    #[test]
    fn test_shipped_params() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../params/hex_exec.toml");
        let params: HexExecParams = util::params::load(path).unwrap();

        assert_eq!(params.gait, Gait::Move);
        assert!(params.frame_period_s > 0.0);
        assert_eq!(params.start_positions_mm[1], Point3::new(-135.0, -85.0, 0.0));
        assert!(params.log.target_levels.contains_key("hex_exec"));
    }
}
