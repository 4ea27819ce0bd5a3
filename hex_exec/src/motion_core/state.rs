//! Implementations for the MotionCore state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use comms_if::eqpt::servo::{ServoDems, ServoDriver, NUM_LEGS};
use log::{debug, error, info, trace, warn};
use nalgebra::Point3;
use serde::Serialize;
use std::path::PathBuf;

// Internal
use super::{
    ConfigError, InitError, MotionConfig, MotionCoreError, Params, TimeValue, MTIME_SCALE,
};
use crate::{
    leg_kin::{self, JointAngles, LegGeometry},
    traj_gen::ShapeConfig,
};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Motion core module state
#[derive(Default)]
pub struct MotionCore {
    pub(crate) params: Params,

    pub(crate) state: CoreState,

    /// Set once the module hits an unrecoverable error, after which no
    /// processing is performed.
    pub(crate) disabled: bool,

    pub(crate) legs: [LegState; NUM_LEGS],
    arch_legs: Archiver,

    pub(crate) motion_config: MotionConfig,

    /// Steering parameters in use.
    pub(crate) current_shape: ShapeConfig,

    /// Steering parameters staged for the next update point.
    pub(crate) next_shape: ShapeConfig,

    /// False until a motion has been started since the last reset, the next
    /// `start_motion` then activates the staged shape immediately.
    pub(crate) shape_initialised: bool,

    /// Last observed value of the frame counter.
    pub(crate) prev_frame_value: Option<u64>,

    pub(crate) report: StatusReport,
    arch_report: Archiver,
}

/// Per leg state owned by the motion core.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LegState {
    /// Current foot position.
    pub position: Point3<f64>,

    pub geometry: LegGeometry,

    /// Joint angles last computed for `position`.
    pub angles: JointAngles,
}

/// Initialisation data for the motion core.
#[derive(Clone, Debug)]
pub struct InitData {
    /// Path of the parameter file, relative to the params directory unless
    /// absolute.
    pub params_path: PathBuf,

    /// Foot positions the legs are commanded to at startup.
    pub start_positions: [Point3<f64>; NUM_LEGS],
}

/// Input data to the motion core.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputData {
    /// Current value of the hardware frame counter.
    pub frame: u64,
}

/// States of the motion scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CoreState {
    Uninitialized,
    Sync,
    Calc,
    TimeShift,
}

/// Status report for motion core processing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StatusReport {
    /// State of the scheduler after processing.
    pub state: CoreState,

    /// The frame counter advanced by more than one since the last
    /// observation, i.e. the previous cycle overran its frame.
    pub sync_error: bool,

    /// Number of frames skipped when `sync_error` is set.
    pub skipped_frames: u64,

    /// Legs whose target could not be reached this cycle. Their angles were
    /// held at the previous value.
    pub unreachable: [bool; NUM_LEGS],

    /// The arc trajectory could not be computed this cycle and the arc legs
    /// held their positions.
    pub degenerate_trajectory: bool,

    /// The active motion has reached its stop time.
    pub motion_complete: bool,
}

/// Flattened status report record for the archive.
#[derive(Serialize)]
struct ReportRecord {
    state: CoreState,
    sync_error: bool,
    skipped_frames: u64,
    num_unreachable: usize,
    degenerate_trajectory: bool,
    motion_complete: bool,
    motion_time: TimeValue,
    curvature: i32,
    step_length: i32,
}

/// Archive record of a single leg.
#[derive(Serialize)]
struct LegRecord {
    motion_time: TimeValue,
    leg: usize,
    x_mm: f64,
    y_mm: f64,
    z_mm: f64,
    coxa_deg: f64,
    femur_deg: f64,
    tibia_deg: f64,
    unreachable: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for CoreState {
    fn default() -> Self {
        CoreState::Uninitialized
    }
}

impl Default for LegState {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            geometry: LegGeometry::default(),
            angles: JointAngles::default(),
        }
    }
}

impl State for MotionCore {
    type InitData = InitData;
    type InitError = InitError;

    type InputData = InputData;
    type OutputData = Option<ServoDems>;
    type StatusReport = StatusReport;
    type ProcError = MotionCoreError;

    /// Initialise the motion core.
    ///
    /// Loads the leg configuration and solves the start pose. Any failure
    /// disables the module for the rest of the session.
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        let params = match params::load(&init_data.params_path) {
            Ok(p) => p,
            Err(e) => {
                error!("Cannot load MotionCore parameters: {}", e);
                self.disable();
                return Err(InitError::ParamLoadError(e));
            }
        };

        self.configure(params, &init_data.start_positions)
            .map_err(InitError::ConfigError)?;

        if let Err(e) = self.init_archives(session) {
            error!("Cannot set up MotionCore archives: {}", e);
            self.disable();
            return Err(e);
        }

        Ok(())
    }

    /// Perform one step of the scheduler cycle.
    ///
    /// The output holds the servo demands when this call computed a new
    /// set of joint angles.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        if self.disabled {
            return Err(MotionCoreError::ModuleDisabled);
        }

        // Clear the status report
        self.report = StatusReport::default();

        let mut output = None;

        match self.state {
            CoreState::Sync => self.sync(input_data.frame),
            CoreState::Calc => {
                if self.motion_config.is_complete() {
                    self.state = CoreState::Sync;
                } else {
                    output = Some(self.calc());
                    self.state = CoreState::TimeShift;
                }
            }
            CoreState::TimeShift => {
                self.time_shift();
                self.state = CoreState::Sync;
            }
            CoreState::Uninitialized => {
                error!("MotionCore processed before successful initialisation, disabling");
                self.disable();
                return Err(MotionCoreError::InvalidState(CoreState::Uninitialized));
            }
        }

        self.report.state = self.state;
        self.report.motion_complete = self.motion_config.is_complete();

        if let Some(ref dems) = output {
            trace!("MotionCore output: {:?}", dems);
        }

        Ok((output, self.report))
    }
}

impl Archived for MotionCore {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_report.serialise(ReportRecord {
            state: self.report.state,
            sync_error: self.report.sync_error,
            skipped_frames: self.report.skipped_frames,
            num_unreachable: self.report.unreachable.iter().filter(|u| **u).count(),
            degenerate_trajectory: self.report.degenerate_trajectory,
            motion_complete: self.report.motion_complete,
            motion_time: self.motion_config.motion_time,
            curvature: self.current_shape.curvature,
            step_length: self.current_shape.step_length,
        })?;

        for (i, leg) in self.legs.iter().enumerate() {
            self.arch_legs.serialise(LegRecord {
                motion_time: self.motion_config.motion_time,
                leg: i,
                x_mm: leg.position.x,
                y_mm: leg.position.y,
                z_mm: leg.position.z,
                coxa_deg: leg.angles.coxa_deg,
                femur_deg: leg.angles.femur_deg,
                tibia_deg: leg.angles.tibia_deg,
                unreachable: self.report.unreachable[i],
            })?;
        }

        Ok(())
    }
}

impl MotionCore {
    /// Configure the legs from a set of parameters and move them to their
    /// start positions.
    ///
    /// On success the core is ready to synchronise. On failure the module is
    /// disabled, and a disabled module cannot be configured again.
    pub fn configure(
        &mut self,
        params: Params,
        start_positions: &[Point3<f64>; NUM_LEGS],
    ) -> Result<(), ConfigError> {
        if self.disabled {
            return Err(ConfigError::ModuleDisabled);
        }

        let geometry = match params.geometry() {
            Ok(g) => g,
            Err(e) => {
                error!("Invalid leg configuration: {}", e);
                self.disable();
                return Err(e);
            }
        };

        let mut legs = [LegState::default(); NUM_LEGS];

        for (leg, (geom, start)) in geometry.iter().zip(start_positions.iter()).enumerate() {
            let angles = match leg_kin::inverse(geom, start) {
                Ok(a) => a,
                Err(err) => {
                    error!("Start position of leg {} is unreachable: {}", leg, err);
                    self.disable();
                    return Err(ConfigError::UnreachableStartPose { leg, err });
                }
            };

            legs[leg] = LegState {
                position: *start,
                geometry: *geom,
                angles,
            };
        }

        info!("MotionCore configured");
        info!(
            "    Lengths (mm): coxa {}, femur {}, tibia {}",
            geometry[0].coxa.length, geometry[0].femur.length, geometry[0].tibia.length
        );
        info!(
            "    Coxa zero rotations (deg): {:?}",
            params.coxa_zero_rotate_deg
        );
        info!(
            "    Femur/tibia zero rotations (deg): {}/{}",
            params.femur_zero_rotate_deg, params.tibia_zero_rotate_deg
        );

        self.legs = legs;
        self.params = params;
        self.state = CoreState::Sync;

        Ok(())
    }

    /// Install a new motion, replacing any motion in progress.
    ///
    /// Legs flagged for capture start from their live position.
    pub fn start_motion(&mut self, config: MotionConfig) {
        self.motion_config = config;

        for (i, leg) in self.legs.iter().enumerate() {
            if config.capture_start[i] {
                self.motion_config.start_positions[i] = leg.position;
            }
        }

        if !self.shape_initialised {
            self.current_shape = self.next_shape;
            self.shape_initialised = true;
        }

        debug!(
            "MotionCore started motion: time {} -> {} by {}, update {:?}",
            config.motion_time, config.time_stop, config.time_step, config.time_update
        );
    }

    /// Return the active steering parameters to neutral.
    ///
    /// The staged parameters are activated at the start of the next motion.
    pub fn reset_trajectory_config(&mut self) {
        self.current_shape = ShapeConfig::NEUTRAL;
        self.shape_initialised = false;
    }

    /// Stage new steering parameters.
    pub fn update_trajectory_config(&mut self, curvature: i32, step_length: i32) {
        self.next_shape = ShapeConfig {
            curvature,
            step_length,
        };
    }

    pub fn is_motion_complete(&self) -> bool {
        self.motion_config.is_complete()
    }

    /// Process one scheduler step and hand any new demands to `driver`.
    pub fn process<D: ServoDriver>(
        &mut self,
        frame: u64,
        driver: &mut D,
    ) -> Result<StatusReport, MotionCoreError> {
        let (output, report) = self.proc(&InputData { frame })?;

        if let Some(dems) = output {
            dems.apply(driver);
        }

        Ok(report)
    }

    /// Demands holding every joint at its current angle.
    pub fn current_dems(&self) -> ServoDems {
        let mut dems = ServoDems::default();

        for (i, leg) in self.legs.iter().enumerate() {
            if let Err(e) = dems.set_leg(i, leg.angles.into()) {
                error!("Cannot set the demands of leg {}: {}", i, e);
            }
        }

        dems
    }

    pub fn state(&self) -> CoreState {
        self.state
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn leg_positions(&self) -> [Point3<f64>; NUM_LEGS] {
        let mut positions = [Point3::origin(); NUM_LEGS];
        for (p, leg) in positions.iter_mut().zip(self.legs.iter()) {
            *p = leg.position;
        }
        positions
    }

    pub fn leg_angles(&self) -> [JointAngles; NUM_LEGS] {
        let mut angles = [JointAngles::default(); NUM_LEGS];
        for (a, leg) in angles.iter_mut().zip(self.legs.iter()) {
            *a = leg.angles;
        }
        angles
    }

    pub fn current_shape(&self) -> ShapeConfig {
        self.current_shape
    }

    /// Create the leg and status report archives in the session.
    fn init_archives(&mut self, session: &Session) -> Result<(), InitError> {
        let arch_path = session.arch_root.join("motion_core");
        std::fs::create_dir_all(arch_path).map_err(InitError::ArchDirError)?;

        self.arch_legs = Archiver::from_path(session, "motion_core/legs.csv")
            .map_err(InitError::ArchiveError)?;
        self.arch_report = Archiver::from_path(session, "motion_core/status_report.csv")
            .map_err(InitError::ArchiveError)?;

        Ok(())
    }

    /// Wait for the frame counter to change.
    fn sync(&mut self, frame: u64) {
        if self.prev_frame_value == Some(frame) {
            return;
        }

        if let Some(prev) = self.prev_frame_value {
            let advance = frame.wrapping_sub(prev);

            if advance > 1 {
                self.report.sync_error = true;
                self.report.skipped_frames = advance - 1;
                warn!(
                    "MotionCore synchronisation error: frame {} -> {}, {} frame(s) skipped",
                    prev,
                    frame,
                    advance - 1
                );
            }
        }

        self.prev_frame_value = Some(frame);
        self.state = CoreState::Calc;
    }

    /// Advance the motion time, swapping in the staged shape at the update
    /// point.
    fn time_shift(&mut self) {
        let config = &mut self.motion_config;
        config.motion_time = config.motion_time.saturating_add(config.time_step);

        if config.time_update == Some(config.motion_time) {
            self.current_shape = self.next_shape;
            debug!(
                "MotionCore shape updated at time {}: {:?}",
                config.motion_time, self.current_shape
            );
        }
    }

    /// Normalised motion time in `[0, 1]`.
    pub(crate) fn scaled_motion_time(&self) -> f64 {
        self.motion_config.motion_time as f64 / MTIME_SCALE as f64
    }

    fn disable(&mut self) {
        self.disabled = true;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::motion_core::MTIME_MAX;
    use comms_if::eqpt::servo::{Joint, JointId};
    use std::fs;

    const STANCE: [Point3<f64>; NUM_LEGS] = [
        Point3::new(-115.0, -85.0, 70.0),
        Point3::new(-135.0, -85.0, 0.0),
        Point3::new(-115.0, -85.0, -70.0),
        Point3::new(115.0, -85.0, 70.0),
        Point3::new(135.0, -85.0, 0.0),
        Point3::new(115.0, -85.0, -70.0),
    ];

    fn shipped_params() -> PathBuf {
        PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../params/motion_core.toml"))
    }

    #[test]
    fn test_init_from_shipped_params() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new_in(dir.path().to_path_buf(), "motion_core_test").unwrap();

        let mut core = MotionCore::default();
        core.init(
            InitData {
                params_path: shipped_params(),
                start_positions: STANCE,
            },
            &session,
        )
        .unwrap();

        assert_eq!(core.state(), CoreState::Sync);
        assert_eq!(core.leg_positions(), STANCE);

        // The start pose is available as the first set of demands
        let dems = core.current_dems();
        assert_eq!(dems.num_demands(), 3 * NUM_LEGS);
        for (leg, angles) in core.leg_angles().iter().enumerate() {
            let get = |joint| dems.get(JointId::new(leg, joint).unwrap());
            assert_eq!(get(Joint::Coxa), Some(angles.coxa_deg));
            assert_eq!(get(Joint::Femur), Some(angles.femur_deg));
            assert_eq!(get(Joint::Tibia), Some(angles.tibia_deg));
        }

        let legs_path = session.arch_root.join("motion_core/legs.csv");
        let report_path = session.arch_root.join("motion_core/status_report.csv");
        assert!(legs_path.exists());
        assert!(report_path.exists());

        // Compute one frame of a motion and archive it
        core.start_motion(MotionConfig {
            dest_positions: STANCE,
            time_step: 50,
            time_stop: MTIME_MAX,
            capture_start: [true; NUM_LEGS],
            ..MotionConfig::default()
        });
        let (dems, _) = core.proc(&InputData { frame: 0 }).unwrap();
        assert!(dems.is_none());
        let (dems, report) = core.proc(&InputData { frame: 0 }).unwrap();
        assert!(dems.is_some());
        assert_eq!(report.state, CoreState::TimeShift);
        core.write().unwrap();

        let legs = fs::read_to_string(&legs_path).unwrap();
        let lines: Vec<&str> = legs.lines().collect();
        assert_eq!(
            lines[0],
            "motion_time,leg,x_mm,y_mm,z_mm,coxa_deg,femur_deg,tibia_deg,unreachable"
        );
        assert_eq!(lines.len(), 1 + NUM_LEGS);
        for (leg, line) in lines[1..].iter().enumerate() {
            assert!(line.starts_with(&format!("0,{},", leg)));
            assert!(line.ends_with(",false"));
        }

        let report = fs::read_to_string(&report_path).unwrap();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(
            lines[0],
            "state,sync_error,skipped_frames,num_unreachable,degenerate_trajectory,\
             motion_complete,motion_time,curvature,step_length"
        );
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("TimeShift,false,0,0,false,false,0,"));
    }

    #[test]
    fn test_missing_params_disables() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new_in(dir.path().to_path_buf(), "motion_core_test").unwrap();

        let mut core = MotionCore::default();
        match core.init(
            InitData {
                params_path: dir.path().join("missing.toml"),
                start_positions: STANCE,
            },
            &session,
        ) {
            Err(InitError::ParamLoadError(_)) => (),
            r => panic!("Expected a parameter load error, got {:?}", r),
        }

        assert!(core.is_disabled());
        assert_eq!(
            core.proc(&InputData { frame: 0 }),
            Err(MotionCoreError::ModuleDisabled)
        );
    }

    #[test]
    fn test_archive_failure_disables() {
        let dir = tempfile::tempdir().unwrap();

        // Archive root is a regular file, so no directory can be made in it
        let blocker = dir.path().join("arch");
        fs::write(&blocker, "").unwrap();
        let session = Session {
            session_root: dir.path().to_path_buf(),
            arch_root: blocker,
            log_file_path: dir.path().join("log.log"),
        };

        let mut core = MotionCore::default();
        match core.init(
            InitData {
                params_path: shipped_params(),
                start_positions: STANCE,
            },
            &session,
        ) {
            Err(InitError::ArchDirError(_)) => (),
            r => panic!("Expected an archive directory error, got {:?}", r),
        }

        assert!(core.is_disabled());
        assert_eq!(
            core.proc(&InputData { frame: 0 }),
            Err(MotionCoreError::ModuleDisabled)
        );
    }
}
