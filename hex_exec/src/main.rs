//! Main hexapod executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the motion core and move the legs to the start pose
//!     - Start the frame timer
//!     - Main loop:
//!         - Motion core processing, synchronised to the frame counter
//!         - Forwarding of new demands to the servo driver
//!         - Telemetry archiving
//!         - Feeding the next step of the gait once a motion completes
//!
//! The frame timer stands in for the hardware timer: it increments a shared counter once per
//! frame period, which the motion core only ever observes.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{info, trace, warn};
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};
use std::thread;
use std::time::{Duration, Instant};

// Internal
use comms_if::eqpt::servo::{JointId, ServoDriver};
use hex_lib::{
    motion_core::{CoreState, InitData, InputData, MotionCore},
    params::HexExecParams,
    player::SequencePlayer,
};
use util::{
    archive::Archived,
    logger::{self, logger_init},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of main loop cycles per frame period.
const CYCLES_PER_FRAME: f64 = 4.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Servo driver which logs the demands it receives.
#[derive(Default)]
struct LogServoDriver {
    num_moves: u64,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    color_eyre::install()?;

    // Initialise session
    let session = Session::new("hex_exec", "sessions").wrap_err("Failed to create the session")?;

    // ---- LOAD PARAMETERS ----

    let exec_params: HexExecParams =
        util::params::load("hex_exec.toml").wrap_err("Could not load exec params")?;

    // Initialise logger
    logger_init(&exec_params.log, &session).wrap_err("Failed to initialise logging")?;

    info!("Hexapod Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    if !(exec_params.frame_period_s.is_finite() && exec_params.frame_period_s > 0.0) {
        return Err(eyre!(
            "Expected a positive frame period, found {}",
            exec_params.frame_period_s
        ));
    }

    info!("Exec parameters loaded");
    info!("    Gait: {}", exec_params.gait);
    info!("    External speed: {} %", exec_params.ext_speed_pct);
    info!(
        "    Curvature: {}, step length: {} mm",
        exec_params.curvature, exec_params.step_length
    );

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut driver = LogServoDriver::default();

    let mut motion_core = MotionCore::default();
    motion_core
        .init(
            InitData {
                params_path: "motion_core.toml".into(),
                start_positions: exec_params.start_positions_mm,
            },
            &session,
        )
        .wrap_err("Failed to initialise MotionCore")?;

    // Command the start pose
    motion_core.current_dems().apply(&mut driver);
    info!("MotionCore init complete");

    let mut player = SequencePlayer::new(
        exec_params.gait,
        exec_params.num_loops,
        exec_params.ext_speed_pct,
        exec_params.max_time_step,
    );

    motion_core.update_trajectory_config(exec_params.curvature, exec_params.step_length);

    match player.next_config() {
        Some(c) => motion_core.start_motion(c),
        None => return Err(eyre!("Gait {} has no motion steps", exec_params.gait)),
    }

    info!("Module initialisation complete\n");

    // ---- START FRAME TIMER ----

    let frame_period = Duration::from_secs_f64(exec_params.frame_period_s);
    let frame_counter = Arc::new(AtomicU64::new(0));
    let timer_running = Arc::new(AtomicBool::new(true));

    let timer_handle = {
        let counter = frame_counter.clone();
        let running = timer_running.clone();

        thread::spawn(move || {
            let mut next_frame = Instant::now() + frame_period;

            while running.load(Ordering::Relaxed) {
                if let Some(d) = next_frame.checked_duration_since(Instant::now()) {
                    thread::sleep(d);
                }
                counter.fetch_add(1, Ordering::Relaxed);
                next_frame += frame_period;
            }
        })
    };

    info!("Frame timer started, period {:.03} s", exec_params.frame_period_s);

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let cycle_period_s = exec_params.frame_period_s / CYCLES_PER_FRAME;
    let mut num_cycles: u64 = 0;

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- MOTION CORE PROCESSING ----

        let input = InputData {
            frame: frame_counter.load(Ordering::Relaxed),
        };
        logger::set_frame(input.frame);

        // Step the scheduler until it is waiting on the next frame again
        loop {
            let (output, report) = motion_core
                .proc(&input)
                .wrap_err("Error during MotionCore processing")?;

            if let Some(dems) = output {
                dems.apply(&mut driver);

                // ---- WRITE ARCHIVES ----
                if let Err(e) = motion_core.write() {
                    warn!("Could not write MotionCore archives: {}", e);
                }
            }

            if report.state == CoreState::Sync {
                break;
            }
        }

        // ---- SEQUENCE PLAYBACK ----

        if motion_core.is_motion_complete() {
            match player.next_config() {
                Some(c) => motion_core.start_motion(c),
                None => {
                    info!("End of {} sequence reached, stopping", player.gait());
                    break;
                }
            }
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(cycle_period_s).checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s",
                cycle_dur.as_secs_f64() - cycle_period_s
            ),
        }

        num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    timer_running.store(false, Ordering::Relaxed);
    timer_handle
        .join()
        .map_err(|_| eyre!("The frame timer thread panicked"))?;

    info!(
        "Played {} frames in {} cycles, {} joint moves",
        frame_counter.load(Ordering::Relaxed),
        num_cycles,
        driver.num_moves
    );
    info!("End of execution");

    Ok(())
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ServoDriver for LogServoDriver {
    fn move_joint(&mut self, joint: JointId, angle_deg: f64) {
        trace!("Move {} to {:.03} deg", joint, angle_deg);
        self.num_moves += 1;
    }
}
