//! Cyclic module interface
//!
//! The executable's main loop drives every processing module through
//! [`State`]. Modules are cooperative: the loop polls them several times per
//! hardware frame and they must return straight away, keeping whatever
//! progress they need in their own state.
//!
//! A module which hits an unrecoverable error disables itself. From then on
//! neither `init` nor `proc` may bring it back, so the loop can treat any
//! error from a disabled module as final.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::session::Session;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A module polled by the main loop.
pub trait State {
    /// Configuration and start up data, consumed by `init`.
    type InitData;
    type InitError;

    /// What the loop observed this poll, e.g. the frame counter.
    type InputData;
    /// Data for downstream equipment, typically an `Option` as most polls
    /// produce nothing.
    type OutputData;
    /// Recoverable conditions of this poll, rebuilt on every call.
    type StatusReport;
    /// Unrecoverable errors, after which the module is disabled.
    type ProcError;

    /// Load the module's configuration and create its archives in the
    /// session's archive directory.
    ///
    /// A failed `init` leaves the module disabled.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>;

    /// Perform one non-blocking processing step.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
