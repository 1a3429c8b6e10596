//! # PID control module
//!
//! PID control keeps the vehicle in the centre of the lane. It does this using a pair of PID
//! controllers fed with the cross track error reported by the simulator.
//!
//! The steering controller acts on the signed cross track error and its output, saturated to
//! `max_steer`, is the steering demand. The throttle controller acts on the magnitude of the
//! cross track error, and only its P and D terms are used: the further off the centre line the
//! vehicle is, and the faster that distance is changing, the more throttle is taken off the
//! baseline `throt_bias`.
//!
//! When the vehicle is (nearly) stopped the throttle is overridden with a fixed recovery value so
//! the loop can't stall.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod controller;
mod params;
mod policy;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use controller::*;
pub use params::*;
pub use policy::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during PidCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum PidCtrlError {
    #[error("PidCtrl has not been initialised")]
    NotInitialised,

    #[error("Invalid parameters: {0}")]
    InvalidParams(#[from] ParamsError),

    #[error("Archive error: {0}")]
    ArchiveError(#[from] util::archive::ArchiveError)
}

/// Problems found when validating the parameters.
#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("Limit `{0}` must be finite and non-negative, found {1}")]
    InvalidLimit(&'static str, f64),

    #[error("Parameter `{0}` must be finite, found {1}")]
    NotFinite(&'static str, f64)
}
