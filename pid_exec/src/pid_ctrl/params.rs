//! PID control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use super::ParamsError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the steering and throttle controllers and the shaping applied to their outputs.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct Params {

    /// Steering controller proportional gain
    pub steer_k_p: f64,

    /// Steering controller integral gain
    pub steer_k_i: f64,

    /// Steering controller derivative gain
    pub steer_k_d: f64,

    /// Throttle controller proportional gain
    pub throt_k_p: f64,

    /// Throttle controller integral gain.
    ///
    /// The throttle law only uses the P and D terms, so this gain has no effect on the output.
    pub throt_k_i: f64,

    /// Throttle controller derivative gain
    pub throt_k_d: f64,

    /// Magnitude limit on the steering demand
    pub max_steer: f64,

    /// Magnitude limit on the shaped throttle error
    pub max_throt: f64,

    /// Below this speed (absolute) the throttle is forced to `recovery_throt`
    pub recovery_speed_threshold: f64,

    /// Throttle error used while recovering from low speed
    pub recovery_throt: f64,

    /// Baseline throttle, the shaped throttle error is subtracted from this
    pub throt_bias: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            steer_k_p: -0.1,
            steer_k_i: -0.00015,
            steer_k_d: -1.0,
            throt_k_p: 0.15,
            throt_k_i: 0.0,
            throt_k_d: 0.6,
            max_steer: 0.5,
            max_throt: 0.6,
            recovery_speed_threshold: 12.0,
            recovery_throt: -6.0,
            throt_bias: 0.4
        }
    }
}

impl Params {
    /// Check that the parameters can be used by the controllers.
    ///
    /// Saturation limits must be finite and non-negative, the remaining shaping values must be
    /// finite. Gains are not checked.
    pub fn validate(&self) -> Result<(), ParamsError> {
        for &(name, value) in [
            ("max_steer", self.max_steer),
            ("max_throt", self.max_throt)
        ].iter() {
            if !value.is_finite() || value < 0.0 {
                return Err(ParamsError::InvalidLimit(name, value))
            }
        }

        for &(name, value) in [
            ("recovery_speed_threshold", self.recovery_speed_threshold),
            ("recovery_throt", self.recovery_throt),
            ("throt_bias", self.throt_bias)
        ].iter() {
            if !value.is_finite() {
                return Err(ParamsError::NotFinite(name, value))
            }
        }

        Ok(())
    }
}
