//! # Control policy
//!
//! Turns telemetry samples into actuator commands using a steering and a throttle controller.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace, warn};
use serde::Serialize;

// Internal
use super::{Params, PidController};
use comms_if::sim::{CommandPair, TelemetrySample};
use util::maths::{deg_to_rad, saturate};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Range the simulator expects actuator commands to lie in.
pub const NOMINAL_CMD_RANGE: (f64, f64) = (-1.0, 1.0);

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The control policy, owning one controller per axis.
#[derive(Debug, Clone)]
pub struct ControlPolicy {
    params: Params,

    /// Controller acting on the signed cross track error
    steer_ctrl: PidController,

    /// Controller acting on the magnitude of the cross track error
    throt_ctrl: PidController,

    report: StatusReport
}

/// Breakdown of the processing of the latest sample.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    /// Cross track error of the sample
    pub cte: f64,

    /// Speed of the sample
    pub speed: f64,

    /// Steering angle reported by the vehicle, converted to radians
    pub reported_steer_rad: f64,

    /// Steering proportional term
    pub steer_p: f64,

    /// Steering integral term
    pub steer_i: f64,

    /// Steering derivative term
    pub steer_d: f64,

    /// Steering demand before saturation
    pub raw_steer: f64,

    /// Set if the steering demand was saturated
    pub steer_limited: bool,

    /// Throttle proportional term
    pub throt_p: f64,

    /// Throttle derivative term
    pub throt_d: f64,

    /// Throttle error before saturation
    pub raw_throt: f64,

    /// Set if the throttle error was saturated
    pub throt_limited: bool,

    /// Set if the low speed recovery override was applied
    pub recovery: bool,

    /// Steering command sent
    pub steering_angle: f64,

    /// Throttle command sent
    pub throttle: f64,

    /// Set if a command lies outside `NOMINAL_CMD_RANGE`
    pub cmd_out_of_range: bool
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ControlPolicy {

    /// Create a new policy with fresh controllers built from the parameters.
    pub fn new(params: Params) -> Self {
        Self {
            params,
            steer_ctrl: PidController::new(
                params.steer_k_p, params.steer_k_i, params.steer_k_d
            ),
            throt_ctrl: PidController::new(
                params.throt_k_p, params.throt_k_i, params.throt_k_d
            ),
            report: StatusReport::default()
        }
    }

    /// Process one telemetry sample and produce the commands to send back.
    ///
    /// Both controllers are updated exactly once per call.
    pub fn on_telemetry(&mut self, sample: &TelemetrySample) -> CommandPair {
        let was_recovering = self.report.recovery;
        let was_out_of_range = self.report.cmd_out_of_range;

        // Steering works on the signed error, throttle on how far off the centre we are
        self.steer_ctrl.update_error(sample.cte);
        self.throt_ctrl.update_error(sample.cte.abs());

        let raw_steer = self.steer_ctrl.total_error();

        // The throttle law ignores the integral term and takes magnitudes of the P and D errors
        let throt_p = self.throt_ctrl.k_p() * self.throt_ctrl.p_error().abs();
        let throt_d = self.throt_ctrl.k_d() * self.throt_ctrl.d_error().abs();
        let raw_throt = throt_p + throt_d;

        let (steer, steer_limited) = saturate(raw_steer, self.params.max_steer);
        let (mut throt, throt_limited) = saturate(raw_throt, self.params.max_throt);

        // Recovery overrides the saturated throttle whatever its value
        let recovery = sample.speed.abs() < self.params.recovery_speed_threshold;
        if recovery {
            throt = self.params.recovery_throt;
        }

        let cmd = CommandPair {
            steering_angle: steer,
            throttle: self.params.throt_bias - throt
        };

        let cmd_out_of_range = !in_nominal_range(cmd.steering_angle)
            || !in_nominal_range(cmd.throttle);

        if recovery && !was_recovering {
            info!(
                "Speed {:.3} below recovery threshold {:.3}, forcing throttle to {:.3}",
                sample.speed,
                self.params.recovery_speed_threshold,
                cmd.throttle
            );
        }
        else if !recovery && was_recovering {
            info!("Speed {:.3} recovered, resuming PID throttle", sample.speed);
        }

        // Only the first command of a run outside the nominal range is reported
        if cmd_out_of_range && !was_out_of_range {
            warn!(
                "Command (steer {:.3}, throttle {:.3}) outside nominal range [{}, {}]",
                cmd.steering_angle,
                cmd.throttle,
                NOMINAL_CMD_RANGE.0,
                NOMINAL_CMD_RANGE.1
            );
        }
        else if !cmd_out_of_range && was_out_of_range {
            info!("Commands back within nominal range");
        }

        self.report = StatusReport {
            cte: sample.cte,
            speed: sample.speed,
            reported_steer_rad: deg_to_rad(sample.steering_angle),
            steer_p: self.steer_ctrl.p_term(),
            steer_i: self.steer_ctrl.i_term(),
            steer_d: self.steer_ctrl.d_term(),
            raw_steer,
            steer_limited,
            throt_p,
            throt_d,
            raw_throt,
            throt_limited,
            recovery,
            steering_angle: cmd.steering_angle,
            throttle: cmd.throttle,
            cmd_out_of_range
        };

        trace!(
            "Steer P: {:.6} I: {:.6} D: {:.6} -> {:.6}{}",
            self.report.steer_p,
            self.report.steer_i,
            self.report.steer_d,
            raw_steer,
            if steer_limited { " (limited)" } else { "" }
        );
        trace!(
            "Throttle P: {:.6} D: {:.6} -> {:.6}{}{}",
            throt_p,
            throt_d,
            raw_throt,
            if throt_limited { " (limited)" } else { "" },
            if recovery { " (recovery)" } else { "" }
        );

        cmd
    }

    /// The parameters the policy was built with.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// The steering controller.
    pub fn steer_ctrl(&self) -> &PidController {
        &self.steer_ctrl
    }

    /// The throttle controller.
    pub fn throt_ctrl(&self) -> &PidController {
        &self.throt_ctrl
    }

    /// The report for the latest processed sample.
    pub fn report(&self) -> &StatusReport {
        &self.report
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

fn in_nominal_range(value: f64) -> bool {
    value >= NOMINAL_CMD_RANGE.0 && value <= NOMINAL_CMD_RANGE.1
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
