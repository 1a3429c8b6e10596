//! # PID controller
//!
//! A sample-based PID controller. Unlike a time-aware controller it has no notion of `dt`: the
//! derivative term is the difference between consecutive errors and the integral term is the
//! plain sum of all errors seen so far.

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller for a single control axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidController {
    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Derivative gain
    k_d: f64,

    /// Most recent error
    p_error: f64,

    /// Sum of all errors since initialisation.
    ///
    /// There is no anti-windup, the sum grows without bound under a sustained error.
    i_error: f64,

    /// Difference between the most recent error and the one before it
    d_error: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {

    /// Create a new controller with the given gains and zeroed error terms.
    pub fn new(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self {
            k_p, k_i, k_d,
            p_error: 0f64,
            i_error: 0f64,
            d_error: 0f64
        }
    }

    /// Set new gains and clear the error history.
    ///
    /// The controller is then indistinguishable from a new one built with the same gains.
    pub fn init(&mut self, k_p: f64, k_i: f64, k_d: f64) {
        *self = Self::new(k_p, k_i, k_d);
    }

    /// Update the error terms with a new error sample.
    ///
    /// The input isn't validated, non-finite errors propagate into all terms.
    pub fn update_error(&mut self, error: f64) {
        // Previous error is zero before the first update
        self.d_error = error - self.p_error;
        self.p_error = error;
        self.i_error += error;
    }

    /// The controller output, `k_p * p_error + k_i * i_error + k_d * d_error`.
    pub fn total_error(&self) -> f64 {
        self.p_term() + self.i_term() + self.d_term()
    }

    /// Weighted proportional term.
    pub fn p_term(&self) -> f64 {
        self.k_p * self.p_error
    }

    /// Weighted integral term.
    pub fn i_term(&self) -> f64 {
        self.k_i * self.i_error
    }

    /// Weighted derivative term.
    pub fn d_term(&self) -> f64 {
        self.k_d * self.d_error
    }

    pub fn k_p(&self) -> f64 {
        self.k_p
    }

    pub fn k_i(&self) -> f64 {
        self.k_i
    }

    pub fn k_d(&self) -> f64 {
        self.k_d
    }

    pub fn p_error(&self) -> f64 {
        self.p_error
    }

    pub fn i_error(&self) -> f64 {
        self.i_error
    }

    pub fn d_error(&self) -> f64 {
        self.d_error
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_update() {
        let mut pid = PidController::new(-0.1, -0.00015, -1.0);
        pid.update_error(0.5);

        assert_eq!(pid.p_error(), 0.5);
        assert_eq!(pid.i_error(), 0.5);
        assert_eq!(pid.d_error(), 0.5);

        let expected = -0.1 * 0.5 + -0.00015 * 0.5 + -1.0 * 0.5;
        assert_eq!(pid.total_error(), expected);
        assert!((pid.total_error() + 0.550075).abs() < 1e-12);
    }

    #[test]
    fn test_error_terms_track_samples() {
        let samples = [0.5, -1.25, 3.0, 0.0, -0.75, 2.5];
        let mut pid = PidController::new(1.0, 1.0, 1.0);

        let mut sum = 0f64;
        let mut prev = 0f64;
        for &e in samples.iter() {
            pid.update_error(e);
            sum += e;

            assert_eq!(pid.p_error(), e);
            assert_eq!(pid.i_error(), sum);
            assert_eq!(pid.d_error(), e - prev);

            prev = e;
        }
    }

    #[test]
    fn test_integral_has_no_windup_limit() {
        let mut pid = PidController::new(0.0, 1.0, 0.0);

        for _ in 0..10_000 {
            pid.update_error(10.0);
        }

        assert_eq!(pid.i_error(), 100_000.0);
        assert_eq!(pid.total_error(), 100_000.0);
    }

    #[test]
    fn test_total_error_is_pure() {
        let mut pid = PidController::new(0.3, 0.01, 2.0);
        pid.update_error(1.0);
        pid.update_error(-2.0);

        let before = pid;
        let first = pid.total_error();
        let second = pid.total_error();

        assert_eq!(first, second);
        assert_eq!(pid, before);
        assert_eq!(first, pid.p_term() + pid.i_term() + pid.d_term());
    }

    #[test]
    fn test_init_resets_history() {
        let mut pid = PidController::new(1.0, 2.0, 3.0);
        pid.update_error(4.0);
        pid.update_error(-1.0);

        pid.init(0.15, 0.0, 0.6);

        assert_eq!(pid, PidController::new(0.15, 0.0, 0.6));
        assert_eq!(pid.k_p(), 0.15);
        assert_eq!(pid.k_i(), 0.0);
        assert_eq!(pid.k_d(), 0.6);
        assert_eq!(pid.total_error(), 0.0);

        // Derivative is relative to zero again after a reset
        pid.update_error(2.0);
        assert_eq!(pid.d_error(), 2.0);
    }

    #[test]
    fn test_non_finite_errors_propagate() {
        let mut pid = PidController::new(1.0, 1.0, 1.0);
        pid.update_error(std::f64::NAN);

        assert!(pid.total_error().is_nan());
        assert!(pid.i_error().is_nan());
    }
}
