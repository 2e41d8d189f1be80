//! PID controller for the heater duty loop.
//!
//! - Uses `f64` math
//! - Caller supplies the tracking error and `dt` seconds to `update`
//! - Output clamped to configured limits (default 0..100, heater duty in %)
//!
//! Example
//! ```
//! use oven_simulator::pid::PidController;
//!
//! let mut pid = PidController::new(2.0, 0.5, 0.1);
//! let power = pid.update(180.0 - 25.0, 1.0); // error, dt seconds
//! assert_eq!(power, 100.0);
//! ```

#[derive(Debug, Clone)]
pub struct PidController {
    // Gains
    kp: f64,
    ki: f64,
    kd: f64,

    // Output limits
    out_min: f64,
    out_max: f64,

    // State
    integral_error: f64,
    previous_error: f64,
}

impl PidController {
    /// Create a new PID controller with given gains.
    /// Defaults: output limits [0,100], zeroed integral and derivative state.
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            out_min: 0.0,
            out_max: 100.0,
            integral_error: 0.0,
            previous_error: 0.0,
        }
    }

    /// Builder: set output limits.
    pub fn with_output_limits(mut self, min: f64, max: f64) -> Self {
        self.set_output_limits(min, max);
        self
    }

    /// Set output limits, swapping them if given in reverse order.
    pub fn set_output_limits(&mut self, min: f64, max: f64) {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        self.out_min = min;
        self.out_max = max;
    }

    /// Reset internal state (integral accumulator and previous error).
    pub fn reset(&mut self) {
        self.integral_error = 0.0;
        self.previous_error = 0.0;
    }

    /// Run one PID compute step.
    /// - `error`: setpoint minus measurement.
    /// - `dt_s`: time since last update in seconds (must be > 0).
    /// Returns the clamped control output.
    pub fn update(&mut self, error: f64, dt_s: f64) -> f64 {
        debug_assert!(dt_s > 0.0 && dt_s.is_finite());

        self.integral_error += error * dt_s;
        let derivative_error = (error - self.previous_error) / dt_s;
        self.previous_error = error;

        let output =
            self.kp * error + self.ki * self.integral_error + self.kd * derivative_error;
        output.clamp(self.out_min, self.out_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proportional_only() {
        let mut pid = PidController::new(2.0, 0.0, 0.0);
        assert_eq!(pid.update(10.0, 1.0), 20.0);
        assert_eq!(pid.update(-3.0, 1.0), 0.0); // clamped at the lower limit
    }

    #[test]
    fn output_clamped_to_limits() {
        let mut pid = PidController::new(1.0, 0.0, 0.0);
        assert_eq!(pid.update(1e6, 1.0), 100.0);
        assert_eq!(pid.update(-1e6, 1.0), 0.0);
    }

    #[test]
    fn custom_limits_allow_negative_output() {
        let mut pid = PidController::new(1.0, 0.0, 0.0).with_output_limits(-50.0, 50.0);
        assert_eq!(pid.update(-10.0, 1.0), -10.0);
    }

    #[test]
    fn reversed_limits_are_swapped() {
        let mut pid = PidController::new(1.0, 0.0, 0.0).with_output_limits(50.0, -50.0);
        assert_eq!(pid.update(-10.0, 1.0), -10.0);
    }

    #[test]
    fn integral_accumulates_error_times_dt() {
        let mut pid = PidController::new(0.0, 1.0, 0.0);
        assert_eq!(pid.update(2.0, 1.0), 2.0);
        assert_eq!(pid.update(2.0, 1.0), 4.0);
        assert_eq!(pid.update(2.0, 0.5), 5.0);
    }

    #[test]
    fn derivative_acts_on_error_change() {
        let mut pid = PidController::new(0.0, 0.0, 1.0);
        assert_eq!(pid.update(3.0, 1.0), 3.0); // (3 - 0) / 1
        assert_eq!(pid.update(3.0, 1.0), 0.0); // unchanged error
    }

    #[test]
    fn reset_clears_state() {
        let mut pid = PidController::new(0.0, 1.0, 1.0);
        pid.update(5.0, 1.0);
        pid.update(7.0, 1.0);
        pid.reset();
        assert_eq!(pid.update(0.0, 1.0), 0.0);
    }
}
