//! Setpoint ramp generation.
//!
//! The controller tracks a linear ramp from the initial oven temperature to
//! the final temperature at `heating_rate` degrees C per minute. Once the
//! final temperature is reached the target holds there exactly.

/// Time-ordered target temperature curve, `num_steps + 1` samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    /// Sample instants, seconds from the start of the run.
    pub time: Vec<f64>,
    /// Target temperature at each instant, degrees C.
    pub temperature: Vec<f64>,
}

impl Trajectory {
    /// Build the setpoint ramp for a full simulation horizon.
    ///
    /// Each step adds `heating_rate / 60 * dt` degrees. Ascending ramps
    /// (`final_temp >= initial_temp`) clamp from above, descending ramps
    /// clamp from below, so the target terminates at `final_temp` in both
    /// directions without overshoot.
    pub fn generate(
        initial_temp: f64,
        final_temp: f64,
        heating_rate: f64,
        num_steps: usize,
        dt: f64,
    ) -> Self {
        let increment = heating_rate / 60.0 * dt;

        let mut time = Vec::with_capacity(num_steps + 1);
        let mut temperature = Vec::with_capacity(num_steps + 1);
        let mut current = initial_temp;
        time.push(0.0);
        temperature.push(current);

        for step in 1..=num_steps {
            current = if final_temp >= initial_temp {
                (current + increment).min(final_temp)
            } else {
                (current + increment).max(final_temp)
            };
            time.push(step as f64 * dt);
            temperature.push(current);
        }

        Self { time, temperature }
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_increment_converts_per_minute_rate() {
        // 60 C/min at dt = 1 s is one degree per step.
        let t = Trajectory::generate(0.0, 100.0, 60.0, 5, 1.0);
        assert_eq!(t.temperature, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(t.time, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn holds_exactly_at_final_temperature() {
        let t = Trajectory::generate(0.0, 3.0, 120.0, 4, 1.0);
        assert_eq!(t.temperature, vec![0.0, 2.0, 3.0, 3.0, 3.0]);
    }

    #[test]
    fn ascending_ramp_is_monotone_and_bounded() {
        let t = Trajectory::generate(25.0, 250.0, 10.0, 500, 1.0);
        assert_eq!(t.len(), 501);
        for pair in t.temperature.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
        assert!(t.temperature.iter().all(|&v| v <= 250.0));
    }

    #[test]
    fn descending_ramp_clamps_from_below() {
        let t = Trajectory::generate(100.0, 50.0, -60.0, 60, 1.0);
        assert_eq!(t.temperature[1], 99.0);
        for pair in t.temperature.windows(2) {
            assert!(pair[1] <= pair[0]);
        }
        assert_eq!(*t.temperature.last().unwrap(), 50.0);
    }

    #[test]
    fn zero_steps_yields_initial_sample_only() {
        let t = Trajectory::generate(25.0, 250.0, 10.0, 0, 1.0);
        assert_eq!(t.len(), 1);
        assert_eq!(t.temperature, vec![25.0]);
        assert_eq!(t.time, vec![0.0]);
    }

    #[test]
    fn time_axis_follows_dt() {
        let t = Trajectory::generate(0.0, 10.0, 30.0, 4, 0.5);
        assert_eq!(t.time, vec![0.0, 0.5, 1.0, 1.5, 2.0]);
        // 30 C/min at dt = 0.5 s is 0.25 degrees per step.
        assert_eq!(t.temperature[1], 0.25);
    }
}
