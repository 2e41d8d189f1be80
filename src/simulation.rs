//! Closed-loop thermal simulation of the oven under PID control.
//!
//! One run is strictly sequential: at each time step the PID controller
//! turns the tracking error into a heater duty, the duty becomes a heat flow
//! over the fixed aggregation window, the empirical model projects the
//! window temperature, and the resulting per-second delta is spread across
//! the thermal-inertia queue before it reaches the oven temperature. Runs
//! are pure functions of their inputs; repeating a run yields bit-identical
//! arrays.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::pid::PidController;
use crate::thermal_model::OvenCalibration;
use crate::trajectory::Trajectory;
use crate::SimulationError;

pub const OVEN_TEMPERATURE_LABEL: &str = "oven_temperature";
pub const TARGET_TEMPERATURE_LABEL: &str = "target_temperature";
pub const ERROR_LABEL: &str = "error";
pub const HEATER_POWER_LABEL: &str = "heater_power";

/// Immutable inputs of one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    /// Oven temperature at the start of the run, degrees C.
    pub initial_temp: f64,
    /// End temperature of the setpoint ramp, degrees C.
    pub final_temp: f64,
    /// Setpoint ramp rate, degrees C per minute.
    pub heating_rate: f64,
    /// Simulated horizon, seconds.
    pub sim_time: u32,
    /// Thermal-inertia smoothing window, seconds.
    pub thermal_inertia_coeff: f64,
}

/// One labeled curve for the plotting collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSeries {
    pub label: String,
    /// Sample instants, seconds.
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// Index-aligned output arrays of a completed run, `num_steps + 1` samples
/// each. `error[i]` is exactly `target_temperature[i] - oven_temperature[i]`.
/// The final `heater_power` sample repeats the last commanded duty.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub time: Vec<f64>,
    pub oven_temperature: Vec<f64>,
    pub target_temperature: Vec<f64>,
    pub error: Vec<f64>,
    pub heater_power: Vec<f64>,
}

impl SimulationResult {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// The labeled sample series consumed by the plotting collaborator.
    pub fn series(&self) -> Vec<SampleSeries> {
        [
            (OVEN_TEMPERATURE_LABEL, &self.oven_temperature),
            (TARGET_TEMPERATURE_LABEL, &self.target_temperature),
            (ERROR_LABEL, &self.error),
            (HEATER_POWER_LABEL, &self.heater_power),
        ]
        .into_iter()
        .map(|(label, y)| SampleSeries {
            label: label.to_string(),
            x: self.time.clone(),
            y: y.clone(),
        })
        .collect()
    }
}

/// Closed-loop thermal simulator: one calibration, one time step, any number
/// of independent runs.
#[derive(Debug, Clone)]
pub struct Simulator {
    calibration: OvenCalibration,
    dt: f64,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulator {
    /// Simulator with the reference calibration and a 1 s time step.
    pub fn new() -> Self {
        Self {
            calibration: OvenCalibration::default(),
            dt: 1.0,
        }
    }

    /// Builder: replace the oven calibration.
    pub fn with_calibration(mut self, calibration: OvenCalibration) -> Self {
        self.calibration = calibration;
        self
    }

    /// Builder: set the sampling step in seconds. The empirical model keeps
    /// evaluating on its fixed aggregation window; `dt` only controls the
    /// sampling density and the inertia-queue length.
    pub fn with_time_step(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    pub fn calibration(&self) -> &OvenCalibration {
        &self.calibration
    }

    pub fn time_step(&self) -> f64 {
        self.dt
    }

    /// Run one closed-loop simulation to completion.
    pub fn run(&self, params: &SimulationParameters) -> Result<SimulationResult, SimulationError> {
        self.run_with_cancel(params, &AtomicBool::new(false))
    }

    /// Run one closed-loop simulation, checking `cancel` once per step. A
    /// cancelled run fails atomically; nothing partial is returned.
    pub fn run_with_cancel(
        &self,
        params: &SimulationParameters,
        cancel: &AtomicBool,
    ) -> Result<SimulationResult, SimulationError> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(SimulationError::InvalidTimeStep { dt: self.dt });
        }

        let num_steps = (params.sim_time as f64 / self.dt).round() as usize;
        let target = Trajectory::generate(
            params.initial_temp,
            params.final_temp,
            params.heating_rate,
            num_steps,
            self.dt,
        );

        let inertia_steps = inertia_steps(params.thermal_inertia_coeff, self.dt);
        let mut pid = PidController::new(params.kp, params.ki, params.kd);

        let mut oven_temperature = Vec::with_capacity(num_steps + 1);
        let mut error = Vec::with_capacity(num_steps + 1);
        let mut heater_power = Vec::with_capacity(num_steps + 1);
        let mut contribution_queue: VecDeque<f64> =
            VecDeque::with_capacity(inertia_steps.min(num_steps + 1));

        let mut current = params.initial_temp;
        oven_temperature.push(current);

        for step in 0..num_steps {
            if cancel.load(Ordering::Relaxed) {
                return Err(SimulationError::Cancelled);
            }

            let step_error = target.temperature[step] - current;
            let power = pid.update(step_error, self.dt);

            let projected = self.calibration.window_temperature(current, power)?;
            let delta_per_second = (projected - current) / self.calibration.aggregation_time;
            let contribution = delta_per_second / inertia_steps as f64;

            if contribution_queue.len() == inertia_steps {
                contribution_queue.pop_front();
            }
            contribution_queue.push_back(contribution);
            let total_delta: f64 = contribution_queue.iter().sum();

            current += total_delta;
            if !current.is_finite() {
                return Err(SimulationError::NonFiniteTemperature { step });
            }

            error.push(step_error);
            heater_power.push(power);
            oven_temperature.push(current);
        }

        // Closing samples keep every column at num_steps + 1: the last error
        // aligns with the final temperature, the heater holds its last duty.
        error.push(target.temperature[num_steps] - current);
        heater_power.push(heater_power.last().copied().unwrap_or(0.0));

        Ok(SimulationResult {
            time: target.time,
            oven_temperature,
            target_temperature: target.temperature,
            error,
            heater_power,
        })
    }
}

/// Number of smoothing steps the inertia window spans at the given `dt`,
/// never less than one.
fn inertia_steps(thermal_inertia_coeff: f64, dt: f64) -> usize {
    let steps = (thermal_inertia_coeff / dt).round();
    if steps.is_finite() && steps >= 1.0 {
        steps as usize
    } else {
        1
    }
}
