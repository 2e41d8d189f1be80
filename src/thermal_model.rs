//! Empirical thermal model of the resistively heated quartz tube oven.
//!
//! The loss polynomials and the quartz heat-capacity fit were calibrated
//! against the reference oven on a fixed 5 s aggregation window. The
//! coefficients are carried as constants of the default calibration and are
//! not meant to be re-derived; alternate calibration sets can be constructed
//! field by field for testing.

use crate::SimulationError;

/// Electrical and thermal constants of one oven calibration.
#[derive(Debug, Clone, PartialEq)]
pub struct OvenCalibration {
    /// Mains voltage, V.
    pub mains_voltage: f64,
    /// Resistance of the heating element, Ohm.
    pub oven_resistance: f64,
    /// Mass of the quartz tube, kg.
    pub tube_mass: f64,
    /// Window the empirical polynomials were fitted on, s. The model is
    /// always evaluated over this window regardless of the caller's step.
    pub aggregation_time: f64,

    // Heating-loss polynomial a1*T^2 + a2*T + a3, J per window.
    pub a1: f64,
    pub a2: f64,
    pub a3: f64,

    // Power-coupling loss b1*power + b2, J per window.
    pub b1: f64,
    pub b2: f64,

    // Passive cooling c1*T^2 + c2, degrees C per window.
    pub c1: f64,
    pub c2: f64,

    // Quartz specific heat cp_base + cp_linear*T - cp_inv_sq/T^2, J/(kg K),
    // held flat below cp_knee.
    pub cp_base: f64,
    pub cp_linear: f64,
    pub cp_inv_sq: f64,
    pub cp_knee: f64,

    /// The power-coupling loss may not exceed this multiple of the
    /// temperature-dependent heating loss.
    pub power_loss_cap: f64,
}

impl Default for OvenCalibration {
    fn default() -> Self {
        Self {
            mains_voltage: 230.0,
            oven_resistance: 19.0,
            tube_mass: 1.04,
            aggregation_time: 5.0,
            a1: -0.004511200300912059,
            a2: 2.97936894852502,
            a3: -1070.2463559702983,
            b1: 62.45356998903521,
            b2: 2.2915522070523324,
            c1: -3.89357385551864e-6,
            c2: -0.21203098043962063,
            cp_base: 931.3,
            cp_linear: 0.256,
            cp_inv_sq: 24.0,
            cp_knee: 300.0,
            power_loss_cap: 1.0,
        }
    }
}

impl OvenCalibration {
    /// Heat delivered by the element over one aggregation window, J.
    /// `power` is the heater duty in percent.
    pub fn heat_flow(&self, power: f64) -> f64 {
        let amperage = self.mains_voltage / self.oven_resistance * power / 100.0;
        amperage * self.mains_voltage * self.aggregation_time
    }

    /// Heat capacity of the tube at `temperature`, J/K.
    ///
    /// Fails fast on a degenerate evaluation instead of letting a NaN or a
    /// division by zero reach the control loop.
    pub fn heat_capacity(&self, temperature: f64) -> Result<f64, SimulationError> {
        let t = temperature.max(self.cp_knee);
        let specific = self.cp_base + self.cp_linear * t - self.cp_inv_sq / (t * t);
        let capacity = specific * self.tube_mass;
        if !capacity.is_finite() || capacity <= 0.0 {
            return Err(SimulationError::DegenerateHeatCapacity { temperature });
        }
        Ok(capacity)
    }

    /// Temperature the oven would reach after one full aggregation window if
    /// the current temperature and heater duty held constant.
    ///
    /// The heating-loss and power-loss terms are floored at zero, and the
    /// power-loss term is additionally capped at `power_loss_cap` times the
    /// heating loss.
    pub fn window_temperature(&self, current: f64, power: f64) -> Result<f64, SimulationError> {
        let capacity = self.heat_capacity(current)?;

        let heat_gain = self.heat_flow(power) / capacity;
        let cooling_loss = -(self.c1 * current * current + self.c2);
        let heating_loss =
            ((self.a1 * current * current + self.a2 * current + self.a3) / capacity).max(0.0);
        let power_loss = ((self.b1 * power + self.b2) / capacity)
            .clamp(0.0, self.power_loss_cap * heating_loss);

        Ok(current + heat_gain - cooling_loss - heating_loss - power_loss)
    }
}
