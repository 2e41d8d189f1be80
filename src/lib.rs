pub mod pid;
pub mod simulation;
pub mod simulation_service;
pub mod thermal_model;
pub mod trajectory;

pub static VERSION: &str = "v0.1";
pub static SYSTEM_TICK_MILLIS: u32 = 100;

use core::fmt;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::watch::Watch;
use serde::{Deserialize, Serialize};

use crate::simulation::{SampleSeries, SimulationParameters};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    RunSimulation(SimulationParameters),
    Reset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Status {
    Idle,
    Running,
    Finished,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceState {
    pub status: Status,
    pub error_message: String,
}

/// Failure of a simulation run. A run either completes with full arrays or
/// fails atomically with one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// Heat-capacity evaluation came out non-positive or non-finite.
    DegenerateHeatCapacity { temperature: f64 },
    /// A step produced a NaN or infinite oven temperature.
    NonFiniteTemperature { step: usize },
    /// The configured time step is non-positive or non-finite.
    InvalidTimeStep { dt: f64 },
    /// The cooperative cancellation flag was raised mid-run.
    Cancelled,
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::DegenerateHeatCapacity { temperature } => {
                write!(f, "degenerate heat capacity at {temperature} degrees C")
            }
            SimulationError::NonFiniteTemperature { step } => {
                write!(f, "non-finite oven temperature at step {step}")
            }
            SimulationError::InvalidTimeStep { dt } => {
                write!(f, "invalid time step {dt} s")
            }
            SimulationError::Cancelled => write!(f, "simulation cancelled"),
        }
    }
}

impl std::error::Error for SimulationError {}

pub static SIMULATION_REQUESTS: Channel<CriticalSectionRawMutex, Event, 3> = Channel::new();
pub static SIMULATION_DATA: Channel<CriticalSectionRawMutex, SampleSeries, 4> = Channel::new();
pub static CURRENT_STATE: Watch<CriticalSectionRawMutex, ServiceState, 2> = Watch::new();
