//! Simulation service: the wiring between the parameter source, the
//! synchronous simulation core, and the plot sink. Requests arrive on the
//! input channel, each completed run is published as labeled sample series
//! on the data channel, and the service state is broadcast on a watch.

use embassy_time::Timer;
use log::{error, info};

use crate::simulation::{SimulationParameters, Simulator};
use crate::{
    Event, ServiceState, Status, CURRENT_STATE, SIMULATION_DATA, SIMULATION_REQUESTS,
    SYSTEM_TICK_MILLIS,
};

pub struct SimulationService {
    simulator: Simulator,
    status: Status,
    error_message: String,
}

impl SimulationService {
    pub fn new(simulator: Simulator) -> Self {
        Self {
            simulator,
            status: Status::Idle,
            error_message: String::new(),
        }
    }

    pub async fn run(&mut self) -> ! {
        self.publish_state();
        loop {
            let receiver = SIMULATION_REQUESTS.receiver();
            if let Ok(event) = receiver.try_receive() {
                self.handle_event(event).await;
            }
            Timer::after_millis(SYSTEM_TICK_MILLIS.into()).await;
        }
    }

    async fn handle_event(&mut self, event: Event) {
        match event {
            Event::RunSimulation(params) => self.run_simulation(params).await,
            Event::Reset => {
                info!("Resetting to idle state");
                self.status = Status::Idle;
                self.error_message.clear();
            }
        }
        self.publish_state();
    }

    async fn run_simulation(&mut self, params: SimulationParameters) {
        info!("Starting simulation: {:?}", params);
        self.status = Status::Running;
        self.error_message.clear();
        self.publish_state();

        match self.simulator.run(&params) {
            Ok(result) => {
                info!("Simulation finished, {} samples per series", result.len());
                let sender = SIMULATION_DATA.sender();
                for series in result.series() {
                    sender.send(series).await;
                }
                self.status = Status::Finished;
            }
            Err(err) => {
                error!("Simulation failed: {}", err);
                self.status = Status::Error;
                self.error_message = err.to_string();
            }
        }
    }

    fn publish_state(&self) {
        CURRENT_STATE.sender().send(ServiceState {
            status: self.status.clone(),
            error_message: self.error_message.clone(),
        });
    }
}

#[embassy_executor::task]
pub async fn simulation_task(dt: f64) {
    let mut service = SimulationService::new(Simulator::new().with_time_step(dt));
    service.run().await
}
