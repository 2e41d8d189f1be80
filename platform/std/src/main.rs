use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use log::*;

use oven_simulator::simulation::{SampleSeries, SimulationParameters};
use oven_simulator::simulation_service::simulation_task;
use oven_simulator::{Event, Status, CURRENT_STATE, SIMULATION_DATA, SIMULATION_REQUESTS};

/// Closed-loop PID simulation of a resistively heated quartz tube oven.
///
/// Runs one simulation with the given parameters and writes the resulting
/// sample series (time, oven temperature, target temperature, error, heater
/// power) as CSV for plotting.
#[derive(Parser, Debug)]
#[clap(version, about)]
struct Args {
    /// Proportional gain
    #[clap(long, default_value_t = 1.0)]
    kp: f64,
    /// Integral gain
    #[clap(long, default_value_t = 1.0)]
    ki: f64,
    /// Derivative gain
    #[clap(long, default_value_t = 1.0)]
    kd: f64,
    /// Oven temperature at the start of the run, degrees C
    #[clap(long, default_value_t = 25.0)]
    initial_temp: f64,
    /// End temperature of the setpoint ramp, degrees C
    #[clap(long, default_value_t = 250.0)]
    final_temp: f64,
    /// Setpoint ramp rate, degrees C per minute
    #[clap(long, default_value_t = 10.0)]
    heating_rate: f64,
    /// Simulated horizon, seconds
    #[clap(long, default_value_t = 500)]
    sim_time: u32,
    /// Thermal-inertia smoothing window, seconds
    #[clap(long, default_value_t = 1.0)]
    thermal_inertia_coeff: f64,
    /// Sampling step, seconds
    #[clap(long, default_value_t = 1.0)]
    dt: f64,
    /// Write the CSV here instead of stdout
    #[clap(long)]
    output: Option<PathBuf>,
}

/// Series published per completed run.
const SERIES_PER_RUN: usize = 4;

fn write_csv<W: Write>(out: &mut W, series: &[SampleSeries]) -> io::Result<()> {
    write!(out, "time")?;
    for s in series {
        write!(out, ",{}", s.label)?;
    }
    writeln!(out)?;

    let rows = series.first().map_or(0, |s| s.x.len());
    for row in 0..rows {
        write!(out, "{}", series[0].x[row])?;
        for s in series {
            write!(out, ",{}", s.y[row])?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[embassy_executor::task]
async fn plot_sink_task(output: Option<PathBuf>) {
    let data = SIMULATION_DATA.receiver();
    let mut state = CURRENT_STATE.receiver().unwrap();
    let mut series: Vec<SampleSeries> = Vec::with_capacity(SERIES_PER_RUN);

    while series.len() < SERIES_PER_RUN {
        match select(data.receive(), state.changed()).await {
            Either::First(s) => series.push(s),
            Either::Second(new_state) => {
                if new_state.status == Status::Error {
                    error!("Simulation failed: {}", new_state.error_message);
                    process::exit(1);
                }
            }
        }
    }

    let written = (|| -> io::Result<()> {
        match &output {
            Some(path) => {
                let mut writer = BufWriter::new(File::create(path)?);
                write_csv(&mut writer, &series)?;
                writer.flush()
            }
            None => {
                let stdout = io::stdout();
                let mut writer = stdout.lock();
                write_csv(&mut writer, &series)?;
                writer.flush()
            }
        }
    })();

    match written {
        Ok(()) => {
            let samples = series.first().map_or(0, |s| s.x.len());
            info!("Wrote {} series with {} samples each", series.len(), samples);
            process::exit(0);
        }
        Err(err) => {
            error!("Failed to write series: {}", err);
            process::exit(1);
        }
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_nanos()
        .init();

    let args = Args::parse();
    info!("oven-simulator {}", oven_simulator::VERSION);

    let params = SimulationParameters {
        kp: args.kp,
        ki: args.ki,
        kd: args.kd,
        initial_temp: args.initial_temp,
        final_temp: args.final_temp,
        heating_rate: args.heating_rate,
        sim_time: args.sim_time,
        thermal_inertia_coeff: args.thermal_inertia_coeff,
    };

    spawner.spawn(simulation_task(args.dt)).unwrap();
    spawner.spawn(plot_sink_task(args.output)).unwrap();

    SIMULATION_REQUESTS
        .sender()
        .send(Event::RunSimulation(params))
        .await;
}
