use oven_simulator::simulation::{SimulationParameters, Simulator};

fn reference_params() -> SimulationParameters {
    SimulationParameters {
        kp: 1.0,
        ki: 1.0,
        kd: 1.0,
        initial_temp: 25.0,
        final_temp: 250.0,
        heating_rate: 10.0,
        sim_time: 500,
        thermal_inertia_coeff: 1.0,
    }
}

#[test]
fn reference_heating_scenario() {
    let result = Simulator::new().run(&reference_params()).unwrap();

    assert_eq!(result.len(), 501);
    assert_eq!(result.oven_temperature[0], 25.0);
    assert_eq!(result.target_temperature[0], 25.0);

    // The whole run stays numerically sane and within physical bounds.
    assert!(result.oven_temperature.iter().all(|v| v.is_finite()));
    assert!(result.error.iter().all(|v| v.is_finite()));
    assert!(result
        .heater_power
        .iter()
        .all(|&p| (0.0..=100.0).contains(&p)));

    // 10 C/min over 500 s climbs 83.3 degrees; the ramp never reaches the
    // 250 C clamp but must never exceed it either.
    for pair in result.target_temperature.windows(2) {
        assert!(pair[1] >= pair[0]);
    }
    assert!(result.target_temperature.iter().all(|&t| t <= 250.0));

    // A tracking controller keeps the oven in the neighborhood of the ramp.
    let final_target = *result.target_temperature.last().unwrap();
    let final_oven = *result.oven_temperature.last().unwrap();
    assert!(
        (final_oven - final_target).abs() < 50.0,
        "final oven temperature {final_oven} strayed from target {final_target}"
    );
}

#[test]
fn repeated_runs_are_bit_identical() {
    let sim = Simulator::new();
    let first = sim.run(&reference_params()).unwrap();
    let second = sim.run(&reference_params()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn cooling_scenario_tracks_a_descending_ramp() {
    let params = SimulationParameters {
        kp: 1.0,
        ki: 0.1,
        kd: 0.0,
        initial_temp: 400.0,
        final_temp: 200.0,
        heating_rate: -30.0,
        sim_time: 600,
        thermal_inertia_coeff: 1.0,
    };
    let result = Simulator::new().run(&params).unwrap();

    assert_eq!(result.len(), 601);
    for pair in result.target_temperature.windows(2) {
        assert!(pair[1] <= pair[0]);
    }
    // The descending ramp terminates at the final temperature, not below it.
    assert_eq!(*result.target_temperature.last().unwrap(), 200.0);
    assert!(result.oven_temperature.iter().all(|v| v.is_finite()));
    assert!(result
        .heater_power
        .iter()
        .all(|&p| (0.0..=100.0).contains(&p)));
}

#[test]
fn sub_second_sampling_densifies_the_arrays() {
    let params = SimulationParameters {
        sim_time: 10,
        ..reference_params()
    };
    let result = Simulator::new()
        .with_time_step(0.5)
        .run(&params)
        .unwrap();
    assert_eq!(result.len(), 21);
    assert_eq!(result.time[1], 0.5);
    assert_eq!(*result.time.last().unwrap(), 10.0);
}

#[test]
fn zero_horizon_returns_the_initial_state_alone() {
    let params = SimulationParameters {
        sim_time: 0,
        ..reference_params()
    };
    let result = Simulator::new().run(&params).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result.time, vec![0.0]);
    assert_eq!(result.oven_temperature, vec![25.0]);
    assert_eq!(result.error, vec![0.0]);
}
