use approx::assert_relative_eq;
use cem_solver::{
    Error,
    FdtdCpuBackend,
    Grid,
    InvalidConfiguration,
    MediumProfile,
    PhysicalConstants,
    PropagatorConfig,
    Source,
    fdtd::{
        self,
        Gain,
        StabilityCheck,
        TimeStep,
    },
    source::{
        GaussianPulse,
        Impulse,
        ModulatedGaussianPulse,
    },
};

fn unit_impulse(index: usize) -> Source {
    Source::new(
        index,
        Impulse {
            amplitude: 1.0,
            time: 0.0,
        },
    )
}

#[test]
fn zero_source_leaves_field_at_rest() {
    let config = PropagatorConfig::new(Grid::new(5, 1.0), 10, Source::silent(2)).with_history(true);
    let result = fdtd::run(&config).unwrap();

    assert_eq!(result.steps, 10);
    assert_eq!(result.field.as_slice(), &[0.0; 5]);
    assert!(
        result
            .history
            .unwrap()
            .as_slice()
            .iter()
            .all(|value| *value == 0.0)
    );
}

#[test]
fn impulse_spreads_to_neighbours_after_one_step() {
    let config = PropagatorConfig::new(Grid::new(5, 1.0), 1, unit_impulse(2));
    let result = fdtd::run(&config).unwrap();
    let field = result.field.as_slice();

    assert_ne!(field[1], 0.0);
    assert_ne!(field[3], 0.0);
    assert_eq!(field[1], field[3]);
    assert_eq!(field[0], 0.0);
    assert_eq!(field[4], 0.0);
}

#[test]
fn two_point_grid_is_rejected() {
    let config = PropagatorConfig::new(Grid::new(2, 1.0), 10, Source::silent(1));
    assert!(matches!(
        fdtd::run(&config),
        Err(Error::InvalidConfiguration(
            InvalidConfiguration::GridTooSmall { len: 2 }
        ))
    ));
}

#[test]
fn short_medium_arrays_are_rejected() {
    let config = PropagatorConfig::new(Grid::new(5, 1.0), 10, unit_impulse(2))
        .with_medium(MediumProfile::from_arrays(vec![1.0; 4], vec![0.0; 4]));
    assert!(matches!(
        fdtd::run(&config),
        Err(Error::InvalidConfiguration(
            InvalidConfiguration::MediumLengthMismatch {
                expected: 5,
                actual: 4,
                ..
            }
        ))
    ));
}

#[test]
fn lossless_medium_conserves_energy() {
    let config = PropagatorConfig::new(Grid::new(201, 1.0), 90, unit_impulse(100));
    let propagator = FdtdCpuBackend::single_threaded()
        .create_propagator(&config)
        .unwrap();

    let mut state = propagator.create_state();
    propagator.update(&mut state).unwrap();
    let initial = propagator.energy(&state);
    assert!(initial > 0.0);

    // the wave can't reach the boundary within 90 steps
    for _ in 1..90 {
        propagator.update(&mut state).unwrap();
        assert_relative_eq!(propagator.energy(&state), initial, max_relative = 1e-9);
    }

    assert_eq!(state.current()[0], 0.0);
    assert_eq!(state.current()[200], 0.0);
}

#[test]
fn heterogeneous_lossless_medium_conserves_energy() {
    let grid = Grid::new(201, 1.0);
    let medium = MediumProfile::from_fn(&grid, |z| {
        cem_solver::Material::new(1.0 + 3.0 * z, 0.0)
    });
    let config = PropagatorConfig::new(grid, 60, unit_impulse(100)).with_medium(medium);
    let propagator = FdtdCpuBackend::single_threaded()
        .create_propagator(&config)
        .unwrap();

    let mut state = propagator.create_state();
    propagator.update(&mut state).unwrap();
    let initial = propagator.energy(&state);

    for _ in 1..60 {
        propagator.update(&mut state).unwrap();
        assert_relative_eq!(propagator.energy(&state), initial, max_relative = 1e-9);
    }
}

#[test]
fn unstable_time_step_is_rejected_when_enforced() {
    let grid = Grid::new(101, 1.0);
    let config = PropagatorConfig::new(grid, 200, unit_impulse(50))
        .with_time_step(TimeStep::Fixed(2.0 * grid.spacing() / fdtd::DEFAULT_WAVE_SPEED));

    assert!(matches!(
        fdtd::run(&config),
        Err(Error::InvalidConfiguration(
            InvalidConfiguration::UnstableTimeStep { .. }
        ))
    ));
}

#[test]
fn unstable_time_step_diverges_when_monitored() {
    let grid = Grid::new(101, 1.0);
    let config = PropagatorConfig::new(grid, 200, unit_impulse(50))
        .with_time_step(TimeStep::Fixed(2.0 * grid.spacing() / fdtd::DEFAULT_WAVE_SPEED))
        .with_stability_check(StabilityCheck::Monitor)
        .with_history(true);

    match fdtd::run(&config) {
        Err(Error::NumericalInstability(error)) => {
            assert!(error.step < 200);
            assert_eq!(error.steps_completed, error.step);
            assert!(!error.value.is_finite() || error.value.abs() > 1e30);
        }
        other => panic!("expected divergence, got {other:?}"),
    }
}

#[test]
fn meaningless_divergence_threshold_is_rejected() {
    let grid = Grid::new(101, 1.0);
    let unstable = PropagatorConfig::new(grid, 200, unit_impulse(50))
        .with_time_step(TimeStep::Fixed(4.0 * grid.spacing() / fdtd::DEFAULT_WAVE_SPEED))
        .with_stability_check(StabilityCheck::Monitor)
        .with_divergence_threshold(f64::NAN);
    assert!(matches!(
        fdtd::run(&unstable),
        Err(Error::InvalidConfiguration(
            InvalidConfiguration::InvalidDivergenceThreshold { .. }
        ))
    ));

    let at_rest =
        PropagatorConfig::new(grid, 10, Source::silent(50)).with_divergence_threshold(-1.0);
    assert!(matches!(
        fdtd::run(&at_rest),
        Err(Error::InvalidConfiguration(
            InvalidConfiguration::InvalidDivergenceThreshold { threshold }
        )) if threshold == -1.0
    ));
}

#[test]
fn zero_permittivity_surfaces_as_instability() {
    let grid = Grid::new(11, 1.0);
    let config = PropagatorConfig::new(grid, 10, unit_impulse(5))
        .with_medium(MediumProfile::from_arrays(vec![0.0; 11], vec![0.0; 11]));

    assert!(matches!(
        fdtd::run(&config),
        Err(Error::NumericalInstability(_))
    ));
}

#[test]
fn boundaries_copy_adjacent_samples() {
    let grid = Grid::new(51, 1.0);
    let dt = grid.spacing() / (2.0 * fdtd::DEFAULT_WAVE_SPEED);
    let source = Source::new(
        25,
        ModulatedGaussianPulse {
            envelope: GaussianPulse {
                amplitude: 1.0,
                time: 30.0 * dt,
                duration: 8.0 * dt,
            },
            frequency: 1.0 / (20.0 * dt),
        },
    );
    let config = PropagatorConfig::new(grid, 300, source).with_history(true);
    let result = fdtd::run(&config).unwrap();
    let history = result.history.unwrap();

    let first = history.snapshot(0).unwrap();
    assert_eq!(first[0], 0.0);
    assert_eq!(first[50], 0.0);

    let mut reached_boundary = false;
    for step in 1..history.len() {
        let previous = history.snapshot(step - 1).unwrap();
        let next = history.snapshot(step).unwrap();
        assert_eq!(next[0], previous[1]);
        assert_eq!(next[50], previous[49]);
        reached_boundary |= next[0] != 0.0;
    }
    assert!(reached_boundary);
}

#[test]
fn identical_configurations_give_identical_results() {
    let grid = Grid::new(300, 600.0);
    let medium = MediumProfile::from_fn(&grid, |z| {
        cem_solver::Material::new(1.0 + 0.5 * (z / 50.0).sin().abs(), 1e-4)
    });
    let dt = grid.spacing() / (2.0 * fdtd::DEFAULT_WAVE_SPEED);
    let source = Source::new(
        10,
        GaussianPulse {
            amplitude: 1.0,
            time: 40.0 * dt,
            duration: 10.0 * dt,
        },
    );
    let config = PropagatorConfig::new(grid, 400, source)
        .with_medium(medium)
        .with_history(true);

    let a = fdtd::run(&config).unwrap();
    let b = fdtd::run(&config).unwrap();
    assert_eq!(a.field, b.field);
    assert_eq!(a.history, b.history);

    #[cfg(feature = "rayon")]
    {
        let c = FdtdCpuBackend::multi_threaded(Some(4))
            .unwrap()
            .create_propagator(&config)
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(a.field, c.field);
        assert_eq!(a.history, c.history);
    }
}

#[test]
fn gain_amplifies_the_current_field() {
    let grid = Grid::new(5, 1.0);
    let dt = grid.spacing() / (2.0 * fdtd::DEFAULT_WAVE_SPEED);
    let config =
        PropagatorConfig::new(grid, 1, unit_impulse(2)).with_gain(Gain::new(0.5 / dt));
    let with_gain = fdtd::run(&config).unwrap();

    let config = config.with_gain(Gain::disabled());
    let without_gain = fdtd::run(&config).unwrap();

    assert_relative_eq!(
        with_gain.field[2] - without_gain.field[2],
        0.5,
        max_relative = 1e-9
    );
    assert_eq!(with_gain.field[1], without_gain.field[1]);
}

#[test]
fn lossy_medium_attenuates_away_from_source() {
    let grid = Grid::new(401, 1.0);
    let dt = grid.spacing() / 2.0;
    let source = Source::new(
        50,
        GaussianPulse {
            amplitude: 1.0,
            time: 100.0 * dt,
            duration: 20.0 * dt,
        },
    );
    let lossless = PropagatorConfig::new(grid, 700, source)
        .with_wave_speed(1.0)
        .with_physical_constants(PhysicalConstants::REDUCED)
        .with_history(true);
    let lossy = lossless
        .clone()
        .with_medium(MediumProfile::from_arrays(vec![1.0; 401], vec![5.0; 401]));

    let lossless = fdtd::run(&lossless)
        .unwrap()
        .attenuation_curve(100..=300)
        .unwrap();
    let lossy = fdtd::run(&lossy)
        .unwrap()
        .attenuation_curve(100..=300)
        .unwrap();

    assert_eq!(lossy.positions.len(), 201);
    assert_relative_eq!(lossy.positions[0], 100.0 / 401.0, max_relative = 1e-12);

    let samples = [0, 50, 100, 150, 200].map(|offset| lossy.amplitudes[offset]);
    for pair in samples.windows(2) {
        assert!(pair[1] < pair[0], "{samples:?}");
    }

    assert!(lossy.amplitudes[200] < 0.5 * lossless.amplitudes[200]);
}

#[test]
fn spectrum_of_recorded_run_is_available() {
    let config = PropagatorConfig::new(Grid::new(101, 1.0), 128, unit_impulse(50));
    let result = fdtd::run(&config.clone().with_history(true)).unwrap();

    let spectrum = result.spectrum(25).unwrap();
    assert_eq!(spectrum.len(), 64);
    assert_relative_eq!(
        spectrum.frequencies[1],
        1.0 / (128.0 * result.resolution.temporal),
        max_relative = 1e-12
    );

    let without_history = fdtd::run(&config).unwrap();
    assert!(without_history.spectrum(25).is_err());
}
