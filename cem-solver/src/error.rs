#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    InvalidConfiguration(#[from] InvalidConfiguration),
    #[error(transparent)]
    NumericalInstability(#[from] NumericalInstability),
}

/// Rejected before the first time step.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum InvalidConfiguration {
    #[error("Grid needs at least 3 points, but has {len}")]
    GridTooSmall { len: usize },
    #[error("Grid length must be positive and finite: {length}")]
    InvalidLength { length: f64 },
    #[error("Number of time steps must be at least 1")]
    NoTimeSteps,
    #[error("Wave speed must be positive and finite: {wave_speed}")]
    InvalidWaveSpeed { wave_speed: f64 },
    #[error("Medium {property} has {actual} samples, expected {expected}")]
    MediumLengthMismatch {
        property: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("Source index {index} is not an interior point of a grid with {len} points")]
    SourceOutOfRange { index: usize, len: usize },
    #[error("Time step must be positive and finite: {time_step}")]
    InvalidTimeStep { time_step: f64 },
    #[error("Divergence threshold must be positive: {threshold}")]
    InvalidDivergenceThreshold { threshold: f64 },
    #[error("Time step {time_step:e} exceeds the stability bound {bound:e}")]
    UnstableTimeStep { time_step: f64, bound: f64 },
}

/// The field diverged during the run.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
#[error("Field diverged at step {step}, index {index}: {value:e}")]
pub struct NumericalInstability {
    /// Time step during which the offending value was produced.
    pub step: usize,
    /// Grid index of the first offending sample.
    pub index: usize,
    pub value: f64,
    /// Number of steps that completed without diverging.
    pub steps_completed: usize,
}
