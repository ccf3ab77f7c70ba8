//! 1D leapfrog FDTD propagator for a scalar electric field.
//!
//! The field at each sample follows
//!
//! ```text
//! next = 2 cur - prev + (c dt / (n dz))^2 (cur[i+1] - 2 cur[i] + cur[i-1]) - L (cur - prev)
//! ```
//!
//! with the loss coefficient `L = c^2 dt sigma mu_0 / epsilon_r`, an optional
//! linear gain `g dt cur`, and absorbing boundaries that copy the adjacent
//! interior sample.
//!
//! Create a [`Propagator`] with a [`FdtdCpuBackend`] and either [`run`] it to
//! completion or step it manually with [`Propagator::update`].
//!
//! [`Propagator`]: cpu::Propagator
//! [`FdtdCpuBackend`]: cpu::FdtdCpuBackend
//! [`run`]: cpu::Propagator::run

pub mod cpu;
pub mod util;

use nalgebra::DVector;

use crate::{
    error::Error,
    fdtd::cpu::FdtdCpuBackend,
    grid::Grid,
    history::FieldHistory,
    material::PhysicalConstants,
    medium::MediumProfile,
    source::Source,
};

/// Wave speed used by default (`c ~ 3e8 m/s`).
pub const DEFAULT_WAVE_SPEED: f64 = 3e8;

/// Magnitude above which the field is considered diverged.
pub const DEFAULT_DIVERGENCE_THRESHOLD: f64 = 1e30;

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resolution {
    /// `dz`
    pub spatial: f64,
    /// `dt`
    pub temporal: f64,
}

/// Largest stable time step for the given grid spacing and minimum refractive
/// index.
pub fn stability_bound(spacing: f64, min_refractive_index: f64, wave_speed: f64) -> f64 {
    min_refractive_index * spacing / (2.0 * wave_speed)
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gain {
    /// `g` in 1/m
    pub coefficient: f64,
    pub enabled: bool,
}

impl Gain {
    pub fn new(coefficient: f64) -> Self {
        Self {
            coefficient,
            enabled: true,
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    /// Factor multiplied with the current field, if gain is enabled.
    pub fn factor(&self, time_step: f64) -> Option<f64> {
        self.enabled.then(|| self.coefficient * time_step)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum TimeStep {
    /// Derive the time step from the stability bound.
    #[default]
    Auto,
    Fixed(f64),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum StabilityCheck {
    /// Reject a fixed time step above the stability bound.
    #[default]
    Enforce,
    /// Only warn about it and let the divergence check catch the blow-up.
    Monitor,
}

#[derive(Clone, Debug)]
pub struct PropagatorConfig {
    pub grid: Grid,

    /// Number of time steps `Nt`
    pub steps: usize,

    pub wave_speed: f64,

    /// Only `mu_0` is used, for the loss term.
    pub physical_constants: PhysicalConstants,

    pub medium: MediumProfile,

    pub source: Source,

    pub gain: Gain,

    pub time_step: TimeStep,

    pub stability_check: StabilityCheck,

    pub divergence_threshold: f64,

    /// Record a snapshot of the field after every step.
    pub retain_history: bool,
}

impl PropagatorConfig {
    /// Vacuum, no gain, automatic time step and no history.
    pub fn new(grid: Grid, steps: usize, source: Source) -> Self {
        Self {
            grid,
            steps,
            wave_speed: DEFAULT_WAVE_SPEED,
            physical_constants: PhysicalConstants::CLASSICAL,
            medium: MediumProfile::vacuum(&grid),
            source,
            gain: Gain::disabled(),
            time_step: TimeStep::Auto,
            stability_check: StabilityCheck::Enforce,
            divergence_threshold: DEFAULT_DIVERGENCE_THRESHOLD,
            retain_history: false,
        }
    }

    pub fn with_medium(mut self, medium: MediumProfile) -> Self {
        self.medium = medium;
        self
    }

    pub fn with_wave_speed(mut self, wave_speed: f64) -> Self {
        self.wave_speed = wave_speed;
        self
    }

    pub fn with_physical_constants(mut self, physical_constants: PhysicalConstants) -> Self {
        self.physical_constants = physical_constants;
        self
    }

    pub fn with_gain(mut self, gain: Gain) -> Self {
        self.gain = gain;
        self
    }

    pub fn with_time_step(mut self, time_step: TimeStep) -> Self {
        self.time_step = time_step;
        self
    }

    pub fn with_stability_check(mut self, stability_check: StabilityCheck) -> Self {
        self.stability_check = stability_check;
        self
    }

    pub fn with_divergence_threshold(mut self, divergence_threshold: f64) -> Self {
        self.divergence_threshold = divergence_threshold;
        self
    }

    pub fn with_history(mut self, retain_history: bool) -> Self {
        self.retain_history = retain_history;
        self
    }

    /// Stability bound for this grid and medium.
    ///
    /// Samples without a real positive refractive index are ignored. If there
    /// are none, vacuum is assumed.
    pub fn stability_bound(&self) -> f64 {
        stability_bound(
            self.grid.spacing(),
            self.medium.min_refractive_index().unwrap_or(1.0),
            self.wave_speed,
        )
    }

    /// Spatial and temporal step this configuration runs with.
    pub fn resolution(&self) -> Resolution {
        let temporal = match self.time_step {
            TimeStep::Auto => self.stability_bound(),
            TimeStep::Fixed(time_step) => time_step,
        };
        Resolution {
            spatial: self.grid.spacing(),
            temporal,
        }
    }
}

/// Outcome of a complete run.
#[derive(Clone, Debug)]
pub struct RunResult {
    pub grid: Grid,
    pub resolution: Resolution,
    /// Field after the last step
    pub field: DVector<f64>,
    pub history: Option<FieldHistory>,
    /// Number of steps taken
    pub steps: usize,
    /// Simulated time after the last step
    pub time: f64,
}

/// Runs `config` to completion on a single thread.
pub fn run(config: &PropagatorConfig) -> Result<RunResult, Error> {
    let propagator = FdtdCpuBackend::single_threaded().create_propagator(config)?;
    Ok(propagator.run()?)
}
