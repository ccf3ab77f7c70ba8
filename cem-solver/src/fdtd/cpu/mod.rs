use std::time::Instant;

use cem_util::format_size;
use nalgebra::DVector;

use crate::{
    error::{
        InvalidConfiguration,
        NumericalInstability,
    },
    fdtd::{
        PropagatorConfig,
        Resolution,
        RunResult,
        StabilityCheck,
        TimeStep,
        util::{
            SwapBuffer,
            SwapBufferIndex,
            UpdateCoefficients,
        },
    },
    grid::Grid,
    history::FieldHistory,
    source::Source,
};

/// Defines how a single/multi-threading iterates over the interior samples in
/// the state update.
pub trait GridForEach: Send + Sync + 'static {
    /// Calls `f` with the grid index and a mutable reference for every sample
    /// except the first and the last.
    fn for_each_interior<F>(&self, values: &mut [f64], f: F)
    where
        F: Fn(usize, &mut f64) + Send + Sync;
}

fn interior(values: &mut [f64]) -> &mut [f64] {
    let end = values.len().saturating_sub(1);
    let start = end.min(1);
    &mut values[start..end]
}

/// Rough number of bytes a run allocates.
fn estimate_memory(points: usize, steps: usize, retain_history: bool) -> usize {
    let per_sample = std::mem::size_of::<UpdateCoefficients>()
        + std::mem::size_of::<SwapBuffer<f64>>()
        + std::mem::size_of::<f64>();
    let history = if retain_history {
        steps * std::mem::size_of::<f64>()
    }
    else {
        0
    };
    (per_sample + history) * points
}

/// Use single-threading
#[derive(Clone, Copy, Debug, Default)]
pub struct SingleThreaded;

impl GridForEach for SingleThreaded {
    fn for_each_interior<F>(&self, values: &mut [f64], f: F)
    where
        F: Fn(usize, &mut f64) + Send + Sync,
    {
        interior(values)
            .iter_mut()
            .enumerate()
            .for_each(|(index, value)| f(index + 1, value))
    }
}

/// Use multi-threading
#[cfg(feature = "rayon")]
#[derive(Clone, Debug)]
pub struct MultiThreaded {
    thread_pool: Option<std::sync::Arc<rayon::ThreadPool>>,
}

#[cfg(feature = "rayon")]
impl GridForEach for MultiThreaded {
    fn for_each_interior<F>(&self, values: &mut [f64], f: F)
    where
        F: Fn(usize, &mut f64) + Send + Sync,
    {
        use rayon::iter::{
            IndexedParallelIterator as _,
            IntoParallelRefMutIterator as _,
            ParallelIterator as _,
        };

        let interior = interior(values);
        let mut f = || {
            interior
                .par_iter_mut()
                .enumerate()
                .for_each(|(index, value)| f(index + 1, value))
        };

        if let Some(thread_pool) = &self.thread_pool {
            thread_pool.install(f);
        }
        else {
            f();
        }
    }
}

#[cfg(feature = "rayon")]
impl MultiThreaded {
    /// Use default number of threads (see [`rayon::current_num_threads`])
    pub fn from_default_thread_pool() -> Self {
        Self { thread_pool: None }
    }

    pub fn from_num_threads(num_threads: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        Ok(Self::from_thread_pool(
            rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build()?,
        ))
    }

    pub fn from_thread_pool(thread_pool: rayon::ThreadPool) -> Self {
        Self {
            thread_pool: Some(std::sync::Arc::new(thread_pool)),
        }
    }
}

#[cfg(feature = "rayon")]
impl Default for MultiThreaded {
    fn default() -> Self {
        Self::from_default_thread_pool()
    }
}

#[cfg(feature = "rayon")]
impl FdtdCpuBackend<MultiThreaded> {
    pub fn multi_threaded(num_threads: Option<usize>) -> Result<Self, rayon::ThreadPoolBuildError> {
        let threading = if let Some(num_threads) = num_threads {
            MultiThreaded::from_num_threads(num_threads)?
        }
        else {
            MultiThreaded::from_default_thread_pool()
        };

        Ok(Self { threading })
    }

    pub fn num_threads(&self) -> usize {
        self.threading
            .thread_pool
            .as_ref()
            .map_or_else(rayon::current_num_threads, |thread_pool| {
                thread_pool.current_num_threads()
            })
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FdtdCpuBackend<Threading = SingleThreaded> {
    /// Whether to use single-threading or multi-threading
    pub threading: Threading,
}

impl Default for FdtdCpuBackend<SingleThreaded> {
    fn default() -> Self {
        Self::single_threaded()
    }
}

impl<Threading> FdtdCpuBackend<Threading> {
    pub fn new(threading: Threading) -> Self {
        Self { threading }
    }
}

impl FdtdCpuBackend<SingleThreaded> {
    pub fn single_threaded() -> Self {
        Self {
            threading: SingleThreaded,
        }
    }
}

impl<Threading> FdtdCpuBackend<Threading>
where
    Threading: GridForEach + Clone,
{
    /// Validates `config` and prepares the per-sample update coefficients.
    pub fn create_propagator(
        &self,
        config: &PropagatorConfig,
    ) -> Result<Propagator<Threading>, InvalidConfiguration> {
        validate(config)?;
        tracing::debug!(
            points = config.grid.len(),
            lossless = config.medium.is_lossless(),
            gain = config.gain.enabled,
            "creating propagator"
        );
        Ok(Propagator::new(config, self.threading.clone()))
    }

    /// Estimate of the memory a run of `config` allocates.
    pub fn memory_required(&self, config: &PropagatorConfig) -> usize {
        estimate_memory(config.grid.len(), config.steps, config.retain_history)
    }
}

fn validate(config: &PropagatorConfig) -> Result<(), InvalidConfiguration> {
    let grid = &config.grid;

    if grid.len() < 3 {
        return Err(InvalidConfiguration::GridTooSmall { len: grid.len() });
    }
    if !(grid.length.is_finite() && grid.length > 0.0) {
        return Err(InvalidConfiguration::InvalidLength {
            length: grid.length,
        });
    }
    if config.steps < 1 {
        return Err(InvalidConfiguration::NoTimeSteps);
    }
    if !(config.wave_speed.is_finite() && config.wave_speed > 0.0) {
        return Err(InvalidConfiguration::InvalidWaveSpeed {
            wave_speed: config.wave_speed,
        });
    }

    // +inf turns the magnitude check off, non-finite values are still caught
    if config.divergence_threshold.is_nan() || config.divergence_threshold <= 0.0 {
        return Err(InvalidConfiguration::InvalidDivergenceThreshold {
            threshold: config.divergence_threshold,
        });
    }

    config.medium.validate(grid)?;

    if !grid.is_interior(config.source.index) {
        return Err(InvalidConfiguration::SourceOutOfRange {
            index: config.source.index,
            len: grid.len(),
        });
    }

    if let TimeStep::Fixed(time_step) = config.time_step {
        if !(time_step.is_finite() && time_step > 0.0) {
            return Err(InvalidConfiguration::InvalidTimeStep { time_step });
        }

        let bound = config.stability_bound();
        if time_step > bound {
            match config.stability_check {
                StabilityCheck::Enforce => {
                    return Err(InvalidConfiguration::UnstableTimeStep { time_step, bound });
                }
                StabilityCheck::Monitor => {
                    tracing::warn!(time_step, bound, "time step exceeds stability bound");
                }
            }
        }
    }

    Ok(())
}

/// A validated configuration, ready to be stepped.
#[derive(Clone, Debug)]
pub struct Propagator<Threading = SingleThreaded> {
    grid: Grid,
    resolution: Resolution,
    wave_speed: f64,
    steps: usize,
    permittivity: Vec<f64>,
    update_coefficients: Vec<UpdateCoefficients>,
    source: Source,
    gain: Option<f64>,
    divergence_threshold: f64,
    retain_history: bool,
    threading: Threading,
}

impl<Threading> Propagator<Threading> {
    fn new(config: &PropagatorConfig, threading: Threading) -> Self {
        let resolution = config.resolution();

        let update_coefficients = config
            .medium
            .permittivity
            .iter()
            .zip(&config.medium.conductivity)
            .map(|(permittivity, conductivity)| {
                UpdateCoefficients::new(
                    &resolution,
                    &config.physical_constants,
                    config.wave_speed,
                    *permittivity,
                    *conductivity,
                )
            })
            .collect();

        Self {
            grid: config.grid,
            resolution,
            wave_speed: config.wave_speed,
            steps: config.steps,
            permittivity: config.medium.permittivity.clone(),
            update_coefficients,
            source: config.source.clone(),
            gain: config.gain.factor(resolution.temporal),
            divergence_threshold: config.divergence_threshold,
            retain_history: config.retain_history,
            threading,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Field at rest.
    pub fn create_state(&self) -> PropagatorState {
        PropagatorState::new(self.grid.len())
    }

    /// Discrete energy of the leapfrog scheme.
    ///
    /// `sum eps (cur - prev)^2 + (c dt / dz)^2 sum (cur[i+1] - cur[i]) (prev[i+1] - prev[i])`
    ///
    /// This is conserved exactly (up to rounding) by a lossless medium without
    /// gain, as long as the boundary samples stay at rest and no forcing is
    /// applied.
    pub fn energy(&self, state: &PropagatorState) -> f64 {
        let current = state.current();
        let previous = state.previous();

        let kinetic = self
            .permittivity
            .iter()
            .zip(current.iter().zip(previous.iter()))
            .map(|(epsilon, (current, previous))| epsilon * (current - previous).powi(2))
            .sum::<f64>();

        let potential = current
            .as_slice()
            .windows(2)
            .zip(previous.as_slice().windows(2))
            .map(|(current, previous)| (current[1] - current[0]) * (previous[1] - previous[0]))
            .sum::<f64>();

        let courant = self.wave_speed * self.resolution.temporal / self.resolution.spatial;

        kinetic + courant * courant * potential
    }

    fn check_divergence(&self, field: &[f64]) -> Option<(usize, f64)> {
        field
            .iter()
            .enumerate()
            .find(|(_, value)| !value.is_finite() || value.abs() > self.divergence_threshold)
            .map(|(index, value)| (index, *value))
    }
}

impl<Threading> Propagator<Threading>
where
    Threading: GridForEach,
{
    /// Advances `state` by one time step.
    ///
    /// On error the state holds the diverged field and should be discarded.
    pub fn update(&self, state: &mut PropagatorState) -> Result<(), NumericalInstability> {
        let step = state.tick;
        let time = step as f64 * self.resolution.temporal;

        let current_index = SwapBufferIndex::from_tick(step);
        let next_index = current_index.other();

        state.field[current_index][self.source.index] += self.source.evaluate(time);

        // the buffer for the next field still holds the previous field. each sample
        // only reads its own previous value before it's overwritten.
        let (next, current) = state.field.pair_mut(next_index);
        let current = current.as_slice();

        self.threading
            .for_each_interior(next.as_mut_slice(), |index, next| {
                let coefficients = &self.update_coefficients[index];
                let previous = *next;
                let laplacian = current[index + 1] - 2.0 * current[index] + current[index - 1];

                let mut value = 2.0 * current[index] - previous
                    + coefficients.courant_squared * laplacian
                    - coefficients.loss * (current[index] - previous);

                if let Some(gain) = self.gain {
                    value += gain * current[index];
                }

                *next = value;
            });

        let last = current.len() - 1;
        next[0] = current[1];
        next[last] = current[last - 1];

        if let Some((index, value)) = self.check_divergence(next.as_slice()) {
            return Err(NumericalInstability {
                step,
                index,
                value,
                steps_completed: step,
            });
        }

        state.tick += 1;
        state.time = state.tick as f64 * self.resolution.temporal;

        Ok(())
    }

    /// Runs all configured steps from rest.
    pub fn run(&self) -> Result<RunResult, NumericalInstability> {
        let memory_required = estimate_memory(self.grid.len(), self.steps, self.retain_history);
        tracing::debug!(
            points = self.grid.len(),
            length = self.grid.length,
            steps = self.steps,
            spatial = self.resolution.spatial,
            temporal = self.resolution.temporal,
            memory_required = %format_size(memory_required),
            "starting fdtd run"
        );

        let start = Instant::now();

        let mut state = self.create_state();
        let mut history = self
            .retain_history
            .then(|| FieldHistory::with_capacity(self.grid.len(), self.steps));

        for _ in 0..self.steps {
            if let Err(error) = self.update(&mut state) {
                tracing::warn!(
                    step = error.step,
                    index = error.index,
                    value = error.value,
                    "field diverged"
                );
                return Err(error);
            }

            if let Some(history) = &mut history {
                history.push(state.current().as_slice());
            }
        }

        tracing::debug!(
            steps = state.tick,
            time = state.time,
            elapsed = ?start.elapsed(),
            "fdtd run finished"
        );

        Ok(RunResult {
            grid: self.grid,
            resolution: self.resolution,
            field: state.current().clone(),
            history,
            steps: state.tick,
            time: state.time,
        })
    }
}

#[derive(Clone, Debug)]
pub struct PropagatorState {
    field: SwapBuffer<DVector<f64>>,
    tick: usize,
    time: f64,
}

impl PropagatorState {
    fn new(len: usize) -> Self {
        Self {
            field: SwapBuffer::from_fn(|_| DVector::zeros(len)),
            tick: 0,
            time: 0.0,
        }
    }

    pub fn tick(&self) -> usize {
        self.tick
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn current(&self) -> &DVector<f64> {
        &self.field[SwapBufferIndex::from_tick(self.tick)]
    }

    pub fn previous(&self) -> &DVector<f64> {
        &self.field[SwapBufferIndex::from_tick(self.tick).other()]
    }
}
