use std::{
    f64::consts::TAU,
    fmt::Debug,
    sync::Arc,
};

/// Time-domain forcing added to the field at the source index.
pub trait SourceFunction: Debug + Send + Sync + 'static {
    fn evaluate(&self, time: f64) -> f64;
}

/// `A exp(-0.5 ((t - t0) / sigma)^2)`
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaussianPulse {
    pub amplitude: f64,
    /// Center of the pulse
    pub time: f64,
    /// Standard deviation
    pub duration: f64,
}

impl SourceFunction for GaussianPulse {
    fn evaluate(&self, time: f64) -> f64 {
        self.amplitude * (-0.5 * ((time - self.time) / self.duration).powi(2)).exp()
    }
}

/// Gaussian envelope times `sin(2 pi f t)`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModulatedGaussianPulse {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub envelope: GaussianPulse,
    pub frequency: f64,
}

impl SourceFunction for ModulatedGaussianPulse {
    fn evaluate(&self, time: f64) -> f64 {
        self.envelope.evaluate(time) * (TAU * self.frequency * time).sin()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContinuousWave {
    pub amplitude: f64,
    pub frequency: f64,
    pub phase: f64,
}

impl SourceFunction for ContinuousWave {
    fn evaluate(&self, time: f64) -> f64 {
        self.amplitude * (TAU * self.frequency * time + self.phase).cos()
    }
}

/// Non-zero only at exactly `time`.
///
/// Sample times are computed as `k * dt`, so an impulse at `t = 0` always
/// fires on the first step.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Impulse {
    pub amplitude: f64,
    pub time: f64,
}

impl SourceFunction for Impulse {
    fn evaluate(&self, time: f64) -> f64 {
        if time == self.time {
            self.amplitude
        }
        else {
            0.0
        }
    }
}

/// Forcing given by an arbitrary closure.
#[derive(derive_more::Debug)]
pub struct FnPulse<F> {
    #[debug(ignore)]
    f: F,
}

impl<F> FnPulse<F>
where
    F: Fn(f64) -> f64 + Send + Sync + 'static,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> SourceFunction for FnPulse<F>
where
    F: Fn(f64) -> f64 + Send + Sync + 'static,
{
    fn evaluate(&self, time: f64) -> f64 {
        (self.f)(time)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl SourceFunction for Silent {
    fn evaluate(&self, _time: f64) -> f64 {
        0.0
    }
}

/// A source function injected at a grid index.
#[derive(Clone, Debug)]
pub struct Source {
    pub index: usize,
    pub function: Arc<dyn SourceFunction>,
}

impl Source {
    pub fn new(index: usize, function: impl SourceFunction) -> Self {
        Self {
            index,
            function: Arc::new(function),
        }
    }

    pub fn silent(index: usize) -> Self {
        Self::new(index, Silent)
    }

    pub fn evaluate(&self, time: f64) -> f64 {
        self.function.evaluate(time)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", rename_all = "snake_case")
)]
pub enum PulseConfig {
    Gaussian(GaussianPulse),
    ModulatedGaussian(ModulatedGaussianPulse),
    ContinuousWave(ContinuousWave),
    Impulse(Impulse),
    Silent,
}

impl PulseConfig {
    pub fn build(&self) -> Arc<dyn SourceFunction> {
        match self {
            PulseConfig::Gaussian(pulse) => Arc::new(*pulse),
            PulseConfig::ModulatedGaussian(pulse) => Arc::new(*pulse),
            PulseConfig::ContinuousWave(pulse) => Arc::new(*pulse),
            PulseConfig::Impulse(pulse) => Arc::new(*pulse),
            PulseConfig::Silent => Arc::new(Silent),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceConfig {
    pub index: usize,
    pub pulse: PulseConfig,
}

impl SourceConfig {
    pub fn build(&self) -> Source {
        Source {
            index: self.index,
            function: self.pulse.build(),
        }
    }
}
