use cem_solver::{
    Grid,
    Material,
    PhysicalConstants,
    fdtd::{
        DEFAULT_DIVERGENCE_THRESHOLD,
        DEFAULT_WAVE_SPEED,
        Gain,
        StabilityCheck,
        TimeStep,
        stability_bound,
    },
    medium::MediumConfig,
    source::{
        GaussianPulse,
        ModulatedGaussianPulse,
        PulseConfig,
        SourceConfig,
    },
};

use crate::scenario::{
    AnalysisConfig,
    ScenarioConfig,
};

const WATER: Material = Material::new(80.0, 0.01);
const SNOW: Material = Material::new(1.5, 0.001);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::VariantArray, clap::ValueEnum)]
pub enum Preset {
    IdealLaser,
    LaserGain,
    RainHomogeneous,
    RainHeterogeneous,
    SnowHomogeneous,
    SnowHeterogeneous,
    Air,
}

impl Preset {
    pub fn iter() -> impl Iterator<Item = Self> {
        <Self as strum::VariantArray>::VARIANTS.iter().copied()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::IdealLaser => "ideal-laser",
            Self::LaserGain => "laser-gain",
            Self::RainHomogeneous => "rain-homogeneous",
            Self::RainHeterogeneous => "rain-heterogeneous",
            Self::SnowHomogeneous => "snow-homogeneous",
            Self::SnowHeterogeneous => "snow-heterogeneous",
            Self::Air => "air",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::IdealLaser => "Laser resonator in vacuum",
            Self::LaserGain => "Laser resonator with linear gain",
            Self::RainHomogeneous => "Rain of constant intensity",
            Self::RainHeterogeneous => "Rain of periodically varying intensity",
            Self::SnowHomogeneous => "Heavy snow of constant intensity",
            Self::SnowHeterogeneous => "Snow of periodically varying intensity",
            Self::Air => "Weakly fluctuating atmosphere",
        }
    }

    pub fn scenario(&self) -> ScenarioConfig {
        match self {
            Self::IdealLaser => {
                laser(
                    self.label(),
                    Gain {
                        coefficient: 100.0,
                        enabled: false,
                    },
                )
            }
            Self::LaserGain => laser(self.label(), Gain::new(100.0)),
            Self::RainHomogeneous => {
                // half saturated, with the conductivity of light rain
                weather(
                    self.label(),
                    MediumConfig::Uniform {
                        material: Material::new(40.5003, 0.001),
                    },
                )
            }
            Self::RainHeterogeneous => {
                weather(
                    self.label(),
                    MediumConfig::Precipitation {
                        background: Material::AIR,
                        saturated: WATER,
                        period: 200.0,
                    },
                )
            }
            Self::SnowHomogeneous => {
                weather(
                    self.label(),
                    MediumConfig::Uniform { material: SNOW },
                )
            }
            Self::SnowHeterogeneous => {
                weather(
                    self.label(),
                    MediumConfig::Precipitation {
                        background: Material::new(1.0006, 0.0001),
                        saturated: SNOW,
                        period: 150.0,
                    },
                )
            }
            Self::Air => {
                weather(
                    self.label(),
                    MediumConfig::Fluctuating {
                        refractive_index: 1.000293,
                        index_amplitude: 2e-6,
                        index_wavenumber: 0.002,
                        conductivity: 5e-15,
                        conductivity_modulation: 0.1,
                        conductivity_wavenumber: 0.001,
                    },
                )
            }
        }
    }
}

/// 1 um resonator, Gaussian pulse in the center, observed at a quarter.
fn laser(label: &str, gain: Gain) -> ScenarioConfig {
    let grid = Grid::new(500, 1e-6);
    let medium = MediumConfig::default();
    let time_step = auto_time_step(&grid, &medium);

    ScenarioConfig {
        label: label.to_owned(),
        grid,
        steps: 1000,
        wave_speed: DEFAULT_WAVE_SPEED,
        physical_constants: PhysicalConstants::CLASSICAL,
        medium,
        source: SourceConfig {
            index: grid.len() / 2,
            pulse: PulseConfig::Gaussian(GaussianPulse {
                amplitude: 1.0,
                time: 50.0 * time_step,
                duration: 10.0 * time_step,
            }),
        },
        gain,
        time_step: TimeStep::Auto,
        stability_check: StabilityCheck::Enforce,
        divergence_threshold: DEFAULT_DIVERGENCE_THRESHOLD,
        history: true,
        analysis: AnalysisConfig {
            observation_index: Some(grid.len() / 4),
            observation_position: None,
            attenuation_start: 0,
        },
    }
}

/// 1 km path, modulated pulse injected near the start.
///
/// The carrier is resolved by the grid: 40 time steps per period.
fn weather(label: &str, medium: MediumConfig) -> ScenarioConfig {
    let grid = Grid::new(500, 1000.0);
    let time_step = auto_time_step(&grid, &medium);

    ScenarioConfig {
        label: label.to_owned(),
        grid,
        steps: 1000,
        wave_speed: DEFAULT_WAVE_SPEED,
        physical_constants: PhysicalConstants::CLASSICAL,
        medium,
        source: SourceConfig {
            index: 10,
            pulse: PulseConfig::ModulatedGaussian(ModulatedGaussianPulse {
                envelope: GaussianPulse {
                    amplitude: 1.0,
                    time: 100.0 * time_step,
                    duration: 30.0 * time_step,
                },
                frequency: 1.0 / (40.0 * time_step),
            }),
        },
        gain: Gain::default(),
        time_step: TimeStep::Auto,
        stability_check: StabilityCheck::Enforce,
        divergence_threshold: DEFAULT_DIVERGENCE_THRESHOLD,
        history: true,
        analysis: AnalysisConfig {
            observation_index: Some(grid.len() / 2),
            observation_position: None,
            attenuation_start: 100,
        },
    }
}

fn auto_time_step(grid: &Grid, medium: &MediumConfig) -> f64 {
    let min_refractive_index = medium
        .build(grid)
        .min_refractive_index()
        .unwrap_or(1.0);
    stability_bound(grid.spacing(), min_refractive_index, DEFAULT_WAVE_SPEED)
}
