use std::path::Path;

use cem_solver::{
    Grid,
    PhysicalConstants,
    PropagatorConfig,
    fdtd::{
        DEFAULT_DIVERGENCE_THRESHOLD,
        DEFAULT_WAVE_SPEED,
        Gain,
        StabilityCheck,
        TimeStep,
    },
    medium::MediumConfig,
    source::SourceConfig,
};
use color_eyre::eyre::{
    Error,
    bail,
};
use serde::{
    Deserialize,
    Serialize,
};

use crate::presets::Preset;

/// A complete run: propagator settings plus what to analyze afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub label: String,

    pub grid: Grid,

    pub steps: usize,

    #[serde(default = "default_wave_speed")]
    pub wave_speed: f64,

    #[serde(default = "default_physical_constants")]
    pub physical_constants: PhysicalConstants,

    #[serde(default)]
    pub medium: MediumConfig,

    pub source: SourceConfig,

    #[serde(default)]
    pub gain: Gain,

    #[serde(default)]
    pub time_step: TimeStep,

    #[serde(default)]
    pub stability_check: StabilityCheck,

    #[serde(default = "default_divergence_threshold")]
    pub divergence_threshold: f64,

    #[serde(default = "default_to_true")]
    pub history: bool,

    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Preset::IdealLaser.scenario()
    }
}

impl ScenarioConfig {
    pub fn propagator_config(&self) -> PropagatorConfig {
        PropagatorConfig::new(self.grid, self.steps, self.source.build())
            .with_wave_speed(self.wave_speed)
            .with_physical_constants(self.physical_constants)
            .with_medium(self.medium.build(&self.grid))
            .with_gain(self.gain)
            .with_time_step(self.time_step)
            .with_stability_check(self.stability_check)
            .with_divergence_threshold(self.divergence_threshold)
            .with_history(self.history)
    }

    /// Field index the time series and spectrum are taken at.
    ///
    /// Given either as an index or as a position on the grid. Defaults to the
    /// center of the grid.
    pub fn observation_index(&self) -> Result<usize, Error> {
        match (
            self.analysis.observation_index,
            self.analysis.observation_position,
        ) {
            (Some(_), Some(_)) => {
                bail!("Only one of observation_index and observation_position can be set")
            }
            (Some(index), None) => Ok(index),
            (None, Some(position)) => {
                let Some(index) = self.grid.index_of(position) else {
                    bail!(
                        "Observation position {position} is outside of the grid [0, {})",
                        self.grid.length
                    );
                };
                Ok(index)
            }
            (None, None) => Ok(self.grid.len() / 2),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        ScenarioFormat::from_path(path)?.parse(&text)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation_index: Option<usize>,

    /// Position in m, alternative to `observation_index`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation_position: Option<f64>,

    /// First index of the attenuation curve.
    #[serde(default)]
    pub attenuation_start: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScenarioFormat {
    Toml,
    Json,
}

impl ScenarioFormat {
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        match path.extension().and_then(|extension| extension.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("json") => Ok(Self::Json),
            _ => bail!("Can't guess scenario format of {}", path.display()),
        }
    }

    pub fn from_name(name: &str) -> Result<Self, Error> {
        match name {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            _ => bail!("Invalid format: {name}"),
        }
    }

    pub fn parse(&self, text: &str) -> Result<ScenarioConfig, Error> {
        Ok(match self {
            Self::Toml => toml::from_str(text)?,
            Self::Json => serde_json::from_str(text)?,
        })
    }

    pub fn serialize(&self, scenario: &ScenarioConfig) -> Result<String, Error> {
        Ok(match self {
            Self::Toml => toml::to_string_pretty(scenario)?,
            Self::Json => serde_json::to_string_pretty(scenario)?,
        })
    }
}

fn default_wave_speed() -> f64 {
    DEFAULT_WAVE_SPEED
}

fn default_physical_constants() -> PhysicalConstants {
    PhysicalConstants::CLASSICAL
}

fn default_divergence_threshold() -> f64 {
    DEFAULT_DIVERGENCE_THRESHOLD
}

fn default_to_true() -> bool {
    true
}
