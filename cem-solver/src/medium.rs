//! Spatial distribution of permittivity and conductivity.

use std::f64::consts::TAU;

use crate::{
    error::InvalidConfiguration,
    grid::Grid,
    material::Material,
};

/// Per-sample relative permittivity and conductivity.
///
/// Both arrays are aligned one-to-one with the field samples. Their lengths are
/// checked against the grid when a propagator is created, so a profile can be
/// built from arbitrary caller data.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MediumProfile {
    pub permittivity: Vec<f64>,
    pub conductivity: Vec<f64>,
}

impl MediumProfile {
    pub fn vacuum(grid: &Grid) -> Self {
        Self::uniform(grid, &Material::VACUUM)
    }

    pub fn uniform(grid: &Grid, material: &Material) -> Self {
        Self {
            permittivity: vec![material.relative_permittivity; grid.len()],
            conductivity: vec![material.electrical_conductivity; grid.len()],
        }
    }

    /// Evaluates `f` at the position of every sample.
    pub fn from_fn(grid: &Grid, mut f: impl FnMut(f64) -> Material) -> Self {
        let (permittivity, conductivity) = grid
            .positions()
            .map(|z| {
                let material = f(z);
                (
                    material.relative_permittivity,
                    material.electrical_conductivity,
                )
            })
            .unzip();

        Self {
            permittivity,
            conductivity,
        }
    }

    pub fn from_arrays(permittivity: Vec<f64>, conductivity: Vec<f64>) -> Self {
        Self {
            permittivity,
            conductivity,
        }
    }

    pub fn len(&self) -> usize {
        self.permittivity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permittivity.is_empty()
    }

    pub fn is_lossless(&self) -> bool {
        self.conductivity.iter().all(|sigma| *sigma == 0.0)
    }

    /// Smallest refractive index in the profile.
    ///
    /// Samples with non-positive permittivity have no real refractive index and
    /// are skipped. Returns `None` if no sample has one.
    pub fn min_refractive_index(&self) -> Option<f64> {
        self.permittivity
            .iter()
            .map(|epsilon| epsilon.sqrt())
            .filter(|n| n.is_finite() && *n > 0.0)
            .reduce(f64::min)
    }

    pub(crate) fn validate(&self, grid: &Grid) -> Result<(), InvalidConfiguration> {
        let check = |property, actual| {
            if actual == grid.len() {
                Ok(())
            }
            else {
                Err(InvalidConfiguration::MediumLengthMismatch {
                    property,
                    expected: grid.len(),
                    actual,
                })
            }
        };

        check("permittivity", self.permittivity.len())?;
        check("conductivity", self.conductivity.len())?;

        Ok(())
    }
}

/// Describes a medium independently of the grid resolution.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", rename_all = "snake_case")
)]
pub enum MediumConfig {
    Uniform {
        #[cfg_attr(feature = "serde", serde(flatten))]
        material: Material,
    },

    /// Periodic precipitation.
    ///
    /// The intensity `I(z) = 0.5 (1 + sin(2 pi z / period))` interpolates between
    /// the background and the saturated material.
    Precipitation {
        background: Material,
        saturated: Material,
        period: f64,
    },

    /// Weakly fluctuating atmosphere.
    ///
    /// `n(z) = n0 + dn sin(k_n z)` and `sigma(z) = sigma0 (1 + a cos(k_sigma z))`.
    Fluctuating {
        refractive_index: f64,
        index_amplitude: f64,
        index_wavenumber: f64,
        conductivity: f64,
        conductivity_modulation: f64,
        conductivity_wavenumber: f64,
    },

    Explicit {
        permittivity: Vec<f64>,
        conductivity: Vec<f64>,
    },
}

impl Default for MediumConfig {
    fn default() -> Self {
        Self::Uniform {
            material: Material::VACUUM,
        }
    }
}

impl MediumConfig {
    pub fn build(&self, grid: &Grid) -> MediumProfile {
        match self {
            MediumConfig::Uniform { material } => MediumProfile::uniform(grid, material),
            MediumConfig::Precipitation {
                background,
                saturated,
                period,
            } => {
                MediumProfile::from_fn(grid, |z| {
                    background.lerp(saturated, precipitation_intensity(z, *period))
                })
            }
            MediumConfig::Fluctuating {
                refractive_index,
                index_amplitude,
                index_wavenumber,
                conductivity,
                conductivity_modulation,
                conductivity_wavenumber,
            } => {
                MediumProfile::from_fn(grid, |z| {
                    Material::from_refractive_index(
                        refractive_index + index_amplitude * (index_wavenumber * z).sin(),
                        conductivity
                            * (1.0 + conductivity_modulation * (conductivity_wavenumber * z).cos()),
                    )
                })
            }
            MediumConfig::Explicit {
                permittivity,
                conductivity,
            } => MediumProfile::from_arrays(permittivity.clone(), conductivity.clone()),
        }
    }
}

/// `0.5 (1 + sin(2 pi z / period))`, in `[0, 1]`.
pub fn precipitation_intensity(z: f64, period: f64) -> f64 {
    0.5 * (1.0 + (TAU * z / period).sin())
}
