//! Closed-form energy budget of a laser link.
//!
//! The beam is treated as a plane wave `E0 exp(-alpha z)` through a homogeneous
//! medium, so the intensity decays with `exp(-2 alpha z)`.

use std::f64::consts::{
    PI,
    TAU,
};

use crate::material::PhysicalConstants;

/// Reduced Planck constant in J s
pub const REDUCED_PLANCK_CONSTANT: f64 = 1.054571817e-34;

/// Elementary charge in C
pub const ELEMENTARY_CHARGE: f64 = 1.602176634e-19;

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkParameters {
    /// m
    pub wavelength: f64,
    /// Peak field amplitude `E0` in V/m
    pub amplitude: f64,
    /// m
    pub distance: f64,
    /// m
    pub beam_diameter: f64,
    /// Emission duration in s
    pub duration: f64,
    pub refractive_index: f64,
    /// Field attenuation coefficient `alpha` in 1/m
    pub attenuation: f64,
}

impl Default for LinkParameters {
    /// 850 nm, 10 V/m, 2 mm beam over 1 km for 10 ns, through vacuum.
    fn default() -> Self {
        Self {
            wavelength: 850e-9,
            amplitude: 10.0,
            distance: 1000.0,
            beam_diameter: 0.002,
            duration: 10e-9,
            refractive_index: 1.0,
            attenuation: 0.0,
        }
    }
}

impl LinkParameters {
    pub fn with_medium(mut self, refractive_index: f64, attenuation: f64) -> Self {
        self.refractive_index = refractive_index;
        self.attenuation = attenuation;
        self
    }

    pub fn with_precipitation(self, precipitation: Precipitation) -> Self {
        self.with_medium(precipitation.refractive_index(), precipitation.attenuation())
    }

    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = distance;
        self
    }

    pub fn evaluate(&self, physical_constants: &PhysicalConstants) -> LinkBudget {
        let c = physical_constants.speed_of_light();

        let frequency = physical_constants.wavelength_to_frequency(self.wavelength);
        let photon_energy = REDUCED_PLANCK_CONSTANT * TAU * frequency;
        let beam_area = PI * (0.5 * self.beam_diameter).powi(2);

        let initial_intensity = 0.5
            * c
            * physical_constants.vacuum_permittivity
            * self.refractive_index
            * self.amplitude.powi(2);
        let transmission = (-2.0 * self.attenuation * self.distance).exp();

        let initial_power = initial_intensity * beam_area;
        let received_power = initial_power * transmission;

        let emitted_energy = initial_power * self.duration;
        let received_energy = received_power * self.duration;

        LinkBudget {
            frequency,
            photon_energy,
            photon_energy_ev: photon_energy / ELEMENTARY_CHARGE,
            beam_area,
            initial_intensity,
            received_intensity: initial_intensity * transmission,
            initial_power,
            received_power,
            transmission,
            losses: 1.0 - transmission,
            emitted_energy,
            received_energy,
            emitted_energy_ev: emitted_energy / ELEMENTARY_CHARGE,
            received_energy_ev: received_energy / ELEMENTARY_CHARGE,
            emitted_photons: emitted_energy / photon_energy,
            received_photons: received_energy / photon_energy,
        }
    }
}

/// All energies in J unless suffixed with `_ev`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkBudget {
    /// Hz
    pub frequency: f64,
    pub photon_energy: f64,
    pub photon_energy_ev: f64,
    /// m^2
    pub beam_area: f64,
    /// W/m^2
    pub initial_intensity: f64,
    pub received_intensity: f64,
    /// W
    pub initial_power: f64,
    pub received_power: f64,
    pub transmission: f64,
    pub losses: f64,
    pub emitted_energy: f64,
    pub received_energy: f64,
    pub emitted_energy_ev: f64,
    pub received_energy_ev: f64,
    pub emitted_photons: f64,
    pub received_photons: f64,
}

/// `alpha = mu_0 sigma c^2 / (2 n)`
pub fn attenuation_from_conductivity(
    conductivity: f64,
    refractive_index: f64,
    physical_constants: &PhysicalConstants,
) -> f64 {
    let c = physical_constants.speed_of_light();
    physical_constants.vacuum_permeability * conductivity * c * c / (2.0 * refractive_index)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum PrecipitationKind {
    Rain,
    Snow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum PrecipitationIntensity {
    Light,
    Moderate,
    Heavy,
}

/// Tabulated optical properties of rain and snow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Precipitation {
    pub kind: PrecipitationKind,
    pub intensity: PrecipitationIntensity,
}

impl Precipitation {
    pub fn new(kind: PrecipitationKind, intensity: PrecipitationIntensity) -> Self {
        Self { kind, intensity }
    }

    /// `alpha` in 1/m
    pub fn attenuation(&self) -> f64 {
        self.properties().0
    }

    /// Ratio of the phase constant to its vacuum value.
    pub fn refractive_index(&self) -> f64 {
        self.properties().1
    }

    fn properties(&self) -> (f64, f64) {
        use PrecipitationIntensity::*;
        use PrecipitationKind::*;

        match (self.kind, self.intensity) {
            (Rain, Light) => (0.001, 1.0003),
            (Rain, Moderate) => (0.005, 1.0005),
            (Rain, Heavy) => (0.01, 1.0008),
            (Snow, Light) => (0.0005, 1.0002),
            (Snow, Moderate) => (0.002, 1.0003),
            (Snow, Heavy) => (0.005, 1.0005),
        }
    }
}
