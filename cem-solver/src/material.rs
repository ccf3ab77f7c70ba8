use std::fmt::Debug;

#[derive(Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhysicalConstants {
    pub vacuum_permittivity: f64,
    pub vacuum_permeability: f64,
}

impl Debug for PhysicalConstants {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicalConstants")
            .field("vacuum_permittivity", &self.vacuum_permittivity)
            .field("vacuum_permeability", &self.vacuum_permeability)
            .field("speed_of_light", &self.speed_of_light())
            .finish()
    }
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self::SI
    }
}

impl PhysicalConstants {
    pub const SI: Self = Self {
        vacuum_permittivity: 8.8541878188e-12,
        vacuum_permeability: 1.25663706127e-6,
    };

    /// Pre-2019 definition with `mu_0 = 4 pi 1e-7`.
    pub const CLASSICAL: Self = Self {
        vacuum_permittivity: 8.8541878128e-12,
        vacuum_permeability: 4.0 * std::f64::consts::PI * 1e-7,
    };

    pub const REDUCED: Self = Self {
        vacuum_permittivity: 1.0,
        vacuum_permeability: 1.0,
    };

    pub fn speed_of_light(&self) -> f64 {
        (self.vacuum_permittivity * self.vacuum_permeability).powf(-0.5)
    }

    pub fn wavelength_to_frequency(&self, wavelength: f64) -> f64 {
        self.speed_of_light() / wavelength
    }
}

/// Electrical properties of the medium at a single grid sample.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Material {
    /// epsilon_r
    pub relative_permittivity: f64,
    /// sigma
    pub electrical_conductivity: f64,
}

impl Material {
    pub const VACUUM: Self = Self {
        relative_permittivity: 1.0,
        electrical_conductivity: 0.0,
    };

    pub const AIR: Self = Self {
        relative_permittivity: 1.0006,
        electrical_conductivity: 0.0,
    };

    pub const fn new(relative_permittivity: f64, electrical_conductivity: f64) -> Self {
        Self {
            relative_permittivity,
            electrical_conductivity,
        }
    }

    /// Material with the given refractive index and conductivity.
    pub fn from_refractive_index(refractive_index: f64, electrical_conductivity: f64) -> Self {
        Self {
            relative_permittivity: refractive_index * refractive_index,
            electrical_conductivity,
        }
    }

    pub fn refractive_index(&self) -> f64 {
        self.relative_permittivity.sqrt()
    }

    /// Linear interpolation. `t = 0` gives `self`, `t = 1` gives `other`.
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        Self {
            relative_permittivity: self.relative_permittivity
                + (other.relative_permittivity - self.relative_permittivity) * t,
            electrical_conductivity: self.electrical_conductivity
                + (other.electrical_conductivity - self.electrical_conductivity) * t,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::VACUUM
    }
}
