use cem_solver::{
    PhysicalConstants,
    link_budget::{
        LinkBudget,
        LinkParameters,
        Precipitation,
        PrecipitationIntensity,
        PrecipitationKind,
        attenuation_from_conductivity,
    },
};
use serde::Serialize;

/// Refractive index of dry air at optical wavelengths.
const AIR_REFRACTIVE_INDEX: f64 = 1.000293;

/// Conductivity of dry air in S/m.
const AIR_CONDUCTIVITY: f64 = 5e-15;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::VariantArray, clap::ValueEnum)]
pub enum LinkMedium {
    #[default]
    Vacuum,
    Air,
    RainLight,
    RainModerate,
    RainHeavy,
    SnowLight,
    SnowModerate,
    SnowHeavy,
}

impl LinkMedium {
    pub fn parameters(&self, physical_constants: &PhysicalConstants) -> LinkParameters {
        use PrecipitationIntensity::*;
        use PrecipitationKind::*;

        let parameters = LinkParameters::default();
        let precipitation = |kind, intensity| {
            parameters.with_precipitation(Precipitation::new(kind, intensity))
        };

        match self {
            Self::Vacuum => parameters,
            Self::Air => {
                parameters.with_medium(
                    AIR_REFRACTIVE_INDEX,
                    attenuation_from_conductivity(
                        AIR_CONDUCTIVITY,
                        AIR_REFRACTIVE_INDEX,
                        physical_constants,
                    ),
                )
            }
            Self::RainLight => precipitation(Rain, Light),
            Self::RainModerate => precipitation(Rain, Moderate),
            Self::RainHeavy => precipitation(Rain, Heavy),
            Self::SnowLight => precipitation(Snow, Light),
            Self::SnowModerate => precipitation(Snow, Moderate),
            Self::SnowHeavy => precipitation(Snow, Heavy),
        }
    }
}

/// What `cem link-budget` prints.
#[derive(Clone, Debug, Serialize)]
pub struct LinkReport {
    pub medium: String,
    pub parameters: LinkParameters,
    pub budget: LinkBudget,
}

pub fn link_report(medium: LinkMedium, distance: Option<f64>) -> LinkReport {
    let physical_constants = PhysicalConstants::SI;

    let mut parameters = medium.parameters(&physical_constants);
    if let Some(distance) = distance {
        parameters = parameters.with_distance(distance);
    }

    let budget = parameters.evaluate(&physical_constants);
    tracing::debug!(?medium, transmission = budget.transmission, "evaluated link budget");

    LinkReport {
        medium: format!("{medium:?}"),
        parameters,
        budget,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::link::{
        LinkMedium,
        link_report,
    };

    #[test]
    fn it_transmits_everything_through_vacuum() {
        let report = link_report(LinkMedium::Vacuum, None);
        assert_eq!(report.budget.transmission, 1.0);
        assert_eq!(report.parameters.distance, 1000.0);
    }

    #[test]
    fn it_loses_more_in_heavier_weather() {
        let transmission = |medium| link_report(medium, None).budget.transmission;

        assert!(transmission(LinkMedium::Air) < 1.0);
        assert!(transmission(LinkMedium::RainLight) > transmission(LinkMedium::RainHeavy));
        assert!(transmission(LinkMedium::SnowLight) > transmission(LinkMedium::SnowHeavy));
    }

    #[test]
    fn it_scales_with_distance() {
        let near = link_report(LinkMedium::RainModerate, Some(100.0));
        assert_relative_eq!(near.budget.transmission, (-1.0f64).exp(), max_relative = 1e-12);
    }

    #[test]
    fn it_serializes_to_json() {
        let report = link_report(LinkMedium::SnowHeavy, None);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["medium"], "SnowHeavy");
        assert!(json["budget"]["received_photons"].is_number());
    }
}
