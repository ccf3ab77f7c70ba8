#![warn(clippy::todo, unused_qualifications)]

pub mod analysis;
pub mod error;
pub mod fdtd;
pub mod grid;
pub mod history;
pub mod link_budget;
pub mod material;
pub mod medium;
pub mod source;

pub use crate::{
    error::{
        Error,
        InvalidConfiguration,
        NumericalInstability,
    },
    fdtd::{
        PropagatorConfig,
        RunResult,
        cpu::{
            FdtdCpuBackend,
            Propagator,
            PropagatorState,
        },
    },
    grid::Grid,
    material::{
        Material,
        PhysicalConstants,
    },
    medium::MediumProfile,
    source::Source,
};
