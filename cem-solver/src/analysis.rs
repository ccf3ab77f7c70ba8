//! Transforms over a recorded field history.

use std::ops::RangeBounds;

use cem_util::normalize_index_bounds;
use num::Complex;
use rustfft::FftPlanner;

use crate::{
    fdtd::RunResult,
    grid::Grid,
    history::FieldHistory,
};

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error("The run didn't record a field history")]
    NoHistory,
    #[error("Index {index} is out of range for a grid with {len} points")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Series is empty")]
    EmptySeries,
}

/// Field at `index` after every recorded step.
pub fn time_series(history: &FieldHistory, index: usize) -> Result<Vec<f64>, AnalysisError> {
    history
        .column(index)
        .ok_or(AnalysisError::IndexOutOfRange {
            index,
            len: history.num_points(),
        })
}

/// Single-sided amplitude spectrum.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Spectrum {
    /// `k / (n dt)` in Hz
    pub frequencies: Vec<f64>,
    /// `|X_k|`
    pub magnitudes: Vec<f64>,
}

impl Spectrum {
    /// Magnitudes of the DFT of `series` for `k < n / 2`.
    pub fn compute(series: &[f64], time_step: f64) -> Result<Self, AnalysisError> {
        let n = series.len();
        if n == 0 {
            return Err(AnalysisError::EmptySeries);
        }

        let fft = FftPlanner::<f64>::new().plan_fft_forward(n);
        let mut buffer = series
            .iter()
            .map(|x| Complex::new(*x, 0.0))
            .collect::<Vec<_>>();
        fft.process(&mut buffer);

        let half = n / 2;
        let frequencies = (0..half)
            .map(|k| k as f64 / (n as f64 * time_step))
            .collect();
        let magnitudes = buffer[..half].iter().map(|x| x.norm()).collect();

        Ok(Self {
            frequencies,
            magnitudes,
        })
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Frequency and magnitude of the strongest component.
    pub fn peak(&self) -> Option<(f64, f64)> {
        self.frequencies
            .iter()
            .copied()
            .zip(self.magnitudes.iter().copied())
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
    }

    pub fn magnitudes_db(&self) -> Vec<f64> {
        self.magnitudes.iter().copied().map(decibels).collect()
    }
}

/// Peak amplitude over time at each position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttenuationCurve {
    pub positions: Vec<f64>,
    pub amplitudes: Vec<f64>,
}

impl AttenuationCurve {
    pub fn amplitudes_db(&self) -> Vec<f64> {
        self.amplitudes.iter().copied().map(decibels).collect()
    }
}

/// Max absolute field value at each index in `range`, across all recorded
/// steps.
pub fn attenuation_curve(
    history: &FieldHistory,
    grid: &Grid,
    range: impl RangeBounds<usize>,
) -> Result<AttenuationCurve, AnalysisError> {
    if history.is_empty() {
        return Err(AnalysisError::EmptySeries);
    }

    let range = normalize_index_bounds(range, history.num_points());

    let mut amplitudes = vec![0.0f64; range.len()];
    for row in history.iter() {
        for (amplitude, value) in amplitudes.iter_mut().zip(&row[range.clone()]) {
            *amplitude = amplitude.max(value.abs());
        }
    }

    let positions = range.map(|index| grid.position(index)).collect();

    Ok(AttenuationCurve {
        positions,
        amplitudes,
    })
}

/// `20 log10(x)`
pub fn decibels(x: f64) -> f64 {
    20.0 * x.log10()
}

impl RunResult {
    pub fn history(&self) -> Result<&FieldHistory, AnalysisError> {
        self.history.as_ref().ok_or(AnalysisError::NoHistory)
    }

    pub fn time_series(&self, index: usize) -> Result<Vec<f64>, AnalysisError> {
        time_series(self.history()?, index)
    }

    /// Spectrum of the field observed at `index`.
    pub fn spectrum(&self, index: usize) -> Result<Spectrum, AnalysisError> {
        Spectrum::compute(&self.time_series(index)?, self.resolution.temporal)
    }

    pub fn attenuation_curve(
        &self,
        range: impl RangeBounds<usize>,
    ) -> Result<AttenuationCurve, AnalysisError> {
        attenuation_curve(self.history()?, &self.grid, range)
    }

    /// Simulated time of every recorded step.
    pub fn times(&self) -> Vec<f64> {
        (1..=self.steps)
            .map(|tick| tick as f64 * self.resolution.temporal)
            .collect()
    }
}
