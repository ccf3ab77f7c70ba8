use std::{
    fs::File,
    io::BufWriter,
    path::Path,
};

use cem_solver::{
    PropagatorConfig,
    RunResult,
    analysis::AnalysisError,
};
use cem_util::io::ColumnWriter;
use chrono::{
    DateTime,
    Local,
};
use color_eyre::eyre::Error;
use serde::Serialize;

use crate::scenario::ScenarioConfig;

/// Overview of a finished run, written as `summary.json`.
#[derive(Clone, Debug, Serialize)]
pub struct Summary {
    pub label: String,
    pub finished_at: DateTime<Local>,
    pub points: usize,
    pub length: f64,
    pub steps: usize,
    pub spatial_resolution: f64,
    pub temporal_resolution: f64,
    pub simulated_time: f64,
    pub max_field: f64,
    pub observation_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_frequency: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_magnitude: Option<f64>,
}

impl Summary {
    pub fn new(scenario: &ScenarioConfig, observation_index: usize, result: &RunResult) -> Self {
        let peak = result
            .spectrum(observation_index)
            .ok()
            .and_then(|spectrum| spectrum.peak());

        Self {
            label: scenario.label.clone(),
            finished_at: Local::now(),
            points: result.grid.len(),
            length: result.grid.length,
            steps: result.steps,
            spatial_resolution: result.resolution.spatial,
            temporal_resolution: result.resolution.temporal,
            simulated_time: result.time,
            max_field: result.field.amax(),
            observation_index,
            peak_frequency: peak.map(|(frequency, _)| frequency),
            peak_magnitude: peak.map(|(_, magnitude)| magnitude),
        }
    }
}

/// Writes all result files into `directory`, creating it if necessary.
///
/// Files derived from the field history are skipped if the run didn't record
/// one.
pub fn write_results(
    directory: &Path,
    scenario: &ScenarioConfig,
    config: &PropagatorConfig,
    result: &RunResult,
) -> Result<Summary, Error> {
    let observation_index = scenario.observation_index()?;
    std::fs::create_dir_all(directory)?;

    let positions = result.grid.positions().collect::<Vec<_>>();
    write_csv(
        &directory.join("field.csv"),
        ColumnWriter::new()
            .column("z", &positions)
            .column("e", result.field.as_slice())
            .column("permittivity", &config.medium.permittivity)
            .column("conductivity", &config.medium.conductivity),
    )?;

    match write_history_results(directory, scenario, observation_index, result) {
        Ok(()) => {}
        Err(HistoryOutputError::Analysis(AnalysisError::NoHistory)) => {
            tracing::warn!("no field history recorded, skipping time series and spectra");
        }
        Err(HistoryOutputError::Analysis(error)) => return Err(error.into()),
        Err(HistoryOutputError::Other(error)) => return Err(error),
    }

    let summary = Summary::new(scenario, observation_index, result);
    let writer = BufWriter::new(File::create(directory.join("summary.json"))?);
    serde_json::to_writer_pretty(writer, &summary)?;

    tracing::info!(directory = %directory.display(), "wrote results");

    Ok(summary)
}

fn write_history_results(
    directory: &Path,
    scenario: &ScenarioConfig,
    observation_index: usize,
    result: &RunResult,
) -> Result<(), HistoryOutputError> {
    let times = result.times();
    let series = result.time_series(observation_index)?;
    write_csv(
        &directory.join("observation.csv"),
        ColumnWriter::new()
            .column("t", &times)
            .column("e", &series),
    )?;

    let spectrum = result.spectrum(observation_index)?;
    let magnitudes_db = spectrum.magnitudes_db();
    write_csv(
        &directory.join("spectrum.csv"),
        ColumnWriter::new()
            .column("frequency", &spectrum.frequencies)
            .column("magnitude", &spectrum.magnitudes)
            .column("magnitude_db", &magnitudes_db),
    )?;

    let curve = result.attenuation_curve(scenario.analysis.attenuation_start..)?;
    let amplitudes_db = curve.amplitudes_db();
    write_csv(
        &directory.join("attenuation.csv"),
        ColumnWriter::new()
            .column("z", &curve.positions)
            .column("amplitude", &curve.amplitudes)
            .column("amplitude_db", &amplitudes_db),
    )?;

    Ok(())
}

fn write_csv(path: &Path, columns: ColumnWriter<'_>) -> Result<(), Error> {
    let writer = BufWriter::new(File::create(path)?);
    columns.write(writer)?;
    tracing::debug!(path = %path.display(), rows = columns.num_rows(), "wrote csv");
    Ok(())
}

#[derive(Debug)]
enum HistoryOutputError {
    Analysis(AnalysisError),
    Other(Error),
}

impl From<AnalysisError> for HistoryOutputError {
    fn from(value: AnalysisError) -> Self {
        Self::Analysis(value)
    }
}

impl From<Error> for HistoryOutputError {
    fn from(value: Error) -> Self {
        Self::Other(value)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::{
        output::write_results,
        scenario::ScenarioFormat,
    };

    fn scratch_directory(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("cem-cli-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&path);
        path
    }

    fn small_scenario(history: bool) -> crate::scenario::ScenarioConfig {
        let mut scenario = ScenarioFormat::Toml
            .parse(
                r#"
                label = "small"
                steps = 16

                [grid]
                points = 9
                length = 8.0

                [source]
                index = 4
                pulse = { type = "impulse", amplitude = 1.0, time = 0.0 }

                [analysis]
                observation_index = 5
                attenuation_start = 2
                "#,
            )
            .unwrap();
        scenario.history = history;
        scenario
    }

    #[test]
    fn it_writes_all_files() {
        let directory = scratch_directory("all");
        let scenario = small_scenario(true);
        let config = scenario.propagator_config();
        let result = cem_solver::fdtd::run(&config).unwrap();

        let summary = write_results(&directory, &scenario, &config, &result).unwrap();
        assert_eq!(summary.steps, 16);
        assert_eq!(summary.observation_index, 5);
        assert!(summary.peak_frequency.is_some());

        let field = std::fs::read_to_string(directory.join("field.csv")).unwrap();
        let mut lines = field.lines();
        assert_eq!(lines.next(), Some("z,e,permittivity,conductivity"));
        assert_eq!(lines.count(), 9);

        let observation = std::fs::read_to_string(directory.join("observation.csv")).unwrap();
        assert_eq!(observation.lines().count(), 17);

        let spectrum = std::fs::read_to_string(directory.join("spectrum.csv")).unwrap();
        assert!(spectrum.starts_with("frequency,magnitude,magnitude_db\n"));
        assert_eq!(spectrum.lines().count(), 9);

        let attenuation = std::fs::read_to_string(directory.join("attenuation.csv")).unwrap();
        assert_eq!(attenuation.lines().count(), 8);

        let summary: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(directory.join("summary.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(summary["label"], "small");
        assert_eq!(summary["points"], 9);

        std::fs::remove_dir_all(&directory).unwrap();
    }

    #[test]
    fn it_skips_history_outputs_without_history() {
        let directory = scratch_directory("no-history");
        let scenario = small_scenario(false);
        let config = scenario.propagator_config();
        let result = cem_solver::fdtd::run(&config).unwrap();

        let summary = write_results(&directory, &scenario, &config, &result).unwrap();
        assert_eq!(summary.peak_frequency, None);

        assert!(directory.join("field.csv").exists());
        assert!(directory.join("summary.json").exists());
        assert!(!directory.join("observation.csv").exists());
        assert!(!directory.join("spectrum.csv").exists());

        std::fs::remove_dir_all(&directory).unwrap();
    }
}
