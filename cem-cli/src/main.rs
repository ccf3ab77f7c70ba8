#![warn(unused_qualifications)]

pub mod link;
pub mod output;
pub mod presets;
pub mod scenario;

use std::path::PathBuf;

use cem_solver::{
    FdtdCpuBackend,
    PropagatorConfig,
    RunResult,
    fdtd::cpu::GridForEach,
};
use cem_util::format_size;
use clap::{
    Parser,
    Subcommand,
};
use color_eyre::eyre::{
    Error,
    bail,
};
use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

use crate::{
    link::LinkMedium,
    presets::Preset,
    scenario::{
        ScenarioConfig,
        ScenarioFormat,
    },
};

fn main() -> Result<(), Error> {
    let _ = dotenv();
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    match args.command {
        Command::Run {
            preset,
            config,
            output,
            threads,
        } => {
            let scenario = match (preset, config) {
                (Some(preset), None) => preset.scenario(),
                (None, Some(path)) => ScenarioConfig::load(&path)?,
                _ => bail!("Either --preset or --config must be given"),
            };
            run_scenario(&scenario, output, threads)?;
        }
        Command::Presets => {
            for preset in Preset::iter() {
                println!("{:<20} {}", preset.name(), preset.label());
            }
        }
        Command::DumpDefaultConfig { output, format } => {
            let format = ScenarioFormat::from_name(&format)?;
            let config = format.serialize(&ScenarioConfig::default())?;
            if let Some(output) = &output {
                std::fs::write(output, &config)?;
            }
            else {
                println!("{config}");
            }
        }
        Command::LinkBudget { medium, distance } => {
            let report = link::link_report(medium, distance);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn run_scenario(
    scenario: &ScenarioConfig,
    output: Option<PathBuf>,
    threads: Option<usize>,
) -> Result<(), Error> {
    let config = scenario.propagator_config();
    let observation_index = scenario.observation_index()?;

    tracing::info!(label = %scenario.label, observation_index, "running scenario");

    #[cfg(feature = "multi-threading")]
    let result = {
        let backend = FdtdCpuBackend::multi_threaded(threads)?;
        tracing::debug!(num_threads = backend.num_threads(), "multi-threaded backend");
        run_with_backend(&backend, &config)?
    };

    #[cfg(not(feature = "multi-threading"))]
    let result = {
        if threads.is_some() {
            bail!("--threads requires the multi-threading feature");
        }
        run_with_backend(&FdtdCpuBackend::single_threaded(), &config)?
    };

    tracing::info!(
        steps = result.steps,
        time = result.time,
        max_field = result.field.amax(),
        "run finished"
    );

    if let Some(output) = output {
        let summary = output::write_results(&output, scenario, &config, &result)?;
        if let Some(peak_frequency) = summary.peak_frequency {
            tracing::info!(peak_frequency, "observed spectrum");
        }
    }

    Ok(())
}

fn run_with_backend<Threading>(
    backend: &FdtdCpuBackend<Threading>,
    config: &PropagatorConfig,
) -> Result<RunResult, Error>
where
    Threading: GridForEach + Clone,
{
    tracing::debug!(
        memory_required = %format_size(backend.memory_required(config)),
        "estimated memory"
    );
    let propagator = backend.create_propagator(config)?;
    Ok(propagator.run()?)
}

#[derive(Debug, Parser)]
struct Args {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Runs a preset or a scenario file.
    Run {
        #[clap(short, long, conflicts_with = "config")]
        preset: Option<Preset>,
        /// TOML or JSON scenario file
        #[clap(short, long)]
        config: Option<PathBuf>,
        /// Directory to write results into
        #[clap(short, long)]
        output: Option<PathBuf>,
        #[clap(short, long)]
        threads: Option<usize>,
    },
    /// Lists the built-in presets.
    Presets,
    DumpDefaultConfig {
        #[clap(short, long)]
        output: Option<PathBuf>,
        #[clap(short, long, default_value = "toml")]
        format: String,
    },
    /// Prints the energy budget of a laser link as JSON.
    LinkBudget {
        #[clap(short, long, value_enum, default_value_t)]
        medium: LinkMedium,
        /// Link distance in m
        #[clap(short, long)]
        distance: Option<f64>,
    },
}
