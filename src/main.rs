use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eyre::WrapErr;

use helium_viscosity::config::AnalysisConfig;
use helium_viscosity::dataset::ReferenceData;
use helium_viscosity::render::{build_panels, render};
use helium_viscosity::{evaluate, model_performance, Dataset};

/// Compare helium viscosity correlations against reference measurements
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Analysis config, defaults reproduce the standard comparison
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Dataset directory, overrides the config and the embedded dataset
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the viscosity of one correlation in µPa·s
    Evaluate {
        /// Temperature in K
        #[arg(long)]
        temperature: f64,
        /// Pressure in MPa
        #[arg(long)]
        pressure: f64,
        /// KTA, KTA_mod or KTA_tweak
        #[arg(long)]
        model: String,
    },
    /// Print deviation statistics per correlation
    Report {
        /// Isotherm in K, may be repeated
        #[arg(long = "temperature")]
        temperatures: Vec<f64>,
    },
    /// Render the comparison grid
    Plot {
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Render the comparison grid, then print the reports
    Run,
}

fn main() {
    env_logger::Builder::from_default_env()
        .parse_filters("info")
        .init();

    if let Err(err) = main_impl() {
        log::error!("Failure: {err:?}");
        std::process::exit(1);
    }
}

fn main_impl() -> eyre::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    };
    if cli.dataset.is_some() {
        config.dataset = cli.dataset;
    }

    match cli.command.unwrap_or(Command::Run) {
        Command::Evaluate {
            temperature,
            pressure,
            model,
        } => {
            let viscosity = evaluate(temperature, pressure, &model)?;
            println!("{viscosity} µPa·s");
        }
        Command::Report { temperatures } => {
            if !temperatures.is_empty() {
                config.report_temperatures = temperatures;
            }
            report(&config, &load_dataset(&config)?)?;
        }
        Command::Plot { output } => {
            if let Some(output) = output {
                config.output = output;
            }
            plot(&config, &load_dataset(&config)?)?;
        }
        Command::Run => {
            let data = load_dataset(&config)?;
            plot(&config, &data)?;
            report(&config, &data)?;
        }
    }
    Ok(())
}

fn load_dataset(config: &AnalysisConfig) -> eyre::Result<Dataset> {
    let data = match &config.dataset {
        Some(directory) => Dataset::load(directory)
            .wrap_err_with(|| format!("loading dataset from {}", directory.display()))?,
        None => Dataset::embedded()?,
    };
    if let Some((low, high)) = data.temperature_range() {
        log::info!(
            "dataset `{}`: {} sources between {low}K and {high}K",
            data.name(),
            data.sources().len()
        );
    }
    Ok(data)
}

fn plot(config: &AnalysisConfig, data: &Dataset) -> eyre::Result<()> {
    let panels = build_panels(data, &config.temperatures, &config.models)?;
    render(&panels, &config.plot, &config.output)?;
    Ok(())
}

fn report(config: &AnalysisConfig, data: &Dataset) -> eyre::Result<()> {
    for &temperature in &config.report_temperatures {
        for report in model_performance(data, temperature, &config.models)? {
            println!("{report}\n");
        }
    }
    Ok(())
}
