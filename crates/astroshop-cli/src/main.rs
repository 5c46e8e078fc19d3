mod config;
mod registry;

use std::time::Instant;

use clap::{Parser, Subcommand};
use thiserror::Error;

use astroshop_generate::{GenerationEngine, GenerationError};
use config::{ConfigArgs, load_options};
use registry::{LogSink, RunPaths, init_logging, record_run};

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("config serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

#[derive(Parser, Debug)]
#[command(name = "astroshop", version, about = "Synthetic astronomy storefront dataset")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate all tables and export them as `;`-separated CSV files.
    Generate {
        #[command(flatten)]
        config: ConfigArgs,
        /// Skip the JSON log file in the output directory.
        #[arg(long, default_value_t = false)]
        no_log_file: bool,
    },
    /// Print the merged configuration without generating.
    ValidateConfig {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let json_log = matches!(
        cli.command,
        Command::Generate {
            no_log_file: false,
            ..
        }
    );
    let log_sink = init_logging(json_log)?;

    let result = match cli.command {
        Command::Generate { config, .. } => run_generate(config, &log_sink),
        Command::ValidateConfig { config } => run_validate_config(config),
    };
    if let Err(err) = &result {
        tracing::error!(event = "run_failed", error = %err, "command failed");
    }
    result
}

fn run_generate(args: ConfigArgs, log_sink: &LogSink) -> Result<(), CliError> {
    let options = load_options(&args)?;
    let run_paths = RunPaths::resolve(&options);

    tracing::info!(
        event = "run_started",
        out_dir = %run_paths.out_dir.display(),
        seed = options.seed
    );
    let timer = Instant::now();

    let engine = GenerationEngine::new(options.clone());
    let mut result = engine.generate()?;

    record_run(&run_paths, &options)?;
    log_sink.attach(&run_paths.logs_path)?;
    tracing::info!(event = "run_recorded", config = %run_paths.config_path.display());

    if let Err(err) = engine.export(&mut result) {
        tracing::warn!(
            event = "export_failed",
            customers = result.dataset.customers.len(),
            sales = result.dataset.sales.len(),
            "dataset generated but could not be written"
        );
        return Err(err.into());
    }

    tracing::info!(
        event = "run_finished",
        status = "success",
        customers_without_purchases = result.report.customers_without_purchases,
        returns_skipped = result.report.returns_skipped,
        duration_ms = timer.elapsed().as_millis() as u64
    );
    println!("out_dir={}", run_paths.out_dir.display());
    Ok(())
}

fn run_validate_config(args: ConfigArgs) -> Result<(), CliError> {
    let options = load_options(&args)?;
    print!("{}", toml::to_string_pretty(&options)?);
    Ok(())
}
