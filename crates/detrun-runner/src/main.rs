mod bootstrap_helpers;
mod dispatch;

use anyhow::{Context, Result};
use clap::Parser;
use detrun_cli::{Cli, RunConfig, RunMode};
use detrun_model::{load_model, ModelKind, ModelUse, UltralyticsCliConfig, UltralyticsCliModel};
use tracing::{debug, warn};

use crate::bootstrap_helpers::init_tracing;
use crate::dispatch::dispatch;

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match RunConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("Error: {error}");
            std::process::exit(1);
        }
    };
    let config_json =
        serde_json::to_string(&config).context("failed to serialize run configuration")?;
    debug!(config = %config_json, "resolved run configuration");

    let usage = match config.mode() {
        RunMode::Train => ModelUse::Training,
        RunMode::Validate => ModelUse::Validation,
    };
    let handle = match load_model(config.model_path(), usage) {
        Ok(handle) => handle,
        Err(error) => {
            eprintln!("Error loading model: {error}");
            eprintln!(
                "Please ensure the model file '{}' exists and is valid.",
                config.model_path().display()
            );
            std::process::exit(1);
        }
    };
    if config.mode() == RunMode::Validate && handle.kind() == ModelKind::Definition {
        warn!(
            model = %handle.path().display(),
            "validating a model definition without trained weights"
        );
    }

    let mut model = UltralyticsCliModel::new(
        handle,
        UltralyticsCliConfig {
            executable: cli.yolo_bin.clone(),
        },
    )?;
    let outcome = dispatch(&config, &mut model, &mut std::io::stdout())?;
    debug!(
        mode = config.mode().as_str(),
        run_dir = ?outcome.run_dir(),
        "run finished"
    );
    Ok(())
}
