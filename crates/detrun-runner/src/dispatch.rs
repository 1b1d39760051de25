use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use detrun_cli::{RunConfig, RunMode};
use detrun_model::{
    DetectionModel, TrainOutcome, TrainRequest, ValidateOutcome, ValidateRequest,
};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RunOutcome {
    Trained(TrainOutcome),
    Validated(ValidateOutcome),
}

impl RunOutcome {
    pub(crate) fn run_dir(&self) -> Option<&Path> {
        match self {
            RunOutcome::Trained(outcome) => outcome.run_dir.as_deref(),
            RunOutcome::Validated(outcome) => outcome.run_dir.as_deref(),
        }
    }
}

pub(crate) fn train_request(config: &RunConfig) -> TrainRequest {
    TrainRequest {
        data: config.data().to_string(),
        epochs: config.epochs(),
        imgsz: config.imgsz(),
        device: config.device().to_string(),
        batch: config.batch(),
        copy_paste: config.copy_paste(),
        project: config.project().to_path_buf(),
        name: config.run_name(),
    }
}

pub(crate) fn validate_request(config: &RunConfig) -> ValidateRequest {
    ValidateRequest {
        data: config.data().to_string(),
        imgsz: config.imgsz(),
        device: config.device().to_string(),
        plots: true,
        save_json: true,
        project: config.project().to_path_buf(),
        name: config.run_name(),
    }
}

/// Issues the single train or validate call selected by `config` and writes
/// status lines to `out`. Backend errors propagate unchanged.
pub(crate) fn dispatch<W: Write>(
    config: &RunConfig,
    model: &mut dyn DetectionModel,
    out: &mut W,
) -> Result<RunOutcome> {
    info!(mode = config.mode().as_str(), run_name = %config.run_name(), "dispatching run");
    match config.mode() {
        RunMode::Train => {
            writeln!(out, "Starting training for {} epochs...", config.epochs())
                .context("failed to write status")?;
            let outcome = model.train(&train_request(config))?;
            writeln!(out, "Training complete.").context("failed to write status")?;
            write_run_dir(out, outcome.run_dir.as_deref())?;
            Ok(RunOutcome::Trained(outcome))
        }
        RunMode::Validate => {
            writeln!(out, "Starting validation...").context("failed to write status")?;
            let outcome = model.validate(&validate_request(config))?;
            writeln!(out, "Validation complete. Results saved.")
                .context("failed to write status")?;
            write_run_dir(out, outcome.run_dir.as_deref())?;
            Ok(RunOutcome::Validated(outcome))
        }
    }
}

fn write_run_dir<W: Write>(out: &mut W, run_dir: Option<&Path>) -> Result<()> {
    if let Some(run_dir) = run_dir {
        writeln!(out, "Run directory: {}", run_dir.display()).context("failed to write status")?;
    }
    Ok(())
}
