use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::{Cli, RunMode};

#[derive(Debug, Error)]
pub enum CliConfigError {
    #[error("Please specify an execution mode: --train or --val")]
    MissingMode,
    #[error(transparent)]
    Usage(#[from] clap::Error),
}

/// Resolved options for one invocation. Built once from parsed flags and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunConfig {
    mode: RunMode,
    model_path: PathBuf,
    data: String,
    epochs: i64,
    batch: i32,
    copy_paste: f64,
    imgsz: i64,
    device: String,
    project: PathBuf,
    name_prefix: String,
}

impl RunConfig {
    /// Selects the mode from the parsed flags. Training is checked first, so
    /// `--train --val` runs training.
    pub fn from_cli(cli: &Cli) -> Result<Self, CliConfigError> {
        let mode = match (cli.train, cli.val) {
            (true, true) => {
                warn!("both --train and --val were given; running training and ignoring --val");
                RunMode::Train
            }
            (true, false) => RunMode::Train,
            (false, true) => RunMode::Validate,
            (false, false) => return Err(CliConfigError::MissingMode),
        };

        Ok(Self {
            mode,
            model_path: cli.model.clone(),
            data: cli.data.clone(),
            epochs: cli.epochs,
            batch: cli.batch,
            copy_paste: cli.copy_paste,
            imgsz: cli.imgsz,
            device: cli.device.clone(),
            project: cli.project.clone(),
            name_prefix: cli.name.clone(),
        })
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn epochs(&self) -> i64 {
        self.epochs
    }

    pub fn batch(&self) -> i32 {
        self.batch
    }

    pub fn copy_paste(&self) -> f64 {
        self.copy_paste
    }

    pub fn imgsz(&self) -> i64 {
        self.imgsz
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn project(&self) -> &Path {
        &self.project
    }

    pub fn name_prefix(&self) -> &str {
        &self.name_prefix
    }

    /// Run name handed to the backend: the prefix plus the mode suffix.
    pub fn run_name(&self) -> String {
        format!("{}{}", self.name_prefix, self.mode.run_name_suffix())
    }
}

/// Parses an argument vector (program name first) into a `RunConfig`.
pub fn parse_run_config<I, T>(args: I) -> Result<RunConfig, CliConfigError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_from(args)?;
    RunConfig::from_cli(&cli)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use serde_json::json;

    use super::*;

    #[test]
    fn unit_parse_run_config_requires_a_mode() {
        let error = parse_run_config(["detrun", "--model", "m.pt"]).expect_err("mode required");
        assert!(matches!(error, CliConfigError::MissingMode));
        assert_eq!(
            error.to_string(),
            "Please specify an execution mode: --train or --val"
        );
    }

    #[test]
    fn unit_parse_run_config_requires_model_path() {
        let error = parse_run_config(["detrun", "--train"]).expect_err("model required");
        match error {
            CliConfigError::Usage(error) => assert_eq!(
                error.kind(),
                clap::error::ErrorKind::MissingRequiredArgument
            ),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn functional_train_config_carries_flags_and_defaults() {
        let config = parse_run_config([
            "detrun", "--train", "--model", "m.yaml", "--data", "d.yaml", "--epochs", "10",
            "--batch", "16",
        ])
        .expect("config");

        assert_eq!(config.mode(), RunMode::Train);
        assert_eq!(config.model_path(), Path::new("m.yaml"));
        assert_eq!(config.data(), "d.yaml");
        assert_eq!(config.epochs(), 10);
        assert_eq!(config.batch(), 16);
        assert_eq!(config.imgsz(), 640);
        assert_eq!(config.device(), "0");
        assert_eq!(config.copy_paste(), 0.1);
        assert_eq!(config.project(), Path::new("runs/detect"));
        assert_eq!(config.run_name(), "exp_train");
    }

    #[test]
    fn regression_numeric_ranges_are_left_to_the_library() {
        let config = parse_run_config([
            "detrun", "--train", "--model", "m.yaml", "--epochs=-5", "--imgsz", "-1",
            "--copy_paste", "-0.5",
        ])
        .expect("config");
        assert_eq!(config.epochs(), -5);
        assert_eq!(config.imgsz(), -1);
        assert_eq!(config.copy_paste(), -0.5);
    }

    #[test]
    fn functional_validate_config_suffixes_run_name() {
        let config = parse_run_config(["detrun", "--val", "--model", "m.pt", "--name", "coco"])
            .expect("config");
        assert_eq!(config.mode(), RunMode::Validate);
        assert_eq!(config.name_prefix(), "coco");
        assert_eq!(config.run_name(), "coco_val");
    }

    #[test]
    fn regression_train_takes_precedence_when_both_modes_are_given() {
        let config = parse_run_config(["detrun", "--val", "--train", "--model", "m.pt"])
            .expect("config");
        assert_eq!(config.mode(), RunMode::Train);
        assert_eq!(config.run_name(), "exp_train");
    }

    #[test]
    fn regression_run_name_carries_exactly_one_suffix() {
        for (flag, expected) in [("--train", "exp_train"), ("--val", "exp_val")] {
            let config = parse_run_config(["detrun", flag, "--model", "m.pt"]).expect("config");
            let name = config.run_name();
            assert_eq!(name, expected);
            assert_ne!(name.ends_with("_train"), name.ends_with("_val"));
        }
    }

    #[test]
    fn unit_run_config_serializes_for_structured_logging() {
        let config = parse_run_config(["detrun", "--val", "--model", "m.pt", "--device", "cpu"])
            .expect("config");
        let value = serde_json::to_value(&config).expect("serialize");
        assert_eq!(value["mode"], json!("validate"));
        assert_eq!(value["model_path"], json!("m.pt"));
        assert_eq!(value["device"], json!("cpu"));
        assert_eq!(value["name_prefix"], json!("exp"));
    }
}
