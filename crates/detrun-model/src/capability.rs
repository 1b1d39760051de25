use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

/// Arguments for one training run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainRequest {
    pub data: String,
    pub epochs: i64,
    pub imgsz: i64,
    pub device: String,
    pub batch: i32,
    pub copy_paste: f64,
    pub project: PathBuf,
    pub name: String,
}

/// Arguments for one validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidateRequest {
    pub data: String,
    pub imgsz: i64,
    pub device: String,
    pub plots: bool,
    pub save_json: bool,
    pub project: PathBuf,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrainOutcome {
    /// Directory the backend reported writing weights and logs into.
    pub run_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidateOutcome {
    /// Directory the backend reported writing plots and JSON results into.
    pub run_dir: Option<PathBuf>,
}

/// Trainable/validatable detection model owned by an external library.
pub trait DetectionModel {
    fn train(&mut self, request: &TrainRequest) -> Result<TrainOutcome>;

    fn validate(&mut self, request: &ValidateRequest) -> Result<ValidateOutcome>;
}
