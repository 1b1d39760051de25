//! Detection-model capability used by the detrun dispatcher.
//!
//! Defines the `DetectionModel` seam with its request/outcome records, model
//! file probing for `.pt` checkpoints, `.yaml` definitions and exported models,
//! and the Ultralytics command-line backend.

pub mod capability;
pub mod model_file;
pub mod ultralytics_cli;

pub use capability::*;
pub use model_file::*;
pub use ultralytics_cli::*;
