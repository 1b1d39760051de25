use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use thiserror::Error;
use tracing::debug;

const ZIP_LOCAL_HEADER_MAGIC: [u8; 4] = *b"PK\x03\x04";
const PICKLE_PROTO_OPCODE: u8 = 0x80;
const CHECKPOINT_HEADER_LEN: u64 = 4;

#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("model path '{}' does not exist", path.display())]
    NotFound { path: PathBuf },
    #[error("model path '{}' is not a regular file", path.display())]
    NotAFile { path: PathBuf },
    #[error("failed to read model file '{}': {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "unsupported model format for '{}': training expects a .pt checkpoint or a .yaml/.yml definition",
        path.display()
    )]
    UnsupportedFormat { path: PathBuf },
    #[error("invalid model checkpoint '{}': {reason}", path.display())]
    InvalidCheckpoint { path: PathBuf, reason: String },
    #[error("invalid model definition '{}': {reason}", path.display())]
    InvalidDefinition { path: PathBuf, reason: String },
}

impl ModelLoadError {
    pub fn path(&self) -> &Path {
        match self {
            ModelLoadError::NotFound { path }
            | ModelLoadError::NotAFile { path }
            | ModelLoadError::Unreadable { path, .. }
            | ModelLoadError::UnsupportedFormat { path }
            | ModelLoadError::InvalidCheckpoint { path, .. }
            | ModelLoadError::InvalidDefinition { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    /// Serialized weights (`.pt`).
    Checkpoint,
    /// Architecture description (`.yaml`/`.yml`) to train from scratch.
    Definition,
    /// Inference-only export (`.onnx`, `.engine`, `*_openvino_model/`, ...)
    /// left for the library to recognize.
    Exported,
}

/// What the loaded model will be used for. Only validation accepts exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelUse {
    Training,
    Validation,
}

impl ModelKind {
    /// Kinds detrun inspects itself; exports are never inferred from a path.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "pt" => Some(ModelKind::Checkpoint),
            "yaml" | "yml" => Some(ModelKind::Definition),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModelKind::Checkpoint => "checkpoint",
            ModelKind::Definition => "definition",
            ModelKind::Exported => "exported",
        }
    }
}

/// A model file that passed probing and can be handed to a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelHandle {
    path: PathBuf,
    kind: ModelKind,
}

impl ModelHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }
}

/// Checks that `path` names a readable checkpoint or model definition. For
/// validation any other existing path is passed through as an export.
pub fn load_model(path: &Path, usage: ModelUse) -> Result<ModelHandle, ModelLoadError> {
    let metadata = std::fs::metadata(path).map_err(|error| match error.kind() {
        ErrorKind::NotFound => ModelLoadError::NotFound {
            path: path.to_path_buf(),
        },
        _ => ModelLoadError::Unreadable {
            path: path.to_path_buf(),
            source: error,
        },
    })?;

    let kind = match (ModelKind::from_path(path), usage) {
        (Some(kind), _) => {
            if !metadata.is_file() {
                return Err(ModelLoadError::NotAFile {
                    path: path.to_path_buf(),
                });
            }
            match kind {
                ModelKind::Checkpoint => check_checkpoint_file(path)?,
                ModelKind::Definition => check_definition_file(path)?,
                ModelKind::Exported => {}
            }
            kind
        }
        (None, ModelUse::Validation) => ModelKind::Exported,
        (None, ModelUse::Training) if !metadata.is_file() => {
            return Err(ModelLoadError::NotAFile {
                path: path.to_path_buf(),
            });
        }
        (None, ModelUse::Training) => {
            return Err(ModelLoadError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }
    };

    debug!(
        path = %path.display(),
        kind = kind.as_str(),
        "model file accepted"
    );
    Ok(ModelHandle {
        path: path.to_path_buf(),
        kind,
    })
}

fn check_checkpoint_file(path: &Path) -> Result<(), ModelLoadError> {
    let unreadable = |source| ModelLoadError::Unreadable {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(unreadable)?;
    let mut header = Vec::with_capacity(CHECKPOINT_HEADER_LEN as usize);
    file.take(CHECKPOINT_HEADER_LEN)
        .read_to_end(&mut header)
        .map_err(unreadable)?;

    validate_checkpoint_header(&header).map_err(|reason| ModelLoadError::InvalidCheckpoint {
        path: path.to_path_buf(),
        reason,
    })
}

fn check_definition_file(path: &Path) -> Result<(), ModelLoadError> {
    let raw = std::fs::read_to_string(path).map_err(|error| match error.kind() {
        ErrorKind::InvalidData => ModelLoadError::InvalidDefinition {
            path: path.to_path_buf(),
            reason: "file is not valid UTF-8".to_string(),
        },
        _ => ModelLoadError::Unreadable {
            path: path.to_path_buf(),
            source: error,
        },
    })?;

    validate_model_definition(&raw).map_err(|reason| ModelLoadError::InvalidDefinition {
        path: path.to_path_buf(),
        reason,
    })
}

/// Accepts torch zip archives and legacy pickle streams (protocol 2 through 5).
pub fn validate_checkpoint_header(header: &[u8]) -> Result<(), String> {
    if header.is_empty() {
        return Err("file is empty".to_string());
    }
    if header.starts_with(&ZIP_LOCAL_HEADER_MAGIC) {
        return Ok(());
    }
    match header {
        [PICKLE_PROTO_OPCODE, protocol, ..] if (2..=5).contains(protocol) => Ok(()),
        _ => Err("not a torch zip archive or pickle stream".to_string()),
    }
}

/// Requires a YAML mapping with `backbone` and `head` layer sequences.
pub fn validate_model_definition(raw: &str) -> Result<(), String> {
    let document: Value =
        serde_yaml::from_str(raw).map_err(|error| format!("failed to parse YAML: {error}"))?;
    let Value::Mapping(mapping) = document else {
        return Err("top-level YAML value must be a mapping".to_string());
    };

    for section in ["backbone", "head"] {
        match mapping.get(section) {
            Some(Value::Sequence(layers)) if !layers.is_empty() => {}
            Some(Value::Sequence(_)) => {
                return Err(format!("'{section}' must list at least one layer"));
            }
            Some(_) => return Err(format!("'{section}' must be a sequence of layers")),
            None => return Err(format!("missing '{section}' section")),
        }
    }
    Ok(())
}
