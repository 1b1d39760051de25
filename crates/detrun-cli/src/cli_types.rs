use serde::Serialize;

/// Execution mode selected by `--train` or `--val`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Train,
    Validate,
}

impl RunMode {
    pub fn as_str(self) -> &'static str {
        match self {
            RunMode::Train => "train",
            RunMode::Validate => "validate",
        }
    }

    /// Suffix appended to the user-supplied run name prefix.
    pub fn run_name_suffix(self) -> &'static str {
        match self {
            RunMode::Train => "_train",
            RunMode::Validate => "_val",
        }
    }
}
