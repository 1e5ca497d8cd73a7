use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Outcome of comparing two discovered files.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub file_a: PathBuf,
    pub file_b: PathBuf,
    /// Normalized LCS similarity in `[0, 1]`.
    pub similarity: f64,
}

impl ComparisonResult {
    pub fn new(file_a: PathBuf, file_b: PathBuf, similarity: f64) -> Self {
        Self {
            file_a,
            file_b,
            similarity,
        }
    }
}

/// Notifications sent from the engine to its front end.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Non-fatal failure: traversal, file read or log append.
    Error(String),
    /// A comparison at or above the similarity threshold.
    ResultFound(ComparisonResult),
    /// Fraction of known comparisons completed so far.
    Progress(f64),
    /// The run has fully wound down; a new run may be started.
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    #[default]
    Idle,
    Running,
    Stopping,
    Stopped,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineState::Idle => write!(f, "idle"),
            EngineState::Running => write!(f, "running"),
            EngineState::Stopping => write!(f, "stopping"),
            EngineState::Stopped => write!(f, "stopped"),
        }
    }
}
