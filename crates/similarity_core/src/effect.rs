use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Truncate the comparison log before a new run.
    ResetLog,
    StartComparison { root: PathBuf, workers: usize },
    StopComparison,
}
