use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User picked a directory and asked for a comparison. `threads` is the raw text of the thread-count box.
    CompareRequested { root: PathBuf, threads: String },
    /// User clicked Stop.
    StopClicked,
    /// User clicked Clear.
    ClearClicked,
    /// The engine refused to start.
    StartRejected(String),
    /// Engine forwarded a result above the threshold.
    ResultAdded(crate::ResultRow),
    /// Engine progress fraction.
    ProgressUpdated(f64),
    /// Engine reported a non-fatal error.
    ErrorRaised(String),
    /// Engine has wound down; a new comparison may start.
    EngineIdle,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
