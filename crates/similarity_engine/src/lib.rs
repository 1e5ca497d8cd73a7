//! Similarity engine: concurrent pairwise file comparison.
//!
//! A walker discovers eligible files and feeds a bounded queue; a dispatcher
//! pairs every new file with all files seen before it and hands the pairs to
//! a fixed-size worker pool; a result sink logs every comparison and reports
//! progress. [`EngineHandle`] starts and stops the whole pipeline as one unit.
mod dispatcher;
mod engine;
mod events;
mod persist;
mod pool;
mod queue;
mod settings;
mod similarity;
mod sink;
mod types;
mod walker;

pub use engine::{EngineError, EngineHandle};
pub use events::{ChannelEventSink, EventSink};
pub use persist::{reset_log, ComparisonLog, PersistError, ERROR_MARKER};
pub use queue::{path_queue, QueueError, QueueItem, QueueReceiver, QueueSender};
pub use settings::EngineSettings;
pub use similarity::{lcs_len, similarity, LcsError};
pub use sink::{ProgressCounters, ResultSink};
pub use types::{ComparisonResult, EngineEvent, EngineState};
