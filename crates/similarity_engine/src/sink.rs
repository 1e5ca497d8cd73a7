//! Result persistence and progress accounting.
//!
//! One mutex guards both the comparison log and the progress counters, so a
//! row is written, counted and reported as a single step no matter how many
//! pool workers finish at once.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use engine_logging::{engine_debug, engine_warn};

use crate::events::EventSink;
use crate::persist::ComparisonLog;
use crate::{ComparisonResult, EngineEvent};

/// Counters shared by the walker and the pool workers.
///
/// `estimated_total` grows by the running discovered count each time a file
/// is discovered, so after `d` files it equals `d * (d - 1) / 2`: the number
/// of pairs among the files seen so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressCounters {
    pub discovered: u64,
    pub estimated_total: u64,
    pub completed: u64,
    pub discovery_finished: bool,
}

impl ProgressCounters {
    pub fn fraction(&self) -> Option<f64> {
        if self.estimated_total == 0 {
            return None;
        }
        Some(self.completed as f64 / self.estimated_total as f64)
    }

    /// Discovery is over and every known pair has been recorded.
    pub fn is_complete(&self) -> bool {
        self.discovery_finished && self.completed == self.estimated_total
    }
}

struct SinkState {
    log: ComparisonLog,
    counters: ProgressCounters,
}

pub struct ResultSink {
    state: Mutex<SinkState>,
    threshold: f64,
    events: Arc<dyn EventSink>,
}

impl ResultSink {
    pub fn new(log: ComparisonLog, threshold: f64, events: Arc<dyn EventSink>) -> Self {
        Self {
            state: Mutex::new(SinkState {
                log,
                counters: ProgressCounters::default(),
            }),
            threshold,
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SinkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn counters(&self) -> ProgressCounters {
        self.lock().counters
    }

    /// Must be called before the file is handed to the queue, so the
    /// denominator never trails the work that can complete against it.
    pub fn file_discovered(&self) {
        let mut state = self.lock();
        let counters = &mut state.counters;
        counters.estimated_total += counters.discovered;
        counters.discovered += 1;
    }

    /// Marks discovery as finished. Returns true if nothing is left to record.
    pub fn discovery_finished(&self) -> bool {
        let mut state = self.lock();
        state.counters.discovery_finished = true;
        engine_debug!(
            "discovery finished: {} files, {} pairs, {} completed",
            state.counters.discovered,
            state.counters.estimated_total,
            state.counters.completed
        );
        state.counters.is_complete()
    }

    /// Records one finished comparison. Returns true if it completed the run.
    pub fn record(&self, result: ComparisonResult) -> bool {
        let mut state = self.lock();
        if let Err(err) = state.log.append_result(&result) {
            self.report_log_error(state.log.path(), &err);
        }
        if result.similarity >= self.threshold {
            self.events.emit(EngineEvent::ResultFound(result));
        }
        self.complete_one(&mut state)
    }

    /// Records a pair whose files could not be read. Counts as completed.
    pub fn record_failure(&self, file_a: &Path, file_b: &Path) -> bool {
        let mut state = self.lock();
        if let Err(err) = state.log.append_failure(file_a, file_b) {
            self.report_log_error(state.log.path(), &err);
        }
        self.complete_one(&mut state)
    }

    fn complete_one(&self, state: &mut SinkState) -> bool {
        let counters = &mut state.counters;
        counters.completed += 1;
        if let Some(fraction) = counters.fraction() {
            self.events.emit(EngineEvent::Progress(fraction));
        }
        counters.is_complete()
    }

    fn report_log_error(&self, path: &Path, err: &crate::PersistError) {
        engine_warn!("failed to append to {}: {}", path.display(), err);
        self.events
            .emit(EngineEvent::Error(format!("{}: {}", path.display(), err)));
    }
}
