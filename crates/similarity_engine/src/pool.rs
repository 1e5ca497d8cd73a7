//! Fixed-size comparison pool.
//!
//! `submit` never blocks: every job becomes a tracked task that first waits
//! for one of `K` semaphore permits, then reads and compares on a blocking
//! thread. Cancelling the run token discards jobs still waiting for a
//! permit; jobs already comparing run to completion.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use engine_logging::{engine_debug, engine_error, engine_trace, engine_warn};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::engine::Coordinator;
use crate::events::EventSink;
use crate::similarity::similarity;
use crate::sink::ResultSink;
use crate::{ComparisonResult, EngineEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ComparisonJob {
    pub(crate) file_a: PathBuf,
    pub(crate) file_b: PathBuf,
}

#[derive(Clone)]
pub(crate) struct WorkerPool {
    permits: Arc<Semaphore>,
    max_table_cells: u64,
    tracker: TaskTracker,
    cancel: CancellationToken,
    sink: Arc<ResultSink>,
    events: Arc<dyn EventSink>,
    coordinator: Arc<Coordinator>,
}

impl WorkerPool {
    pub(crate) fn new(
        workers: usize,
        max_table_cells: u64,
        sink: Arc<ResultSink>,
        events: Arc<dyn EventSink>,
        coordinator: Arc<Coordinator>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(workers)),
            max_table_cells,
            tracker: TaskTracker::new(),
            cancel,
            sink,
            events,
            coordinator,
        }
    }

    /// Queues a job. Returns false once the run has been cancelled.
    pub(crate) fn submit(&self, job: ComparisonJob) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        let permits = self.permits.clone();
        let max_table_cells = self.max_table_cells;
        let cancel = self.cancel.clone();
        let sink = self.sink.clone();
        let events = self.events.clone();
        let coordinator = self.coordinator.clone();

        self.tracker.spawn(async move {
            let _permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                permit = permits.acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => return,
                },
            };
            if cancel.is_cancelled() {
                return;
            }
            let pair = (job.file_a.clone(), job.file_b.clone());
            let job_sink = sink.clone();
            let job_events = events.clone();
            let outcome = tokio::task::spawn_blocking(move || {
                compare(job, max_table_cells, &job_sink, job_events.as_ref())
            })
            .await;
            let completed_run = match outcome {
                Ok(completed_run) => completed_run,
                Err(err) => {
                    // A panicking comparison still has to count, or the run never completes.
                    engine_error!("comparison of {} failed: {}", pair.0.display(), err);
                    events.emit(EngineEvent::Error(format!(
                        "{} vs {}: {}",
                        pair.0.display(),
                        pair.1.display(),
                        err
                    )));
                    sink.record_failure(&pair.0, &pair.1)
                }
            };
            if completed_run {
                coordinator.request_stop();
            }
        });
        true
    }

    /// Stops accepting work and waits for every tracked job to return.
    pub(crate) async fn shutdown(&self) {
        self.tracker.close();
        engine_debug!("waiting for {} pool tasks", self.tracker.len());
        self.tracker.wait().await;
    }
}

/// Returns true when this job completed the run.
fn compare(
    job: ComparisonJob,
    max_table_cells: u64,
    sink: &ResultSink,
    events: &dyn EventSink,
) -> bool {
    let contents = fs::read(&job.file_a)
        .map_err(|err| (job.file_a.clone(), err))
        .and_then(|a| {
            fs::read(&job.file_b)
                .map(|b| (a, b))
                .map_err(|err| (job.file_b.clone(), err))
        });

    let (a, b) = match contents {
        Ok(contents) => contents,
        Err((path, err)) => {
            engine_warn!("failed to read {}: {}", path.display(), err);
            events.emit(EngineEvent::Error(format!("{}: {}", path.display(), err)));
            return sink.record_failure(&job.file_a, &job.file_b);
        }
    };

    match similarity(&a, &b, max_table_cells) {
        Ok(score) => {
            engine_trace!(
                "{} vs {}: {:.4}",
                job.file_a.display(),
                job.file_b.display(),
                score
            );
            sink.record(ComparisonResult::new(job.file_a, job.file_b, score))
        }
        Err(err) => {
            engine_warn!(
                "skipping {} vs {}: {}",
                job.file_a.display(),
                job.file_b.display(),
                err
            );
            events.emit(EngineEvent::Error(format!(
                "{} vs {}: {}",
                job.file_a.display(),
                job.file_b.display(),
                err
            )));
            sink.record_failure(&job.file_a, &job.file_b)
        }
    }
}
