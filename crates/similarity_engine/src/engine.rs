//! Lifecycle coordinator.
//!
//! `EngineHandle` owns a dedicated thread that hosts the tokio runtime. All
//! state transitions go through [`Coordinator`]; pipeline tasks never touch
//! the lifecycle directly, they only ask it to stop.

use std::io;
use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_error, engine_info};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::dispatcher::dispatch;
use crate::events::{ChannelEventSink, EventSink};
use crate::persist::{ComparisonLog, PersistError};
use crate::pool::WorkerPool;
use crate::queue::path_queue;
use crate::settings::EngineSettings;
use crate::sink::ResultSink;
use crate::walker::Walker;
use crate::{EngineEvent, EngineState};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error("worker count {workers} outside 1..={max}")]
    InvalidWorkerCount { workers: usize, max: usize },
    #[error("{} is not a directory", .0.display())]
    InvalidRoot(PathBuf),
    #[error("engine is {0}")]
    AlreadyRunning(EngineState),
    #[error(transparent)]
    Log(#[from] PersistError),
    #[error("failed to start engine runtime: {0}")]
    Runtime(io::Error),
    #[error("engine thread has exited")]
    Disconnected,
}

struct RunPlan {
    root: PathBuf,
    workers: usize,
    settings: Arc<EngineSettings>,
    log: ComparisonLog,
    cancel: CancellationToken,
}

enum EngineCommand {
    Start(RunPlan),
}

#[derive(Default)]
struct Lifecycle {
    state: EngineState,
    cancel: Option<CancellationToken>,
    runs: u64,
}

/// Single owner of the engine state machine.
pub(crate) struct Coordinator {
    lifecycle: Mutex<Lifecycle>,
    events: Arc<dyn EventSink>,
}

impl Coordinator {
    fn new(events: Arc<dyn EventSink>) -> Self {
        Self {
            lifecycle: Mutex::new(Lifecycle::default()),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state(&self) -> EngineState {
        self.lock().state
    }

    fn begin_run(&self) -> Result<(u64, CancellationToken), EngineError> {
        let mut lifecycle = self.lock();
        match lifecycle.state {
            EngineState::Idle | EngineState::Stopped => {}
            busy => return Err(EngineError::AlreadyRunning(busy)),
        }
        let cancel = CancellationToken::new();
        lifecycle.runs += 1;
        lifecycle.state = EngineState::Running;
        lifecycle.cancel = Some(cancel.clone());
        Ok((lifecycle.runs, cancel))
    }

    /// Undo `begin_run` when the run could not be handed to the engine thread.
    fn abandon_run(&self) {
        let mut lifecycle = self.lock();
        lifecycle.state = EngineState::Stopped;
        lifecycle.cancel = None;
    }

    /// Cancels the active run. Idempotent, non-blocking, callable from any thread.
    pub(crate) fn request_stop(&self) {
        let mut lifecycle = self.lock();
        if lifecycle.state != EngineState::Running {
            return;
        }
        lifecycle.state = EngineState::Stopping;
        if let Some(cancel) = &lifecycle.cancel {
            cancel.cancel();
        }
    }

    /// Called once per run after every task has returned.
    fn finish_run(&self) {
        {
            let mut lifecycle = self.lock();
            lifecycle.state = EngineState::Stopped;
            lifecycle.cancel = None;
        }
        self.events.emit(EngineEvent::Idle);
    }
}

pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    coordinator: Arc<Coordinator>,
    settings: Arc<EngineSettings>,
}

impl EngineHandle {
    pub fn new(settings: EngineSettings) -> Result<Self, EngineError> {
        settings.validate()?;
        let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand>();
        let (event_tx, event_rx) = mpsc::channel();
        let events: Arc<dyn EventSink> = Arc::new(ChannelEventSink::new(event_tx));
        let coordinator = Arc::new(Coordinator::new(events.clone()));

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .thread_name("similarity-worker")
            .build()
            .map_err(EngineError::Runtime)?;
        let run_coordinator = coordinator.clone();

        thread::Builder::new()
            .name("similarity-engine".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    match command {
                        EngineCommand::Start(plan) => {
                            runtime.spawn(run_comparison(
                                plan,
                                run_coordinator.clone(),
                                events.clone(),
                            ));
                        }
                    }
                }
                runtime.shutdown_background();
            })
            .map_err(EngineError::Runtime)?;

        Ok(Self {
            cmd_tx,
            event_rx,
            coordinator,
            settings: Arc::new(settings),
        })
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn state(&self) -> EngineState {
        self.coordinator.state()
    }

    /// Starts comparing every eligible file under `root` with `workers`
    /// concurrent comparisons. Rejected without side effects on the engine
    /// state if the arguments are invalid or a run is still active.
    pub fn start(&self, root: impl Into<PathBuf>, workers: usize) -> Result<(), EngineError> {
        let root = root.into();
        if workers == 0 || workers > self.settings.max_workers {
            return Err(EngineError::InvalidWorkerCount {
                workers,
                max: self.settings.max_workers,
            });
        }
        if !root.is_dir() {
            return Err(EngineError::InvalidRoot(root));
        }
        let log = ComparisonLog::open(&self.settings.log_path)?;

        let (run_id, cancel) = self.coordinator.begin_run()?;
        engine_logging::set_run_id(run_id);
        engine_info!(
            "starting comparison of {} with {} workers",
            root.display(),
            workers
        );

        let plan = RunPlan {
            root,
            workers,
            settings: self.settings.clone(),
            log,
            cancel,
        };
        if self.cmd_tx.send(EngineCommand::Start(plan)).is_err() {
            self.coordinator.abandon_run();
            return Err(EngineError::Disconnected);
        }
        Ok(())
    }

    /// Requests the active run to stop. `EngineEvent::Idle` follows once it has wound down.
    pub fn stop(&self) {
        self.coordinator.request_stop();
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.coordinator.request_stop();
    }
}

async fn run_comparison(
    plan: RunPlan,
    coordinator: Arc<Coordinator>,
    events: Arc<dyn EventSink>,
) {
    let RunPlan {
        root,
        workers,
        settings,
        log,
        cancel,
    } = plan;

    let sink = Arc::new(ResultSink::new(
        log,
        settings.similarity_threshold,
        events.clone(),
    ));
    let (queue_tx, queue_rx) = path_queue(settings.queue_capacity);
    let pool = WorkerPool::new(
        workers,
        settings.max_table_cells,
        sink.clone(),
        events.clone(),
        coordinator.clone(),
        cancel.clone(),
    );

    let walker = Walker::new(root, settings, sink.clone(), events, cancel.clone());
    let runtime = Handle::current();
    let walker_task = tokio::task::spawn_blocking(move || walker.run(queue_tx, runtime));
    let mut dispatcher_task = tokio::spawn(dispatch(
        queue_rx,
        pool.clone(),
        cancel.clone(),
        coordinator.clone(),
    ));

    match walker_task.await {
        Ok(true) => coordinator.request_stop(),
        Ok(false) => {}
        Err(err) => {
            engine_error!("walker task failed: {}", err);
            coordinator.request_stop();
        }
    }

    let dispatched = tokio::select! {
        _ = cancel.cancelled() => dispatcher_task.await,
        joined = &mut dispatcher_task => joined,
    };
    if let Err(err) = dispatched {
        engine_error!("dispatcher task failed: {}", err);
        coordinator.request_stop();
    }

    cancel.cancelled().await;
    pool.shutdown().await;

    let counters = sink.counters();
    engine_info!(
        "run finished: {} files, {}/{} comparisons",
        counters.discovered,
        counters.completed,
        counters.estimated_total
    );
    coordinator.finish_run();
}
