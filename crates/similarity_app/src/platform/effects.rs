use std::time::Duration;

use engine_logging::{engine_info, engine_warn};
use similarity_core::{Effect, Msg, ResultRow};
use similarity_engine::{reset_log, EngineEvent, EngineHandle, EngineSettings};

/// Executes core effects against the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(settings: EngineSettings) -> anyhow::Result<Self> {
        let engine = EngineHandle::new(settings)?;
        Ok(Self { engine })
    }

    /// Returns follow-up messages for effects that failed synchronously.
    pub fn run(&self, effects: Vec<Effect>) -> Vec<Msg> {
        let mut feedback = Vec::new();
        for effect in effects {
            match effect {
                Effect::ResetLog => {
                    let path = &self.engine.settings().log_path;
                    if let Err(err) = reset_log(path) {
                        engine_warn!("ResetLog failed: {}", err);
                        feedback.push(Msg::ErrorRaised(err.to_string()));
                    }
                }
                Effect::StartComparison { root, workers } => {
                    engine_info!(
                        "StartComparison root={} workers={}",
                        root.display(),
                        workers
                    );
                    if let Err(err) = self.engine.start(root, workers) {
                        engine_warn!("StartComparison rejected: {}", err);
                        feedback.push(Msg::StartRejected(err.to_string()));
                    }
                }
                Effect::StopComparison => {
                    engine_info!("StopComparison");
                    self.engine.stop();
                }
            }
        }
        feedback
    }

    pub fn poll(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).map(map_event)
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Error(message) => Msg::ErrorRaised(message),
        EngineEvent::ResultFound(result) => Msg::ResultAdded(ResultRow {
            file_a: result.file_a.display().to_string(),
            file_b: result.file_b.display().to_string(),
            similarity: result.similarity,
        }),
        EngineEvent::Progress(fraction) => Msg::ProgressUpdated(fraction),
        EngineEvent::Idle => Msg::EngineIdle,
    }
}
