use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use engine_logging::{engine_debug, engine_info, engine_warn};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use walkdir::WalkDir;

use crate::events::EventSink;
use crate::queue::QueueSender;
use crate::settings::EngineSettings;
use crate::sink::ResultSink;
use crate::EngineEvent;

/// Producer side of the pipeline. Runs on a blocking thread and bridges into
/// the async queue through the runtime handle.
pub(crate) struct Walker {
    root: PathBuf,
    settings: Arc<EngineSettings>,
    sink: Arc<ResultSink>,
    events: Arc<dyn EventSink>,
    cancel: CancellationToken,
}

impl Walker {
    pub(crate) fn new(
        root: PathBuf,
        settings: Arc<EngineSettings>,
        sink: Arc<ResultSink>,
        events: Arc<dyn EventSink>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            root,
            settings,
            sink,
            events,
            cancel,
        }
    }

    /// Walks the tree, then always attempts the end-of-stream marker.
    /// Returns true when nothing is left to compare once discovery is over.
    pub(crate) fn run(self, queue: QueueSender, runtime: Handle) -> bool {
        let discovered = self.walk(&queue, &runtime);

        if let Err(err) = runtime.block_on(queue.finish(&self.cancel)) {
            engine_debug!("end of stream not delivered: {}", err);
        }
        engine_info!(
            "walker finished {}: {} eligible files",
            self.root.display(),
            discovered
        );
        self.sink.discovery_finished()
    }

    fn walk(&self, queue: &QueueSender, runtime: &Handle) -> u64 {
        let mut discovered = 0;

        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            if self.cancel.is_cancelled() {
                break;
            }
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    self.report(err.to_string());
                    break;
                }
            };
            let len = if entry.file_type().is_file() {
                match entry.metadata() {
                    Ok(meta) => meta.len(),
                    Err(err) => {
                        self.report(format!("{}: {}", entry.path().display(), err));
                        break;
                    }
                }
            } else if entry.path_is_symlink() {
                // Links are not followed into directories, but a link to a
                // regular file counts as that file.
                match fs::metadata(entry.path()) {
                    Ok(meta) if meta.is_file() => meta.len(),
                    Ok(_) => continue,
                    Err(err) => {
                        engine_debug!(
                            "skipping dangling link {}: {}",
                            entry.path().display(),
                            err
                        );
                        continue;
                    }
                }
            } else {
                continue;
            };
            let path = entry.into_path();
            if !self.settings.is_eligible(&path.to_string_lossy(), len) {
                continue;
            }

            self.sink.file_discovered();
            if let Err(err) = runtime.block_on(queue.push(path, &self.cancel)) {
                engine_debug!("walker stopped pushing: {}", err);
                break;
            }
            discovered += 1;
        }

        discovered
    }

    fn report(&self, message: String) {
        engine_warn!("traversal abandoned: {}", message);
        self.events.emit(EngineEvent::Error(message));
    }
}
