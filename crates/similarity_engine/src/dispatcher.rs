use std::path::PathBuf;
use std::sync::Arc;

use engine_logging::{engine_debug, engine_info};
use tokio_util::sync::CancellationToken;

use crate::engine::Coordinator;
use crate::pool::{ComparisonJob, WorkerPool};
use crate::queue::{QueueError, QueueItem, QueueReceiver};

/// Drains the path queue, pairing each new file with every file seen before it.
///
/// Over a run with `n` files this submits `n * (n - 1) / 2` jobs: each
/// unordered pair once, never a file with itself. Returns the number of files
/// seen.
pub(crate) async fn dispatch(
    mut queue: QueueReceiver,
    pool: WorkerPool,
    cancel: CancellationToken,
    coordinator: Arc<Coordinator>,
) -> usize {
    let mut seen: Vec<PathBuf> = Vec::new();
    let mut submitted = 0usize;

    loop {
        match queue.pop(&cancel).await {
            Ok(QueueItem::File(file)) => {
                for previous in &seen {
                    let job = ComparisonJob {
                        file_a: previous.clone(),
                        file_b: file.clone(),
                    };
                    if !pool.submit(job) {
                        break;
                    }
                    submitted += 1;
                }
                seen.push(file);
            }
            Ok(QueueItem::EndOfStream) => {
                engine_info!(
                    "dispatcher reached end of stream: {} files, {} jobs",
                    seen.len(),
                    submitted
                );
                if seen.is_empty() {
                    coordinator.request_stop();
                }
                break;
            }
            Err(QueueError::Cancelled) | Err(QueueError::Closed) => {
                engine_debug!("dispatcher interrupted after {} files", seen.len());
                coordinator.request_stop();
                break;
            }
        }
    }

    seen.len()
}
