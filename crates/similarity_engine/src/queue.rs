//! Bounded FIFO between the directory walker and the comparison dispatcher.
//!
//! The channel capacity is the only backpressure in the pipeline: the walker
//! parks on a full queue until the dispatcher catches up. Both ends observe a
//! [`CancellationToken`] so a blocked push or pop returns as soon as the run
//! is stopped.

use std::path::PathBuf;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueItem {
    File(PathBuf),
    EndOfStream,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    #[error("queue operation cancelled")]
    Cancelled,
    #[error("queue closed")]
    Closed,
}

/// Creates a queue holding at most `capacity` items.
///
/// # Panics
///
/// Panics if `capacity` is zero; `EngineSettings::validate` rejects that first.
pub fn path_queue(capacity: usize) -> (QueueSender, QueueReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (QueueSender { tx }, QueueReceiver { rx })
}

#[derive(Debug)]
pub struct QueueSender {
    tx: mpsc::Sender<QueueItem>,
}

impl QueueSender {
    /// Waits for free capacity and enqueues one discovered file.
    pub async fn push(&self, path: PathBuf, cancel: &CancellationToken) -> Result<(), QueueError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(QueueError::Cancelled),
            sent = self.tx.send(QueueItem::File(path)) => sent.map_err(|_| QueueError::Closed),
        }
    }

    /// Enqueues the end-of-stream marker. Consumes the sender, so the marker
    /// is always the last item and is sent at most once.
    pub async fn finish(self, cancel: &CancellationToken) -> Result<(), QueueError> {
        if cancel.is_cancelled() {
            return self.finish_now();
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(QueueError::Cancelled),
            sent = self.tx.send(QueueItem::EndOfStream) => sent.map_err(|_| QueueError::Closed),
        }
    }

    /// Best-effort end-of-stream without waiting for capacity.
    pub fn finish_now(self) -> Result<(), QueueError> {
        self.tx.try_send(QueueItem::EndOfStream).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => QueueError::Cancelled,
            mpsc::error::TrySendError::Closed(_) => QueueError::Closed,
        })
    }
}

#[derive(Debug)]
pub struct QueueReceiver {
    rx: mpsc::Receiver<QueueItem>,
}

impl QueueReceiver {
    /// Waits for the next item. A sender dropped without finishing reads as `Closed`.
    pub async fn pop(&mut self, cancel: &CancellationToken) -> Result<QueueItem, QueueError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(QueueError::Cancelled),
            item = self.rx.recv() => item.ok_or(QueueError::Closed),
        }
    }
}
