//! Batch submission entry point.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chunkdrop_transfer::{Batch, BatchProgress, FileDescriptor, UploadTask};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::error::UploadError;
use crate::http::HttpTransport;
use crate::scheduler::Scheduler;
use crate::session::SessionContext;
use crate::transport::ChunkTransport;
use crate::types::{BatchOutcome, EventSender, Rejection, UploadEvent, UploaderConfig};

/// Validates files and uploads them as a batch.
pub struct Uploader {
    transport: Arc<dyn ChunkTransport>,
    config: UploaderConfig,
}

impl Uploader {
    /// Creates an uploader over any transport.
    pub fn new(transport: Arc<dyn ChunkTransport>, config: UploaderConfig) -> Self {
        Self { transport, config }
    }

    /// Creates an uploader talking HTTP to `server_url`.
    pub fn http(server_url: &str, config: UploaderConfig) -> Result<Self, UploadError> {
        let transport = HttpTransport::new(server_url)?;
        Ok(Self::new(Arc::new(transport), config))
    }

    pub fn config(&self) -> &UploaderConfig {
        &self.config
    }

    /// Validates `files` and starts uploading the accepted ones.
    ///
    /// Rejected files get no task and cause no network call. Task indices
    /// are positions in `files`, so they stay stable across rejections.
    /// Must be called from within a tokio runtime.
    pub fn submit_batch(&self, files: Vec<FileDescriptor>) -> BatchHandle {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let subscribed = Arc::new(AtomicBool::new(false));
        let events = EventSender::with_subscription(events_tx, Arc::clone(&subscribed));
        let mut tasks = Vec::with_capacity(files.len());
        let mut rejected = Vec::new();

        for (task_index, file) in files.into_iter().enumerate() {
            match self.config.validator.validate(&file) {
                Ok(()) => tasks.push(UploadTask::new(task_index, file)),
                Err(reason) => {
                    warn!(task = task_index, file = %file.name(), reason = %reason, "file rejected");
                    events.send(UploadEvent::Rejected {
                        task_index,
                        name: file.name().to_string(),
                        reason: reason.clone(),
                    });
                    rejected.push(Rejection {
                        task_index,
                        name: file.name().to_string(),
                        reason,
                    });
                }
            }
        }

        info!(
            accepted = tasks.len(),
            rejected = rejected.len(),
            concurrency = self.config.concurrency,
            "batch submitted"
        );

        let batch = Arc::new(Batch::new(tasks));
        let cancel = CancellationToken::new();
        let ctx = SessionContext {
            transport: Arc::clone(&self.transport),
            batch: Arc::clone(&batch),
            retry: self.config.retry,
            chunk_size: self.config.chunk_size,
            events,
            cancel: cancel.clone(),
        };
        let scheduler = Scheduler::new(self.config.concurrency);
        let join = tokio::spawn(async move { scheduler.run(ctx).await });

        BatchHandle {
            batch,
            rejected,
            events_rx: Some(events_rx),
            subscribed,
            cancel,
            join,
        }
    }
}

/// A running batch.
///
/// The event channel closes once every task is terminal.
pub struct BatchHandle {
    batch: Arc<Batch>,
    rejected: Vec<Rejection>,
    events_rx: Option<mpsc::UnboundedReceiver<UploadEvent>>,
    subscribed: Arc<AtomicBool>,
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl BatchHandle {
    /// Takes the event receiver. Can only be called once.
    ///
    /// Until then only lifecycle events are queued; `Status` and `Progress`
    /// sent before subscribing are dropped. [`progress`](Self::progress)
    /// always reflects the current state.
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<UploadEvent>> {
        let events = self.events_rx.take();
        if events.is_some() {
            self.subscribed.store(true, Ordering::Release);
        }
        events
    }

    /// Stops the batch. Running sessions stop before their next chunk and
    /// never finalize; pending tasks fail as cancelled.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token tripped by [`cancel`](Self::cancel).
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Current progress of every task and of the batch.
    pub fn progress(&self) -> BatchProgress {
        self.batch.progress()
    }

    /// Files refused before upload.
    pub fn rejected(&self) -> &[Rejection] {
        &self.rejected
    }

    /// Waits until every task is terminal and returns the outcome.
    pub async fn wait(self) -> BatchOutcome {
        if let Err(e) = self.join.await {
            error!(error = %e, "batch runner stopped unexpectedly");
        }
        BatchOutcome {
            completed: self.batch.completed_count(),
            failed: self.batch.failed_count(),
            total: self.batch.len(),
            rejected: self.rejected,
            tasks: self.batch.snapshot(),
        }
    }
}
