//! Data types for the upload flow.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chunkdrop_protocol::FinalizedFile;
use chunkdrop_protocol::constants::{CHUNK_SIZE, MAX_CONCURRENT_UPLOADS};
use chunkdrop_transfer::{FailureKind, RetryPolicy, UploadTask, ValidationError, Validator};
use tokio::sync::mpsc;

/// Event emitted while a batch runs.
///
/// Every per-file event carries the task index, the file's position in the
/// submitted list.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    /// A file was refused before a task was created for it.
    Rejected {
        task_index: usize,
        name: String,
        reason: ValidationError,
    },
    /// A session started and generated its upload id.
    TaskStarted {
        task_index: usize,
        name: String,
        upload_id: String,
        total_chunks: u64,
    },
    /// Human-readable status line for one task.
    Status { task_index: usize, message: String },
    /// Chunk-level progress of one task.
    Progress {
        task_index: usize,
        chunks_done: u64,
        total_chunks: u64,
    },
    /// The server assembled the file.
    TaskCompleted {
        task_index: usize,
        file: FinalizedFile,
    },
    /// The task failed for good.
    TaskFailed {
        task_index: usize,
        kind: FailureKind,
        error: String,
    },
    /// Emitted after every task reaches a terminal state.
    BatchProgress { completed: usize, total: usize },
}

impl UploadEvent {
    /// `Status` and `Progress` fire once per chunk; every other event fires
    /// at most a few times per file.
    pub fn is_chunk_level(&self) -> bool {
        matches!(
            self,
            UploadEvent::Status { .. } | UploadEvent::Progress { .. }
        )
    }
}

/// Sending half of a batch's event stream.
///
/// The channel is unbounded so a slow subscriber never stalls an upload.
/// Chunk-level events are dropped while nobody has subscribed, which keeps
/// an unread stream bounded by the number of files.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<UploadEvent>,
    subscribed: Arc<AtomicBool>,
}

impl EventSender {
    /// A sender whose receiver is already being read.
    pub fn new(tx: mpsc::UnboundedSender<UploadEvent>) -> Self {
        Self::with_subscription(tx, Arc::new(AtomicBool::new(true)))
    }

    /// A sender gated on `subscribed`.
    pub fn with_subscription(
        tx: mpsc::UnboundedSender<UploadEvent>,
        subscribed: Arc<AtomicBool>,
    ) -> Self {
        Self { tx, subscribed }
    }

    pub fn send(&self, event: UploadEvent) {
        if event.is_chunk_level() && !self.subscribed.load(Ordering::Acquire) {
            return;
        }
        // Nobody listening is fine.
        let _ = self.tx.send(event);
    }
}

/// A file refused by validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Position in the submitted list.
    pub task_index: usize,
    pub name: String,
    pub reason: ValidationError,
}

/// Final result of a batch.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub completed: usize,
    pub failed: usize,
    /// Accepted files, one task each.
    pub total: usize,
    pub rejected: Vec<Rejection>,
    /// Terminal state of every task, in submission order.
    pub tasks: Vec<UploadTask>,
}

impl BatchOutcome {
    /// Every accepted file was uploaded.
    pub fn is_complete(&self) -> bool {
        self.completed == self.total
    }

    /// At least one accepted file did not complete.
    pub fn is_partial_failure(&self) -> bool {
        self.completed < self.total
    }
}

/// Settings for an [`Uploader`](crate::Uploader).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploaderConfig {
    /// Files uploaded at the same time.
    pub concurrency: usize,
    /// Retry policy for each chunk.
    pub retry: RetryPolicy,
    /// Pre-submission checks.
    pub validator: Validator,
    /// Chunk size in bytes. Must match the server's.
    pub chunk_size: u64,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            concurrency: MAX_CONCURRENT_UPLOADS,
            retry: RetryPolicy::default(),
            validator: Validator::default(),
            chunk_size: CHUNK_SIZE,
        }
    }
}
