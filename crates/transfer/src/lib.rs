//! Chunked upload building blocks with resume support and progress tracking.
//!
//! Everything here is transport-agnostic: chunk planning and reading, upload
//! identifiers, pre-submission validation, the bounded retry combinator and
//! the batch/task state that the scheduler and progress views share.

mod batch;
mod chunked;
mod progress;
mod retry;
mod types;
mod upload_id;
mod validation;

pub use batch::{AdmittedTask, Batch, FailureKind, TaskFailure, UploadTask};
pub use chunked::{ChunkPlan, ChunkReader, ChunkSpec};
pub use progress::{BatchProgress, TaskProgress};
pub use retry::{RetryExhausted, RetryNotice, RetryPolicy};
pub use types::{Chunk, ContentSource, FileDescriptor};
pub use upload_id::{MAX_UPLOAD_ID_LEN, UploadId, sanitize_file_name};
pub use validation::{ALLOWED_EXTENSIONS, ValidationError, Validator, is_file_type_allowed};

pub use chunkdrop_protocol::constants::CHUNK_SIZE as DEFAULT_CHUNK_SIZE;

use chunkdrop_protocol::UploadStatus;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("chunk {index} out of range (file has {total} chunks)")]
    ChunkOutOfRange { index: u64, total: u64 },

    #[error("task not found: {0}")]
    TaskNotFound(usize),

    #[error("task {index}: invalid transition {from:?} -> {to:?}")]
    InvalidTransition {
        index: usize,
        from: UploadStatus,
        to: UploadStatus,
    },

    #[error("task {0}: upload id already assigned")]
    UploadIdAlreadyAssigned(usize),
}
