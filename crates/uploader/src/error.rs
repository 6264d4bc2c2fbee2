//! Upload error types.

use std::fmt;

use chunkdrop_transfer::{FailureKind, TransferError};

/// Endpoint a [`ProtocolError`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Check,
    Upload,
    Finalize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Check => "check_chunks",
            Stage::Upload => "upload_chunk",
            Stage::Finalize => "finalize_upload",
        })
    }
}

/// A request to the upload server did not succeed.
///
/// Covers transport failures (no `http_status`), non-2xx statuses,
/// unparsable bodies and in-band `error` fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{stage} failed{}: {message}", status_suffix(.http_status))]
pub struct ProtocolError {
    pub stage: Stage,
    pub http_status: Option<u16>,
    pub message: String,
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl ProtocolError {
    pub fn new(stage: Stage, http_status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            stage,
            http_status,
            message: message.into(),
        }
    }
}

/// One chunk failed on every attempt the retry policy allowed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("chunk {index} failed after {attempts} attempts: {last_message}")]
pub struct ChunkFailedError {
    pub index: u64,
    pub attempts: u32,
    pub last_message: String,
}

/// Terminal failure of one file's upload session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("checking upload state failed: {0}")]
    Check(ProtocolError),

    #[error(transparent)]
    Chunk(#[from] ChunkFailedError),

    #[error("all chunks sent but assembly failed: {0}")]
    Finalize(ProtocolError),

    #[error("reading file failed: {0}")]
    Read(#[from] TransferError),

    #[error("batch state error: {0}")]
    State(TransferError),

    #[error("cancelled")]
    Cancelled,
}

impl SessionError {
    /// Returns `true` if every chunk was stored and only assembly failed.
    pub fn is_finalize_failure(&self) -> bool {
        matches!(self, SessionError::Finalize(_))
    }

    /// Classification recorded on the failed task.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            SessionError::Finalize(_) => FailureKind::Assembly,
            SessionError::Cancelled => FailureKind::Cancelled,
            _ => FailureKind::Transfer,
        }
    }
}

/// Errors creating an uploader.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid server URL: {0}")]
    InvalidServerUrl(String),
}
