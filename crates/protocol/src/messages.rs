use serde::{Deserialize, Serialize};

use crate::constants::fields;

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// Asks the server which chunks of an upload it already holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckChunksRequest {
    pub upload_id: String,
}

/// Metadata sent alongside the binary `file` part of one chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadChunkRequest {
    pub upload_id: String,
    pub chunk_index: u64,
    pub total_chunks: u64,
    pub filename: String,
}

impl UploadChunkRequest {
    /// Text fields of the multipart body, in the order the server reads them.
    pub fn form_fields(&self) -> [(&'static str, String); 4] {
        [
            (fields::UPLOAD_ID, self.upload_id.clone()),
            (fields::CHUNK_INDEX, self.chunk_index.to_string()),
            (fields::TOTAL_CHUNKS, self.total_chunks.to_string()),
            (fields::FILENAME, self.filename.clone()),
        ]
    }
}

/// Asks the server to assemble every received chunk into the final file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizeUploadRequest {
    pub upload_id: String,
    pub filename: String,
    pub total_chunks: u64,
}

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

/// Implemented by every response body that can carry an in-band error.
///
/// The server sometimes answers 2xx with an `error` field, so a success
/// status alone does not mean the request succeeded.
pub trait ServerReply {
    /// Returns the error reported by the server, if any.
    fn error_message(&self) -> Option<&str>;
}

/// Response of `/check_chunks`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckChunksResponse {
    #[serde(default)]
    pub uploaded: Vec<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServerReply for CheckChunksResponse {
    fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Server-side state reported after a chunk is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkStatus {
    /// Chunk stored, others still missing.
    Partial,
    /// Every chunk present; the server assembled the file eagerly.
    Completed,
    /// The server failed while handling the chunk.
    Error,
    #[serde(other)]
    Unknown,
}

/// Response of `/upload_chunk`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadChunkResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ChunkStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_chunk: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServerReply for UploadChunkResponse {
    fn error_message(&self) -> Option<&str> {
        if let Some(error) = self.error.as_deref() {
            return Some(error);
        }
        if self.status == Some(ChunkStatus::Error) {
            return Some(self.message.as_deref().unwrap_or("server error"));
        }
        None
    }
}

/// Response of `/finalize_upload`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinalizeUploadResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServerReply for FinalizeUploadResponse {
    fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Error body used by the server for rejected or failed requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    /// Best human-readable description carried by the body.
    pub fn description(&self) -> Option<&str> {
        self.error.as_deref().or(self.message.as_deref())
    }
}
