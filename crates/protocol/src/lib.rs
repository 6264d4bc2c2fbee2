//! Wire contract shared with the chunk upload server.
//!
//! Three form-encoded `POST` endpoints: `/check_chunks`, `/upload_chunk`
//! and `/finalize_upload`. Every response is JSON; any of them may carry an
//! `error` field even on a 2xx status.

pub mod constants;
pub mod messages;
pub mod types;

// Re-export primary types for convenience.
pub use messages::{
    ChunkStatus, CheckChunksRequest, CheckChunksResponse, ErrorResponse, FinalizeUploadRequest,
    FinalizeUploadResponse, ServerReply, UploadChunkRequest, UploadChunkResponse,
};
pub use types::{FinalizedFile, UploadStatus};
