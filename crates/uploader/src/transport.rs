//! Transport seam between upload sessions and the server.

use std::future::Future;
use std::pin::Pin;

use chunkdrop_protocol::{
    CheckChunksRequest, CheckChunksResponse, FinalizeUploadRequest, FinalizeUploadResponse,
    UploadChunkRequest, UploadChunkResponse,
};

use crate::error::ProtocolError;

/// Boxed future returned by [`ChunkTransport`] calls.
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ProtocolError>> + Send + 'a>>;

/// The three calls of the chunk upload protocol.
///
/// Implementations decode the response and turn any non-success status,
/// unparsable body or in-band `error` field into a [`ProtocolError`]. None
/// of them retries; retrying is the session's job.
pub trait ChunkTransport: Send + Sync {
    /// Asks which chunk indices the server already holds for an upload.
    fn check_chunks(&self, request: CheckChunksRequest) -> TransportFuture<'_, CheckChunksResponse>;

    /// Sends one chunk's bytes with its metadata.
    fn send_chunk(
        &self,
        request: UploadChunkRequest,
        data: Vec<u8>,
    ) -> TransportFuture<'_, UploadChunkResponse>;

    /// Asks the server to assemble the upload.
    fn finalize(&self, request: FinalizeUploadRequest) -> TransportFuture<'_, FinalizeUploadResponse>;
}
