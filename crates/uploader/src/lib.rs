//! Resumable chunked upload engine.
//!
//! Splits files into 1 MiB chunks and uploads them to a chunk server,
//! several files at a time. Each file runs one session:
//!
//! 1. **Check** which chunks the server already holds
//! 2. **Transfer** the missing chunks in order, retrying each one
//! 3. **Finalize** so the server assembles the file
//!
//! The engine has no presentation side effects. Callers subscribe to
//! [`UploadEvent`]s through the [`BatchHandle`] returned by
//! [`Uploader::submit_batch`].

pub mod error;
pub mod http;
pub mod scheduler;
pub mod session;
pub mod transport;
pub mod types;
pub mod uploader;

#[cfg(test)]
mod mock;

// Re-export primary types for convenience.
pub use error::{ChunkFailedError, ProtocolError, SessionError, Stage, UploadError};
pub use http::{HttpTransport, decode_response};
pub use scheduler::Scheduler;
pub use session::{SessionContext, UploadSession};
pub use transport::{ChunkTransport, TransportFuture};
pub use types::{BatchOutcome, EventSender, Rejection, UploadEvent, UploaderConfig};
pub use uploader::{BatchHandle, Uploader};

pub use chunkdrop_protocol::FinalizedFile;
