//! Per-file upload session.
//!
//! A session moves one admitted task through
//! `Initializing → Checking → Transferring → Finalizing` and returns the
//! assembled file or the error that ended it. Recording the terminal state
//! on the batch is the scheduler's job.

use std::collections::HashSet;
use std::sync::Arc;

use chunkdrop_protocol::{
    CheckChunksRequest, FinalizeUploadRequest, FinalizeUploadResponse, FinalizedFile,
    UploadChunkRequest,
};
use chunkdrop_transfer::{
    AdmittedTask, Batch, Chunk, ChunkPlan, ChunkReader, FileDescriptor, RetryPolicy, TransferError,
    UploadId,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{ChunkFailedError, ProtocolError, SessionError, Stage};
use crate::transport::ChunkTransport;
use crate::types::{EventSender, UploadEvent};

/// Everything a session needs besides its task. Cheap to clone.
#[derive(Clone)]
pub struct SessionContext {
    pub transport: Arc<dyn ChunkTransport>,
    pub batch: Arc<Batch>,
    pub retry: RetryPolicy,
    pub chunk_size: u64,
    pub events: EventSender,
    pub cancel: CancellationToken,
}

/// Uploads one file.
pub struct UploadSession<'a> {
    ctx: &'a SessionContext,
    task_index: usize,
    descriptor: FileDescriptor,
}

impl<'a> UploadSession<'a> {
    pub fn new(ctx: &'a SessionContext, task: AdmittedTask) -> Self {
        Self {
            ctx,
            task_index: task.task_index,
            descriptor: task.descriptor,
        }
    }

    /// Runs the session to its end.
    ///
    /// `finalize` is called at most once, and only after every chunk index
    /// is either reported present by the server or sent successfully.
    pub async fn run(&self) -> Result<FinalizedFile, SessionError> {
        let name = self.descriptor.name().to_string();

        // Initializing
        self.status(format!("Preparing {name}"));
        self.check_cancelled()?;

        let plan = ChunkPlan::new(self.descriptor.size(), self.ctx.chunk_size);
        let total_chunks = plan.total_chunks();
        let upload_id = UploadId::generate(&name);

        self.ctx
            .batch
            .assign_upload_id(self.task_index, upload_id.clone())
            .map_err(SessionError::State)?;
        self.record_progress(0, total_chunks)?;
        self.emit(UploadEvent::TaskStarted {
            task_index: self.task_index,
            name: name.clone(),
            upload_id: upload_id.to_string(),
            total_chunks,
        });
        info!(
            task = self.task_index,
            upload_id = %upload_id,
            file = %name,
            size = self.descriptor.size(),
            total_chunks,
            "upload session started"
        );

        // Checking
        self.status(format!("Checking upload state of {name}"));
        let check = self
            .ctx
            .transport
            .check_chunks(CheckChunksRequest {
                upload_id: upload_id.to_string(),
            })
            .await
            .map_err(SessionError::Check)?;
        let already_uploaded: HashSet<u64> = check
            .uploaded
            .into_iter()
            .filter(|&i| i < total_chunks)
            .collect();
        if !already_uploaded.is_empty() {
            debug!(
                upload_id = %upload_id,
                present = already_uploaded.len(),
                "resuming upload"
            );
        }

        // Transferring
        let missing = total_chunks - already_uploaded.len() as u64;
        self.status(format!("Starting upload of {missing} chunks"));

        let mut reader = self.open_reader().await?;
        let mut chunks_done = 0;
        for index in 0..total_chunks {
            self.check_cancelled()?;

            if !already_uploaded.contains(&index) {
                let (r, chunk) = read_chunk(reader, index).await?;
                reader = r;

                self.status(format!("Uploading chunk {}/{}", index + 1, total_chunks));
                self.send_with_retry(&upload_id, &name, index, total_chunks, chunk.data)
                    .await?;
                debug!(upload_id = %upload_id, chunk = index, total_chunks, "chunk sent");
            }

            chunks_done += 1;
            self.record_progress(chunks_done, total_chunks)?;
        }

        // Finalizing
        self.check_cancelled()?;
        self.status("All chunks sent, finalizing".to_string());
        let response = self
            .ctx
            .transport
            .finalize(FinalizeUploadRequest {
                upload_id: upload_id.to_string(),
                filename: name.clone(),
                total_chunks,
            })
            .await
            .map_err(SessionError::Finalize)?;
        let file = finalized_file(response, &name).map_err(SessionError::Finalize)?;

        self.status(format!("Finished {name}"));
        info!(upload_id = %upload_id, path = %file.path, "upload session finished");
        Ok(file)
    }

    async fn open_reader(&self) -> Result<ChunkReader, SessionError> {
        let descriptor = self.descriptor.clone();
        let chunk_size = self.ctx.chunk_size;
        let reader = tokio::task::spawn_blocking(move || ChunkReader::open(&descriptor, chunk_size))
            .await
            .map_err(join_error)??;
        Ok(reader)
    }

    /// Sends one chunk through the retry policy. Cancellation interrupts
    /// both in-flight attempts and retry delays.
    async fn send_with_retry(
        &self,
        upload_id: &UploadId,
        name: &str,
        index: u64,
        total_chunks: u64,
        data: Vec<u8>,
    ) -> Result<(), SessionError> {
        let request = UploadChunkRequest {
            upload_id: upload_id.to_string(),
            chunk_index: index,
            total_chunks,
            filename: name.to_string(),
        };
        let transport = &self.ctx.transport;

        let attempts = self.ctx.retry.run(
            |attempt| {
                if attempt > 1 {
                    debug!(upload_id = %upload_id, chunk = index, attempt, "retrying chunk");
                }
                transport.send_chunk(request.clone(), data.clone())
            },
            |notice| {
                warn!(
                    upload_id = %upload_id,
                    chunk = index,
                    retry = notice.retry,
                    error = %notice.error,
                    "chunk failed, retrying"
                );
                self.status(format!(
                    "Chunk {} failed, retrying ({}/{})",
                    index + 1,
                    notice.retry,
                    notice.max_retries
                ));
            },
        );

        tokio::select! {
            biased;
            _ = self.ctx.cancel.cancelled() => Err(SessionError::Cancelled),
            result = attempts => result.map(|_| ()).map_err(|exhausted| {
                SessionError::Chunk(ChunkFailedError {
                    index,
                    attempts: exhausted.attempts,
                    last_message: exhausted.last_error.message,
                })
            }),
        }
    }

    fn record_progress(&self, chunks_done: u64, total_chunks: u64) -> Result<(), SessionError> {
        self.ctx
            .batch
            .record_progress(self.task_index, chunks_done, total_chunks)
            .map_err(SessionError::State)?;
        self.emit(UploadEvent::Progress {
            task_index: self.task_index,
            chunks_done,
            total_chunks,
        });
        Ok(())
    }

    fn check_cancelled(&self) -> Result<(), SessionError> {
        if self.ctx.cancel.is_cancelled() {
            Err(SessionError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn status(&self, message: String) {
        self.emit(UploadEvent::Status {
            task_index: self.task_index,
            message,
        });
    }

    fn emit(&self, event: UploadEvent) {
        self.ctx.events.send(event);
    }
}

/// Reads one chunk on the blocking pool, handing the reader back.
async fn read_chunk(
    mut reader: ChunkReader,
    index: u64,
) -> Result<(ChunkReader, Chunk), SessionError> {
    let (reader, chunk) = tokio::task::spawn_blocking(move || {
        let chunk = reader.read_chunk(index);
        (reader, chunk)
    })
    .await
    .map_err(join_error)?;
    Ok((reader, chunk?))
}

fn join_error(err: tokio::task::JoinError) -> SessionError {
    SessionError::Read(TransferError::Io(std::io::Error::other(err)))
}

/// Extracts the assembled file from a finalize response.
fn finalized_file(
    response: FinalizeUploadResponse,
    requested_name: &str,
) -> Result<FinalizedFile, ProtocolError> {
    let path = response.file_path.ok_or_else(|| {
        ProtocolError::new(Stage::Finalize, None, "response is missing file_path")
    })?;
    Ok(FinalizedFile {
        path,
        name: response
            .filename
            .unwrap_or_else(|| requested_name.to_string()),
        size: response.file_size,
    })
}
