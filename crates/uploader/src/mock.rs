//! Recording transport used by the session, scheduler and uploader tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use chunkdrop_protocol::{
    CheckChunksRequest, CheckChunksResponse, FinalizeUploadRequest, FinalizeUploadResponse,
    UploadChunkRequest, UploadChunkResponse,
};

use crate::error::{ProtocolError, Stage};
use crate::transport::{ChunkTransport, TransportFuture};

/// One `send_chunk` call, failed attempts included.
#[derive(Debug, Clone, PartialEq)]
pub struct SentChunk {
    pub upload_id: String,
    pub index: u64,
    pub total_chunks: u64,
    pub len: usize,
    pub ok: bool,
}

pub struct MockTransport {
    uploaded: Vec<u64>,
    check_error: Option<String>,
    finalize_error: Option<String>,
    /// Chunk index -> failures left before it succeeds.
    chunk_failures: Mutex<HashMap<u64, u32>>,
    /// Files (by sanitized name suffix of the upload id) whose check fails.
    failing_files: Vec<String>,
    latency: Duration,
    finalize_latency: Duration,
    pub checks: Mutex<Vec<String>>,
    pub sends: Mutex<Vec<SentChunk>>,
    pub finalizes: Mutex<Vec<FinalizeUploadRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            uploaded: Vec::new(),
            check_error: None,
            finalize_error: None,
            chunk_failures: Mutex::new(HashMap::new()),
            failing_files: Vec::new(),
            latency: Duration::ZERO,
            finalize_latency: Duration::ZERO,
            checks: Mutex::new(Vec::new()),
            sends: Mutex::new(Vec::new()),
            finalizes: Mutex::new(Vec::new()),
        }
    }

    pub fn with_uploaded(mut self, indices: &[u64]) -> Self {
        self.uploaded = indices.to_vec();
        self
    }

    pub fn failing_check(mut self, message: &str) -> Self {
        self.check_error = Some(message.into());
        self
    }

    pub fn failing_finalize(mut self, message: &str) -> Self {
        self.finalize_error = Some(message.into());
        self
    }

    pub fn failing_chunk(self, index: u64, times: u32) -> Self {
        self.chunk_failures.lock().unwrap().insert(index, times);
        self
    }

    pub fn failing_file(mut self, name: &str) -> Self {
        self.failing_files.push(name.into());
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Holds every finalize call for `latency` before answering.
    pub fn with_finalize_latency(mut self, latency: Duration) -> Self {
        self.finalize_latency = latency;
        self
    }

    /// Successful sends, in order.
    pub fn delivered(&self) -> Vec<SentChunk> {
        self.sends
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.ok)
            .cloned()
            .collect()
    }

    pub fn attempts_for(&self, index: u64) -> usize {
        self.sends
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.index == index)
            .count()
    }

    pub fn finalize_count(&self) -> usize {
        self.finalizes.lock().unwrap().len()
    }

    async fn pause(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

impl ChunkTransport for MockTransport {
    fn check_chunks(&self, request: CheckChunksRequest) -> TransportFuture<'_, CheckChunksResponse> {
        Box::pin(async move {
            self.pause().await;
            self.checks.lock().unwrap().push(request.upload_id.clone());
            if let Some(message) = &self.check_error {
                return Err(ProtocolError::new(Stage::Check, Some(200), message.clone()));
            }
            if self
                .failing_files
                .iter()
                .any(|name| request.upload_id.ends_with(name.as_str()))
            {
                return Err(ProtocolError::new(Stage::Check, Some(500), "storage unavailable"));
            }
            Ok(CheckChunksResponse {
                uploaded: self.uploaded.clone(),
                error: None,
            })
        })
    }

    fn send_chunk(
        &self,
        request: UploadChunkRequest,
        data: Vec<u8>,
    ) -> TransportFuture<'_, UploadChunkResponse> {
        Box::pin(async move {
            self.pause().await;
            let fail = {
                let mut failures = self.chunk_failures.lock().unwrap();
                match failures.get_mut(&request.chunk_index) {
                    Some(left) if *left > 0 => {
                        *left -= 1;
                        true
                    }
                    _ => false,
                }
            };
            self.sends.lock().unwrap().push(SentChunk {
                upload_id: request.upload_id.clone(),
                index: request.chunk_index,
                total_chunks: request.total_chunks,
                len: data.len(),
                ok: !fail,
            });
            if fail {
                return Err(ProtocolError::new(Stage::Upload, Some(500), "Server error"));
            }
            Ok(UploadChunkResponse {
                received_chunk: Some(request.chunk_index),
                ..Default::default()
            })
        })
    }

    fn finalize(&self, request: FinalizeUploadRequest) -> TransportFuture<'_, FinalizeUploadResponse> {
        Box::pin(async move {
            self.pause().await;
            if !self.finalize_latency.is_zero() {
                tokio::time::sleep(self.finalize_latency).await;
            }
            let filename = request.filename.clone();
            self.finalizes.lock().unwrap().push(request);
            if let Some(message) = &self.finalize_error {
                return Err(ProtocolError::new(Stage::Finalize, Some(500), message.clone()));
            }
            Ok(FinalizeUploadResponse {
                status: Some("success".into()),
                file_path: Some(format!("/files/{filename}")),
                filename: Some(filename),
                file_size: None,
                error: None,
            })
        })
    }
}
