//! HTTP transport for the chunk upload server.
//!
//! `/check_chunks` and `/finalize_upload` are sent form-urlencoded,
//! `/upload_chunk` as multipart with the chunk in the `file` part.

use chunkdrop_protocol::constants::{
    CHECK_CHUNKS_PATH, FINALIZE_UPLOAD_PATH, UPLOAD_CHUNK_PATH, fields,
};
use chunkdrop_protocol::{
    CheckChunksRequest, CheckChunksResponse, ErrorResponse, FinalizeUploadRequest,
    FinalizeUploadResponse, ServerReply, UploadChunkRequest, UploadChunkResponse,
};
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;

use crate::error::{ProtocolError, Stage, UploadError};
use crate::transport::{ChunkTransport, TransportFuture};

/// [`ChunkTransport`] over HTTP using `reqwest`.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Creates a transport for the server at `server_url`.
    pub fn new(server_url: &str) -> Result<Self, UploadError> {
        let http = reqwest::Client::builder().build()?;
        Self::with_client(http, server_url)
    }

    /// Creates a transport reusing an existing client.
    pub fn with_client(http: reqwest::Client, server_url: &str) -> Result<Self, UploadError> {
        let trimmed = server_url.trim();
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(UploadError::InvalidServerUrl(server_url.to_string()));
        }
        let base_url = if trimmed.ends_with('/') {
            trimmed.to_string()
        } else {
            format!("{trimmed}/")
        };
        Ok(Self { http, base_url })
    }

    /// Base URL every endpoint is resolved against, with a trailing `/`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl ChunkTransport for HttpTransport {
    fn check_chunks(&self, request: CheckChunksRequest) -> TransportFuture<'_, CheckChunksResponse> {
        Box::pin(async move {
            let resp = self
                .http
                .post(self.endpoint(CHECK_CHUNKS_PATH))
                .form(&request)
                .send()
                .await
                .map_err(|e| transport_error(Stage::Check, e))?;
            read_reply(Stage::Check, resp).await
        })
    }

    fn send_chunk(
        &self,
        request: UploadChunkRequest,
        data: Vec<u8>,
    ) -> TransportFuture<'_, UploadChunkResponse> {
        Box::pin(async move {
            let mut form = Form::new();
            for (name, value) in request.form_fields() {
                form = form.text(name, value);
            }
            let part = Part::bytes(data).file_name(request.filename.clone());
            form = form.part(fields::FILE, part);

            let resp = self
                .http
                .post(self.endpoint(UPLOAD_CHUNK_PATH))
                .multipart(form)
                .send()
                .await
                .map_err(|e| transport_error(Stage::Upload, e))?;
            read_reply(Stage::Upload, resp).await
        })
    }

    fn finalize(&self, request: FinalizeUploadRequest) -> TransportFuture<'_, FinalizeUploadResponse> {
        Box::pin(async move {
            let resp = self
                .http
                .post(self.endpoint(FINALIZE_UPLOAD_PATH))
                .form(&request)
                .send()
                .await
                .map_err(|e| transport_error(Stage::Finalize, e))?;
            read_reply(Stage::Finalize, resp).await
        })
    }
}

fn transport_error(stage: Stage, err: reqwest::Error) -> ProtocolError {
    ProtocolError::new(stage, err.status().map(|s| s.as_u16()), err.to_string())
}

async fn read_reply<T>(stage: Stage, resp: reqwest::Response) -> Result<T, ProtocolError>
where
    T: DeserializeOwned + ServerReply,
{
    let status = resp.status().as_u16();
    let body = resp
        .text()
        .await
        .map_err(|e| ProtocolError::new(stage, Some(status), e.to_string()))?;
    decode_response(stage, status, &body)
}

/// Decodes a server response for `stage`.
///
/// A non-2xx status is always an error; its message comes from the JSON
/// error body, else the raw body text, else the status reason. A 2xx body
/// must parse and carry no in-band error.
pub fn decode_response<T>(stage: Stage, status: u16, body: &str) -> Result<T, ProtocolError>
where
    T: DeserializeOwned + ServerReply,
{
    if !(200..300).contains(&status) {
        return Err(ProtocolError::new(stage, Some(status), error_text(status, body)));
    }

    let reply: T = serde_json::from_str(body).map_err(|e| {
        ProtocolError::new(stage, Some(status), format!("invalid response body: {e}"))
    })?;

    if let Some(message) = reply.error_message() {
        return Err(ProtocolError::new(stage, Some(status), message));
    }
    Ok(reply)
}

fn error_text(status: u16, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(body)
        && let Some(description) = parsed.description()
    {
        return description.to_string();
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }

    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("request failed")
        .to_string()
}
