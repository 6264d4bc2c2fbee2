use std::time::Duration;

/// Size of every chunk except possibly the last one (1 MiB).
///
/// Shared with the server; chunk indices are only meaningful if both sides
/// agree on this value.
pub const CHUNK_SIZE: u64 = 1024 * 1024;

/// Largest file the server accepts (300 GiB).
pub const MAX_FILE_SIZE: u64 = 300 * 1024 * 1024 * 1024;

/// Retries allowed for one chunk after its first attempt fails.
pub const MAX_RETRIES: u32 = 3;

/// Pause between two attempts of the same chunk.
pub const RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Number of files uploaded at the same time.
pub const MAX_CONCURRENT_UPLOADS: usize = 3;

/// Endpoint reporting which chunks of an upload the server already holds.
pub const CHECK_CHUNKS_PATH: &str = "check_chunks";

/// Endpoint receiving one chunk.
pub const UPLOAD_CHUNK_PATH: &str = "upload_chunk";

/// Endpoint assembling the received chunks into the final file.
pub const FINALIZE_UPLOAD_PATH: &str = "finalize_upload";

/// Form field names used by the three endpoints.
pub mod fields {
    pub const UPLOAD_ID: &str = "upload_id";
    pub const CHUNK_INDEX: &str = "chunk_index";
    pub const TOTAL_CHUNKS: &str = "total_chunks";
    pub const FILENAME: &str = "filename";
    pub const FILE: &str = "file";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_file_size_is_300_gib() {
        assert_eq!(MAX_FILE_SIZE, 322_122_547_200);
    }

    #[test]
    fn chunk_size_divides_max_file_size() {
        assert_eq!(MAX_FILE_SIZE % CHUNK_SIZE, 0);
    }
}
