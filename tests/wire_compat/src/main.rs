fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use chunkdrop_protocol::{
        CheckChunksResponse, ChunkStatus, ErrorResponse, FinalizeUploadRequest,
        FinalizeUploadResponse, ServerReply, UploadChunkRequest, UploadChunkResponse,
    };

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        let path = fixtures_dir().join(name);
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        serde_json::from_str(&data)
            .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", path.display()))
    }

    fn parse_fixture<T: serde::de::DeserializeOwned>(name: &str) -> T {
        serde_json::from_value(load_fixture(name))
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"))
    }

    /// Deserializes a fixture, re-serializes it, and compares the JSON values.
    fn roundtrip_test<T>(name: &str)
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));
        assert_eq!(
            fixture, reserialized,
            "roundtrip mismatch for {name}:\n  server: {fixture}\n  client: {reserialized}"
        );
    }

    // --- check_chunks ---

    #[test]
    fn check_chunks_lists_stored_indices() {
        roundtrip_test::<CheckChunksResponse>("check_chunks_uploaded.json");
        let resp: CheckChunksResponse = parse_fixture("check_chunks_uploaded.json");
        assert_eq!(resp.uploaded, [0, 1, 2]);
        assert!(resp.error_message().is_none());
    }

    #[test]
    fn check_chunks_fresh_upload() {
        roundtrip_test::<CheckChunksResponse>("check_chunks_empty.json");
        let resp: CheckChunksResponse = parse_fixture("check_chunks_empty.json");
        assert!(resp.uploaded.is_empty());
    }

    #[test]
    fn check_chunks_rejected_id() {
        let resp: CheckChunksResponse = parse_fixture("check_chunks_invalid_id.json");
        assert_eq!(resp.error_message(), Some("Invalid upload ID format"));
    }

    // --- upload_chunk ---

    #[test]
    fn upload_chunk_request_fields() {
        roundtrip_test::<UploadChunkRequest>("upload_chunk_request.json");
        let req: UploadChunkRequest = parse_fixture("upload_chunk_request.json");
        let fields = req.form_fields();
        assert_eq!(fields[0], ("upload_id", "1700000000000_k3j9x2q_report.pdf".to_string()));
        assert_eq!(fields[1], ("chunk_index", "2".to_string()));
        assert_eq!(fields[2], ("total_chunks", "3".to_string()));
        assert_eq!(fields[3], ("filename", "report.pdf".to_string()));
    }

    #[test]
    fn upload_chunk_partial_reply() {
        roundtrip_test::<UploadChunkResponse>("upload_chunk_partial.json");
        let resp: UploadChunkResponse = parse_fixture("upload_chunk_partial.json");
        assert_eq!(resp.status, Some(ChunkStatus::Partial));
        assert_eq!(resp.received_chunk, Some(3));
        assert!(resp.error_message().is_none());
    }

    #[test]
    fn upload_chunk_completed_reply() {
        roundtrip_test::<UploadChunkResponse>("upload_chunk_completed.json");
        let resp: UploadChunkResponse = parse_fixture("upload_chunk_completed.json");
        assert_eq!(resp.status, Some(ChunkStatus::Completed));
        assert_eq!(resp.filename.as_deref(), Some("report.pdf"));
        assert!(resp.error_message().is_none());
    }

    #[test]
    fn upload_chunk_server_error_reply() {
        roundtrip_test::<UploadChunkResponse>("upload_chunk_server_error.json");
        let resp: UploadChunkResponse = parse_fixture("upload_chunk_server_error.json");
        assert_eq!(resp.status, Some(ChunkStatus::Error));
        assert_eq!(resp.error_message(), Some("Server error"));
    }

    #[test]
    fn upload_chunk_validation_error() {
        let resp: UploadChunkResponse = parse_fixture("upload_chunk_invalid_index.json");
        assert_eq!(resp.error_message(), Some("Invalid chunk index"));

        let err: ErrorResponse = parse_fixture("upload_chunk_invalid_index.json");
        assert_eq!(err.description(), Some("Invalid chunk index"));
    }

    // --- finalize_upload ---

    #[test]
    fn finalize_request_fields() {
        roundtrip_test::<FinalizeUploadRequest>("finalize_request.json");
        let req: FinalizeUploadRequest = parse_fixture("finalize_request.json");
        assert_eq!(req.total_chunks, 3);
    }

    #[test]
    fn finalize_success_reply() {
        roundtrip_test::<FinalizeUploadResponse>("finalize_success.json");
        let resp: FinalizeUploadResponse = parse_fixture("finalize_success.json");
        assert!(resp.error_message().is_none());
        assert_eq!(resp.status.as_deref(), Some("success"));
        assert_eq!(resp.file_path.as_deref(), Some("/uploads/report.pdf"));
        assert_eq!(resp.file_size, Some(2_621_440));
    }

    #[test]
    fn finalize_error_replies() {
        for (name, expected) in [
            (
                "finalize_incomplete.json",
                "Incomplete upload: 2/3 chunks uploaded",
            ),
            ("finalize_not_found.json", "No file or chunks found"),
            (
                "finalize_merge_failed.json",
                "Failed to merge chunks: Missing chunk 1",
            ),
        ] {
            let resp: FinalizeUploadResponse = parse_fixture(name);
            assert_eq!(resp.error_message(), Some(expected), "{name}");
            assert!(resp.file_path.is_none(), "{name}");

            let err: ErrorResponse = parse_fixture(name);
            assert_eq!(err.description(), Some(expected), "{name}");
        }
    }
}
