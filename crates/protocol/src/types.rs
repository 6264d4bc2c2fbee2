use serde::{Deserialize, Serialize};

/// Lifecycle state of one file in a batch.
///
/// Moves only forward: `Pending → Uploading → {Completed, Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Pending,
    Uploading,
    Completed,
    Failed,
}

impl UploadStatus {
    /// Returns `true` once the task can no longer change state.
    pub fn is_terminal(self) -> bool {
        matches!(self, UploadStatus::Completed | UploadStatus::Failed)
    }

    /// Returns `true` if moving from `self` to `next` respects the lifecycle.
    pub fn can_transition_to(self, next: UploadStatus) -> bool {
        matches!(
            (self, next),
            (UploadStatus::Pending, UploadStatus::Uploading)
                | (UploadStatus::Uploading, UploadStatus::Completed)
                | (UploadStatus::Uploading, UploadStatus::Failed)
        )
    }
}

/// Location of a file the server finished assembling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizedFile {
    /// Server path the file can be fetched from.
    pub path: String,
    /// Name the server stored the file under (sanitized server-side).
    pub name: String,
    /// Assembled size, when the server reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}
