use chunkdrop_protocol::UploadStatus;
use serde::Serialize;

use crate::batch::UploadTask;

/// Chunk-level progress of one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskProgress {
    pub task_index: usize,
    pub name: String,
    pub status: UploadStatus,
    pub chunks_done: u64,
    pub total_chunks: u64,
}

impl TaskProgress {
    /// `chunks_done / total_chunks` as a percentage.
    ///
    /// A file with no chunks reads 100 once completed and 0 before.
    pub fn percent(&self) -> f64 {
        if self.total_chunks == 0 {
            return if self.status == UploadStatus::Completed {
                100.0
            } else {
                0.0
            };
        }
        self.chunks_done as f64 / self.total_chunks as f64 * 100.0
    }
}

impl From<&UploadTask> for TaskProgress {
    fn from(task: &UploadTask) -> Self {
        Self {
            task_index: task.task_index,
            name: task.descriptor.name().to_string(),
            status: task.status,
            chunks_done: task.chunks_done,
            total_chunks: task.total_chunks,
        }
    }
}

/// Progress of a whole batch.
///
/// Counted per file: a task contributes only once it is completed, no matter
/// how many of its chunks were sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchProgress {
    pub tasks: Vec<TaskProgress>,
    pub completed: usize,
    pub total: usize,
}

impl BatchProgress {
    /// Builds a progress view over tasks.
    pub fn from_tasks(tasks: &[UploadTask]) -> Self {
        let tasks: Vec<TaskProgress> = tasks.iter().map(TaskProgress::from).collect();
        let completed = tasks
            .iter()
            .filter(|t| t.status == UploadStatus::Completed)
            .count();
        Self {
            total: tasks.len(),
            completed,
            tasks,
        }
    }

    /// `completed / total` as a percentage; 0 for an empty batch.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }
}
