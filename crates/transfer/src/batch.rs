use std::sync::RwLock;

use chunkdrop_protocol::{FinalizedFile, UploadStatus};
use tracing::debug;

use crate::progress::BatchProgress;
use crate::types::FileDescriptor;
use crate::upload_id::UploadId;
use crate::TransferError;

/// Which phase a task failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Checking state or sending a chunk failed.
    Transfer,
    /// Every chunk was sent but the server could not assemble the file.
    Assembly,
    /// The batch was cancelled before the task finished.
    Cancelled,
}

/// Terminal failure of one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl TaskFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// One file's unit of work within a batch.
#[derive(Debug, Clone)]
pub struct UploadTask {
    /// Position in the submitted file list.
    pub task_index: usize,
    pub descriptor: FileDescriptor,
    pub status: UploadStatus,
    /// Assigned once, when the session starts.
    pub upload_id: Option<UploadId>,
    pub chunks_done: u64,
    pub total_chunks: u64,
    pub result: Option<FinalizedFile>,
    pub failure: Option<TaskFailure>,
}

impl UploadTask {
    /// Creates a pending task.
    pub fn new(task_index: usize, descriptor: FileDescriptor) -> Self {
        Self {
            task_index,
            descriptor,
            status: UploadStatus::Pending,
            upload_id: None,
            chunks_done: 0,
            total_chunks: 0,
            result: None,
            failure: None,
        }
    }
}

/// A task handed to a worker by [`Batch::admit_next`].
#[derive(Debug, Clone)]
pub struct AdmittedTask {
    pub task_index: usize,
    pub descriptor: FileDescriptor,
}

/// Shared, thread-safe state of every task in one batch.
///
/// All transitions go through this type, so the active count and the
/// completed count can never disagree with task statuses.
pub struct Batch {
    inner: RwLock<BatchInner>,
}

struct BatchInner {
    tasks: Vec<UploadTask>,
    active: usize,
    peak_active: usize,
    completed: usize,
    failed: usize,
}

impl BatchInner {
    fn position(&self, task_index: usize) -> Result<usize, TransferError> {
        self.tasks
            .iter()
            .position(|t| t.task_index == task_index)
            .ok_or(TransferError::TaskNotFound(task_index))
    }

    fn transition(&mut self, pos: usize, to: UploadStatus) -> Result<(), TransferError> {
        let task = &mut self.tasks[pos];
        if !task.status.can_transition_to(to) {
            return Err(TransferError::InvalidTransition {
                index: task.task_index,
                from: task.status,
                to,
            });
        }
        task.status = to;
        Ok(())
    }
}

impl Batch {
    /// Creates a batch from pending tasks.
    pub fn new(tasks: Vec<UploadTask>) -> Self {
        Self {
            inner: RwLock::new(BatchInner {
                tasks,
                active: 0,
                peak_active: 0,
                completed: 0,
                failed: 0,
            }),
        }
    }

    /// Moves the first pending task to `Uploading` and returns it.
    ///
    /// Returns `None` once no pending task is left. Selection and the status
    /// change happen under one lock, so a task is never admitted twice.
    pub fn admit_next(&self) -> Option<AdmittedTask> {
        let mut s = self.inner.write().unwrap();
        let pos = s
            .tasks
            .iter()
            .position(|t| t.status == UploadStatus::Pending)?;
        s.tasks[pos].status = UploadStatus::Uploading;
        s.active += 1;
        s.peak_active = s.peak_active.max(s.active);

        let task = &s.tasks[pos];
        debug!(task = task.task_index, file = %task.descriptor.name(), active = s.active, "task admitted");
        Some(AdmittedTask {
            task_index: task.task_index,
            descriptor: task.descriptor.clone(),
        })
    }

    /// Records the upload id of a task. An id is assigned at most once.
    pub fn assign_upload_id(&self, task_index: usize, id: UploadId) -> Result<(), TransferError> {
        let mut s = self.inner.write().unwrap();
        let pos = s.position(task_index)?;
        let task = &mut s.tasks[pos];
        if task.upload_id.is_some() {
            return Err(TransferError::UploadIdAlreadyAssigned(task_index));
        }
        task.upload_id = Some(id);
        Ok(())
    }

    /// Updates the chunk counters of an uploading task.
    pub fn record_progress(
        &self,
        task_index: usize,
        chunks_done: u64,
        total_chunks: u64,
    ) -> Result<(), TransferError> {
        let mut s = self.inner.write().unwrap();
        let pos = s.position(task_index)?;
        let task = &mut s.tasks[pos];
        task.total_chunks = total_chunks;
        task.chunks_done = chunks_done.min(total_chunks);
        Ok(())
    }

    /// Marks an uploading task as completed with its assembled file.
    pub fn complete(&self, task_index: usize, file: FinalizedFile) -> Result<(), TransferError> {
        let mut s = self.inner.write().unwrap();
        let pos = s.position(task_index)?;
        s.transition(pos, UploadStatus::Completed)?;
        s.tasks[pos].result = Some(file);
        s.active -= 1;
        s.completed += 1;
        debug!(task = task_index, completed = s.completed, "task completed");
        Ok(())
    }

    /// Marks an uploading task as failed.
    pub fn fail(&self, task_index: usize, failure: TaskFailure) -> Result<(), TransferError> {
        let mut s = self.inner.write().unwrap();
        let pos = s.position(task_index)?;
        s.transition(pos, UploadStatus::Failed)?;
        debug!(task = task_index, kind = ?failure.kind, error = %failure.message, "task failed");
        s.tasks[pos].failure = Some(failure);
        s.active -= 1;
        s.failed += 1;
        Ok(())
    }

    /// Tasks currently uploading.
    pub fn active_count(&self) -> usize {
        self.inner.read().unwrap().active
    }

    /// Highest number of tasks that were uploading at the same time.
    pub fn peak_active(&self) -> usize {
        self.inner.read().unwrap().peak_active
    }

    pub fn completed_count(&self) -> usize {
        self.inner.read().unwrap().completed
    }

    pub fn failed_count(&self) -> usize {
        self.inner.read().unwrap().failed
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` once every task is completed or failed.
    pub fn is_settled(&self) -> bool {
        let s = self.inner.read().unwrap();
        s.completed + s.failed == s.tasks.len()
    }

    /// Copy of one task.
    pub fn task(&self, task_index: usize) -> Option<UploadTask> {
        let s = self.inner.read().unwrap();
        s.tasks.iter().find(|t| t.task_index == task_index).cloned()
    }

    /// Copy of every task, in submission order.
    pub fn snapshot(&self) -> Vec<UploadTask> {
        self.inner.read().unwrap().tasks.clone()
    }

    /// Current per-task and batch progress.
    pub fn progress(&self) -> BatchProgress {
        let s = self.inner.read().unwrap();
        BatchProgress::from_tasks(&s.tasks)
    }
}
