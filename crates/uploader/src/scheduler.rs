//! Bounded worker pool running upload sessions.
//!
//! `concurrency` workers each admit the next pending task, run its session
//! to a terminal state and record the result, until nothing is pending.
//! Admission is atomic on the [`Batch`](chunkdrop_transfer::Batch), so no
//! task runs twice and never more than `concurrency` run at once.

use chunkdrop_transfer::{AdmittedTask, TaskFailure};
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::session::{SessionContext, UploadSession};
use crate::types::UploadEvent;

/// Runs every task of a batch with bounded parallelism.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    concurrency: usize,
}

impl Scheduler {
    /// Creates a scheduler. A concurrency of 0 is treated as 1.
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Runs until no task is pending or uploading.
    ///
    /// A failed session never stops its siblings.
    pub async fn run(&self, ctx: SessionContext) {
        let workers = self.concurrency.min(ctx.batch.len());
        let mut set = JoinSet::new();
        for worker in 0..workers {
            let ctx = ctx.clone();
            set.spawn(async move {
                while let Some(task) = ctx.batch.admit_next() {
                    run_task(&ctx, task).await;
                }
                worker
            });
        }

        while let Some(joined) = set.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "upload worker stopped unexpectedly");
            }
        }
    }
}

async fn run_task(ctx: &SessionContext, task: AdmittedTask) {
    let task_index = task.task_index;
    let result = UploadSession::new(ctx, task).run().await;

    match result {
        Ok(file) => {
            if let Err(e) = ctx.batch.complete(task_index, file.clone()) {
                error!(task = task_index, error = %e, "failed to record completion");
            }
            info!(task = task_index, path = %file.path, "upload completed");
            ctx.events.send(UploadEvent::TaskCompleted { task_index, file });
        }
        Err(e) => {
            let kind = e.failure_kind();
            let message = e.to_string();
            error!(task = task_index, kind = ?kind, error = %message, "upload failed");
            if let Err(e) = ctx
                .batch
                .fail(task_index, TaskFailure::new(kind, message.clone()))
            {
                error!(task = task_index, error = %e, "failed to record failure");
            }
            ctx.events.send(UploadEvent::TaskFailed {
                task_index,
                kind,
                error: message,
            });
        }
    }

    ctx.events.send(UploadEvent::BatchProgress {
        completed: ctx.batch.completed_count(),
        total: ctx.batch.len(),
    });
}
