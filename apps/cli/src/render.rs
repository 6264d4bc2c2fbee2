//! Console presentation of upload events.

use std::io::{self, Write};

use chunkdrop_transfer::FailureKind;
use chunkdrop_uploader::{BatchOutcome, UploadEvent};

/// Format bytes in human-readable form, e.g. `1.5 KB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 Bytes".into();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let text = format!("{value:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{text} {}", UNITS[unit])
}

/// One submitted file, as the console shows it.
#[derive(Debug, Clone)]
pub struct FileLabel {
    pub name: String,
    pub size: u64,
}

fn label_name(files: &[FileLabel], task_index: usize) -> &str {
    files
        .get(task_index)
        .map(|f| f.name.as_str())
        .unwrap_or("?")
}

/// Turns upload events into console lines.
pub struct Renderer<W: Write> {
    out: W,
    files: Vec<FileLabel>,
    /// Last whole percentage printed per task.
    last_percent: Vec<Option<u64>>,
}

impl<W: Write> Renderer<W> {
    /// `files` is indexed by task index.
    pub fn new(out: W, files: Vec<FileLabel>) -> Self {
        let last_percent = vec![None; files.len()];
        Self {
            out,
            files,
            last_percent,
        }
    }

    /// Prints the lines for one event.
    pub fn handle(&mut self, event: &UploadEvent) -> io::Result<()> {
        let Self {
            out,
            files,
            last_percent,
        } = self;

        match event {
            UploadEvent::Rejected { name, reason, .. } => {
                writeln!(out, "skipped  {name}: {reason}")
            }
            UploadEvent::TaskStarted {
                task_index,
                total_chunks,
                ..
            } => {
                let size = files
                    .get(*task_index)
                    .map(|f| format_file_size(f.size))
                    .unwrap_or_default();
                writeln!(
                    out,
                    "upload   {} ({size}, {total_chunks} chunks)",
                    label_name(files, *task_index)
                )
            }
            UploadEvent::Status {
                task_index,
                message,
            } => {
                tracing::debug!(task = task_index, "{message}");
                Ok(())
            }
            UploadEvent::Progress {
                task_index,
                chunks_done,
                total_chunks,
            } => {
                if *total_chunks == 0 {
                    return Ok(());
                }
                let percent = chunks_done * 100 / total_chunks;
                let Some(last) = last_percent.get_mut(*task_index) else {
                    return Ok(());
                };
                if *last == Some(percent) {
                    return Ok(());
                }
                *last = Some(percent);
                writeln!(out, "progress {} {percent}%", label_name(files, *task_index))
            }
            UploadEvent::TaskCompleted { task_index, file } => writeln!(
                out,
                "done     {} -> {}",
                label_name(files, *task_index),
                file.path
            ),
            UploadEvent::TaskFailed {
                task_index,
                kind,
                error,
            } => {
                let label = match kind {
                    FailureKind::Transfer => "failed",
                    FailureKind::Assembly => "assembly failed",
                    FailureKind::Cancelled => "cancelled",
                };
                writeln!(out, "{label:<8} {}: {error}", label_name(files, *task_index))
            }
            UploadEvent::BatchProgress { completed, total } => {
                let percent = if *total == 0 {
                    0
                } else {
                    completed * 100 / total
                };
                writeln!(out, "batch    {completed}/{total} files ({percent}%)")
            }
        }
    }

    /// Prints the final summary.
    pub fn summary(&mut self, outcome: &BatchOutcome) -> io::Result<()> {
        write!(
            self.out,
            "Uploaded {}/{} files",
            outcome.completed, outcome.total
        )?;
        if !outcome.rejected.is_empty() {
            write!(self.out, ", {} rejected", outcome.rejected.len())?;
        }
        writeln!(self.out)?;
        if outcome.is_partial_failure() {
            writeln!(
                self.out,
                "Batch partially failed ({} failed)",
                outcome.total - outcome.completed
            )?;
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
