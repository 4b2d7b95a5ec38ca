//! Bounded worker pool: fetch → probe → merge per task
//!
//! At most `workers` tasks are in flight (`futures::stream::buffer_unordered`).
//! A task that fails at any stage ends there; siblings keep running and the
//! pool always drains. [`WorkerPool::run`] returns once every task has
//! finished, which is the join barrier before the collection is written.

use crate::error::TaskError;
use crate::fetcher::Fetcher;
use crate::merger::SharedCollection;
use crate::prober::Prober;
use crate::schema::FieldSpec;
use crate::selector::EnrichTask;
use futures::stream::{self, StreamExt};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Stage a task is in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Fetching,
    Probing,
    Merging,
    Done,
    Failed,
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskState::Pending => "pending",
            TaskState::Fetching => "fetching",
            TaskState::Probing => "probing",
            TaskState::Merging => "merging",
            TaskState::Done => "done",
            TaskState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Final result of one task
#[derive(Debug)]
pub enum TaskOutcome {
    /// Duration written (value stored, in milliseconds)
    Updated { duration_ms: f64 },
    /// Entry was no longer eligible when the task ran
    Skipped,
    /// Task stopped at `stage`
    Failed { stage: TaskState, error: TaskError },
}

/// Outcome of one task, tagged with its key
#[derive(Debug)]
pub struct TaskReport {
    pub key: String,
    pub outcome: TaskOutcome,
}

impl TaskReport {
    pub fn is_updated(&self) -> bool {
        matches!(self.outcome, TaskOutcome::Updated { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, TaskOutcome::Failed { .. })
    }
}

/// Runs enrichment tasks with a fixed concurrency ceiling
#[derive(Clone)]
pub struct WorkerPool {
    fetcher: Arc<dyn Fetcher>,
    prober: Arc<dyn Prober>,
    workers: usize,
}

impl WorkerPool {
    /// `workers` is clamped to at least 1
    pub fn new(fetcher: Arc<dyn Fetcher>, prober: Arc<dyn Prober>, workers: usize) -> Self {
        Self {
            fetcher,
            prober,
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run every task; reports are in completion order
    pub async fn run(
        &self,
        tasks: Vec<EnrichTask>,
        collection: &SharedCollection,
        spec: FieldSpec,
    ) -> Vec<TaskReport> {
        let total = tasks.len();
        let completed = Arc::new(AtomicUsize::new(0));

        tracing::info!(
            tasks = total,
            workers = self.workers,
            "Processing entries"
        );

        stream::iter(tasks)
            .map(|task| {
                let completed = completed.clone();

                async move {
                    let report = self.process(task, collection, spec).await;

                    let current = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    if report.is_updated() {
                        tracing::info!(
                            key = %report.key,
                            progress = format!("{}/{}", current, total),
                            "Progress"
                        );
                    } else if current % 10 == 0 || current == total {
                        tracing::info!(progress = format!("{}/{}", current, total), "Progress");
                    }

                    report
                }
            })
            .buffer_unordered(self.workers)
            .collect()
            .await
    }

    /// One task through its stages
    async fn process(
        &self,
        task: EnrichTask,
        collection: &SharedCollection,
        spec: FieldSpec,
    ) -> TaskReport {
        let EnrichTask { key, audio_url } = task;

        if !collection.is_eligible(&key, spec).await {
            tracing::debug!(key = %key, state = %TaskState::Pending, "Entry no longer needs a duration");
            return TaskReport {
                key,
                outcome: TaskOutcome::Skipped,
            };
        }

        tracing::debug!(key = %key, url = %audio_url, state = %TaskState::Fetching, "Task started");
        let audio = match self.fetcher.fetch(&audio_url).await {
            Ok(audio) => audio,
            Err(error) => return failed(key, TaskState::Fetching, error),
        };

        tracing::debug!(key = %key, bytes = audio.len(), state = %TaskState::Probing, "Fetched");
        let prober = self.prober.clone();
        let probe_path = audio.path().to_path_buf();
        let probed = tokio::task::spawn_blocking(move || prober.probe(&probe_path)).await;
        // Temp file released here on every path
        drop(audio);

        let seconds = match probed {
            Ok(Ok(seconds)) => seconds,
            Ok(Err(error)) => return failed(key, TaskState::Probing, error),
            Err(join_error) => {
                return failed(
                    key,
                    TaskState::Probing,
                    TaskError::Internal(format!("Probe task failed: {}", join_error)),
                )
            }
        };

        tracing::debug!(key = %key, seconds, state = %TaskState::Merging, "Probed");
        match collection.merge(&key, seconds, spec).await {
            Ok(duration_ms) => {
                tracing::info!(key = %key, seconds, state = %TaskState::Done, "Updated duration");
                TaskReport {
                    key,
                    outcome: TaskOutcome::Updated { duration_ms },
                }
            }
            Err(error) => failed(key, TaskState::Merging, error),
        }
    }
}

fn failed(key: String, stage: TaskState, error: TaskError) -> TaskReport {
    tracing::warn!(key = %key, stage = %stage, state = %TaskState::Failed, error = %error, "Task failed");
    TaskReport {
        key,
        outcome: TaskOutcome::Failed { stage, error },
    }
}
