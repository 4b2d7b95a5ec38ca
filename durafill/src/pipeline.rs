//! End-to-end enrichment run
//!
//! load → detect field → select tasks → worker pool (join) → write

use crate::collection::{self, Collection};
use crate::error::{EnrichError, Result};
use crate::fetcher::HttpFetcher;
use crate::merger::SharedCollection;
use crate::pool::{TaskOutcome, TaskReport, WorkerPool};
use crate::prober::SymphoniaProber;
use crate::schema::{self, FieldSpec};
use crate::selector;
use chrono::{DateTime, Utc};
use durafill_common::config::RunSettings;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Counts for one run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Detected duration field
    pub field: FieldSpec,
    /// Tasks dispatched to the pool
    pub attempted: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
    /// (key, reason) for every failed task, sorted by key
    pub failures: Vec<(String, String)>,
}

impl RunSummary {
    fn new(run_id: Uuid, started_at: DateTime<Utc>, field: FieldSpec, reports: &[TaskReport]) -> Self {
        let mut failures: Vec<(String, String)> = reports
            .iter()
            .filter_map(|report| match &report.outcome {
                TaskOutcome::Failed { error, .. } => Some((report.key.clone(), error.to_string())),
                _ => None,
            })
            .collect();
        failures.sort();

        Self {
            run_id,
            started_at,
            field,
            attempted: reports.len(),
            updated: reports.iter().filter(|r| r.is_updated()).count(),
            skipped: reports
                .iter()
                .filter(|r| matches!(r.outcome, TaskOutcome::Skipped))
                .count(),
            failed: failures.len(),
            failures,
        }
    }
}

/// Result of a file run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Where the result lives: the written output, or the input when nothing needed updating
    pub output_path: PathBuf,
    /// Whether an output file was written
    pub written: bool,
    pub summary: RunSummary,
}

/// Drives a run over a collection
pub struct Enricher {
    pool: WorkerPool,
}

impl Enricher {
    pub fn new(pool: WorkerPool) -> Self {
        Self { pool }
    }

    /// HTTP fetcher and symphonia prober configured from `settings`
    pub fn from_settings(settings: &RunSettings) -> Result<Self> {
        let fetcher = HttpFetcher::new(settings.timeout).map_err(|e| {
            EnrichError::Common(durafill_common::Error::Config(format!(
                "Failed to create HTTP client: {}",
                e
            )))
        })?;

        Ok(Self::new(WorkerPool::new(
            Arc::new(fetcher),
            Arc::new(SymphoniaProber),
            settings.workers,
        )))
    }

    /// Fill missing durations in an in-memory collection
    ///
    /// Only schema detection can fail; per-entry failures are counted in the
    /// summary and leave their entries untouched.
    pub async fn enrich(&self, collection: Collection) -> Result<(Collection, RunSummary)> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("run", run_id = %run_id);
        self.enrich_inner(run_id, collection).instrument(span).await
    }

    async fn enrich_inner(
        &self,
        run_id: Uuid,
        collection: Collection,
    ) -> Result<(Collection, RunSummary)> {
        let started_at = Utc::now();

        let field = schema::detect_field_spec(&collection)?;
        let tasks = selector::select_tasks(&collection, field);

        if tasks.is_empty() {
            tracing::info!(entries = collection.len(), "No entries need duration updates");
            return Ok((collection, RunSummary::new(run_id, started_at, field, &[])));
        }

        tracing::info!(
            field = %field,
            entries = collection.len(),
            eligible = tasks.len(),
            workers = self.pool.workers(),
            "Starting duration enrichment"
        );

        let shared = SharedCollection::new(collection);
        let reports = self.pool.run(tasks, &shared, field).await;
        let collection = shared.into_inner().await;

        let summary = RunSummary::new(run_id, started_at, field, &reports);
        tracing::info!(
            attempted = summary.attempted,
            updated = summary.updated,
            skipped = summary.skipped,
            failed = summary.failed,
            "Enrichment finished"
        );

        Ok((collection, summary))
    }

    /// Load `input`, enrich it and write `<stem>_updated.<ext>`
    ///
    /// Nothing is written when no entry needs a duration; the report then
    /// points back at `input`. Otherwise the output is written even when every
    /// task failed.
    pub async fn enrich_file(&self, input: &Path, output_dir: Option<&Path>) -> Result<RunReport> {
        let collection = collection::load_collection(input)?;
        let (collection, summary) = self.enrich(collection).await?;

        if summary.attempted == 0 {
            return Ok(RunReport {
                output_path: input.to_path_buf(),
                written: false,
                summary,
            });
        }

        let output_path = collection::output_path(input, output_dir);
        collection::write_collection(&output_path, &collection)?;
        tracing::info!(path = %output_path.display(), "Updated collection saved");

        Ok(RunReport {
            output_path,
            written: true,
            summary,
        })
    }
}
