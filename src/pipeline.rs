use crate::config::Config;
use crate::error::Result;
use crate::extract::extract;
use crate::load::{load, LoadOutcome};
use crate::transform::{transform, TransformSummary};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, instrument};

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Extract and transform, but never touch the database
    pub dry_run: bool,
}

/// Result of a complete ETL run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub input_path: PathBuf,
    pub database_path: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// `None` when the input file was missing
    pub rows_extracted: Option<usize>,
    pub transform: Option<TransformSummary>,
    pub load: LoadOutcome,
}

impl RunReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub struct Pipeline<'a> {
    config: &'a Config,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Run extract → transform → load once.
    #[instrument(skip_all, fields(dry_run = options.dry_run))]
    pub fn run(&self, options: RunOptions) -> Result<RunReport> {
        let started_at = Utc::now();
        crate::metrics::pipeline::run_started();
        info!("🚀 Starting ETL run");

        let t = Instant::now();
        let extracted = extract(&self.config.input.path)?;
        crate::metrics::pipeline::stage_duration("extract", t.elapsed().as_secs_f64());
        let rows_extracted = extracted.as_ref().map(|t| t.row_count());

        let t = Instant::now();
        let transformed = transform(extracted)?;
        crate::metrics::pipeline::stage_duration("transform", t.elapsed().as_secs_f64());

        let load_outcome = if options.dry_run {
            info!("Dry run, skipping load");
            LoadOutcome::DryRun
        } else {
            let t = Instant::now();
            let outcome = load(
                &self.config.database.path,
                transformed.as_ref().map(|t| &t.table),
            )?;
            crate::metrics::pipeline::stage_duration("load", t.elapsed().as_secs_f64());
            outcome
        };

        info!("🏁 ETL run finished");
        Ok(RunReport {
            input_path: self.config.input.path.clone(),
            database_path: self.config.database.path.clone(),
            started_at,
            finished_at: Utc::now(),
            rows_extracted,
            transform: transformed.map(|t| t.summary),
            load: load_outcome,
        })
    }
}
