//! Run metrics recorded through the `metrics` facade.
//!
//! Nothing is exported unless a recorder is installed. The binary installs a
//! Prometheus recorder when a textfile path is configured and writes the rendered
//! snapshot once the run finishes.

use crate::error::{EtlError, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fs;
use std::path::Path;

/// All metric names used by the ETL run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    RowsExtracted,
    ValuesImputed,
    RowsLoaded,
    StageDuration,
    RunsTotal,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::RowsExtracted => "titanic_etl_rows_extracted_total",
            MetricName::ValuesImputed => "titanic_etl_values_imputed_total",
            MetricName::RowsLoaded => "titanic_etl_rows_loaded_total",
            MetricName::StageDuration => "titanic_etl_stage_duration_seconds",
            MetricName::RunsTotal => "titanic_etl_runs_total",
        }
    }
}

/// Install a Prometheus recorder without an HTTP listener.
pub fn install_recorder() -> Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| EtlError::Metrics(format!("Failed to install Prometheus recorder: {e}")))
}

/// Render the current snapshot to `path` in Prometheus text format.
pub fn write_textfile<P: AsRef<Path>>(handle: &PrometheusHandle, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, handle.render())?;
    Ok(())
}

pub mod extract {
    use super::MetricName;

    pub fn rows_extracted(rows: usize) {
        ::metrics::counter!(MetricName::RowsExtracted.as_str()).increment(rows as u64);
    }
}

pub mod transform {
    use super::MetricName;

    /// Record imputed cells for a column
    pub fn values_imputed(column: &str, count: usize) {
        ::metrics::counter!(MetricName::ValuesImputed.as_str(), "column" => column.to_string())
            .increment(count as u64);
    }
}

pub mod load {
    use super::MetricName;

    pub fn rows_loaded(rows: usize) {
        ::metrics::counter!(MetricName::RowsLoaded.as_str()).increment(rows as u64);
    }
}

pub mod pipeline {
    use super::MetricName;

    pub fn run_started() {
        ::metrics::counter!(MetricName::RunsTotal.as_str()).increment(1);
    }

    pub fn stage_duration(stage: &'static str, secs: f64) {
        ::metrics::histogram!(MetricName::StageDuration.as_str(), "stage" => stage).record(secs);
    }
}
