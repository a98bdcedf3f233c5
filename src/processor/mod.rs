//! Main processing engine.
//!
//! Orchestrates the capture aggregation workflow: file discovery, per-file
//! extraction with fault isolation, and assembly of the time-ordered table.

pub mod discovery;
pub mod writer;

#[cfg(test)]
pub mod tests;

use self::discovery::FileDiscovery;

use crate::config::MplConfig;
use crate::error::{MplError, Result};
use crate::extract::{extract_cloud_layers, normalize_aod, particle_height};
use crate::models::{
    AggregatedRow, Capture, FileFailure, ParticleClass, ParticleCounts, ProcessingStats,
};
use crate::source::ScanSource;
use crate::table::ResultTable;
use crate::timestamp::parse_local_timestamp;

use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::task;
use tracing::{debug, info, warn};

/// Main processor for a capture directory
#[derive(Debug)]
pub struct CaptureProcessor {
    input_dir: PathBuf,
    config: Arc<MplConfig>,
    source: Arc<dyn ScanSource>,
    show_progress: bool,
}

impl CaptureProcessor {
    /// Create a new processor reading captures through `source`
    pub fn new(input_dir: PathBuf, source: Arc<dyn ScanSource>) -> Result<Self> {
        if !input_dir.is_dir() {
            return Err(MplError::DirectoryNotFound { path: input_dir });
        }

        Ok(Self {
            input_dir,
            config: Arc::new(MplConfig::default()),
            source,
            show_progress: false,
        })
    }

    /// Configure the processor
    pub fn with_config(mut self, config: MplConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    /// Draw a progress bar on stderr while extracting
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &MplConfig {
        &self.config
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    /// Main processing entry point
    ///
    /// Per-file failures are logged and recorded in the returned stats; only
    /// an unusable directory or configuration is an error.
    pub async fn process(&self) -> Result<(ResultTable, ProcessingStats)> {
        let start_time = Instant::now();
        self.config.validate()?;

        let mut discovery =
            FileDiscovery::new(self.input_dir.clone(), &self.config.file_extension);
        let files = discovery.discover_capture_files().await?;
        info!(
            "Extracting {} capture files from {} ({} entries)",
            files.len(),
            self.input_dir.display(),
            discovery.entry_count()
        );

        let progress = self.progress_bar(files.len());
        let limit = self.config.max_concurrent_files.max(1);

        let outcomes: Vec<(PathBuf, Result<AggregatedRow>)> = stream::iter(files.iter().cloned())
            .map(|path| {
                let source = Arc::clone(&self.source);
                let config = Arc::clone(&self.config);
                let progress = progress.clone();
                async move {
                    let task_path = path.clone();
                    let result = task::spawn_blocking(move || {
                        process_file(source.as_ref(), &task_path, &config)
                    })
                    .await
                    .unwrap_or_else(|e| {
                        Err(MplError::FileAccess {
                            path: path.clone(),
                            reason: format!("extraction task failed: {}", e),
                        })
                    });
                    progress.inc(1);
                    (path, result)
                }
            })
            .buffer_unordered(limit)
            .collect()
            .await;

        progress.finish_and_clear();

        let mut rows = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for (path, result) in outcomes {
            match result {
                Ok(row) => {
                    debug!("Successfully processed: {}", path.display());
                    rows.push(row);
                }
                Err(e) => {
                    let kind = e.failure_kind();
                    warn!("Skipping {} ({}): {}", path.display(), kind, e);
                    failures.push(FileFailure {
                        path,
                        kind,
                        reason: e.to_string(),
                    });
                }
            }
        }

        failures.sort_by(|a, b| a.path.cmp(&b.path));

        let table = ResultTable::from_rows(rows);
        let stats = ProcessingStats {
            directory_entries: discovery.entry_count(),
            files_discovered: files.len(),
            files_processed: table.len(),
            files_failed: failures.len(),
            total_rows: table.len(),
            output_path: PathBuf::new(),
            processing_time_ms: start_time.elapsed().as_millis(),
            failures,
        };

        info!(
            "Extraction finished: {} rows, {} files skipped",
            stats.total_rows, stats.files_failed
        );

        Ok((table, stats))
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar().template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        ) {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message("Extracting captures");
        pb
    }
}

/// Load one capture and derive its row
///
/// Errors raised without file context get the path attached here.
pub fn process_file(
    source: &dyn ScanSource,
    path: &Path,
    config: &MplConfig,
) -> Result<AggregatedRow> {
    let capture = source.load(path)?;
    build_row(&capture, config).map_err(|e| e.with_path(path))
}

/// Derive the complete output row for a capture
///
/// Either every field is computed or an error is returned; no partial row
/// ever leaves this function.
pub fn build_row(capture: &Capture, config: &MplConfig) -> Result<AggregatedRow> {
    let clean_aerosol = particle_height(capture, ParticleClass::CleanAerosol);
    let polluted_aerosol = particle_height(capture, ParticleClass::PollutedAerosol);
    let ice_dust_ash = particle_height(capture, ParticleClass::IceDustAsh);
    let molecular = particle_height(capture, ParticleClass::Molecular);
    let water_cloud = particle_height(capture, ParticleClass::WaterCloud);
    let mixed_cloud = particle_height(capture, ParticleClass::MixedCloud);

    let aod = normalize_aod(capture.aod);
    let cloud_layers = extract_cloud_layers(&capture.clouds, config.cloud_layer_policy)?;
    let counts = ParticleCounts::tally(capture);
    let timestamp = parse_local_timestamp(
        &capture.date_yyyymmdd,
        &capture.time_hhmmss,
        config.utc_offset_hours,
    )?;

    Ok(AggregatedRow {
        timestamp,
        temperature: capture.detector_temperature,
        aod,
        pbl: capture.pbls,
        counts,
        clean_aerosol,
        polluted_aerosol,
        water_cloud,
        mixed_cloud,
        molecular,
        ice_dust_ash,
        cloud_layers,
    })
}
