// Batch driver: read, decode, clean and write many files with bounded concurrency

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

use crate::incremental::create_complete_aux_file;
use crate::line_joiner::{CleanOptions, LineReflower};
use crate::reader::{AsyncFileReader, ReaderConfig};
use crate::restart_log::{options_digest, should_process_file, FileFingerprint, RestartLog};

/// Runtime knobs of a batch run
#[derive(Debug, Clone)]
pub struct ProcessingConfig {
    pub overwrite_all: bool,
    pub fail_fast: bool,
    pub max_concurrent: usize,
    pub use_mmap: bool,
    pub show_progress: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            overwrite_all: false,
            fail_fast: false,
            max_concurrent: num_cpus::get(),
            use_mmap: false,
            show_progress: false,
        }
    }
}

/// Per-file processing statistics
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FileStats {
    pub path: String,
    /// Characters after decoding
    pub chars_processed: u64,
    /// Physical lines seen by the cleaner
    pub lines_in: u64,
    /// Non-blank logical lines written
    pub lines_emitted: u64,
    /// Cleaner that ran (`pdf`/`txt`), absent for skipped and failed files
    pub source_kind: Option<String>,
    pub processing_time_ms: u64,
    /// Cleaning time in milliseconds (subset of processing_time_ms)
    pub cleaning_time_ms: u64,
    pub chars_per_sec: f64,
    /// `success`, `skipped` or `failed`
    pub status: String,
    pub error: Option<String>,
}

impl FileStats {
    fn empty(path: &Path, status: &str, error: Option<String>) -> Self {
        Self {
            path: path.display().to_string(),
            chars_processed: 0,
            lines_in: 0,
            lines_emitted: 0,
            source_kind: None,
            processing_time_ms: 0,
            cleaning_time_ms: 0,
            chars_per_sec: 0.0,
            status: status.to_string(),
            error,
        }
    }

    pub fn skipped(path: &Path) -> Self {
        Self::empty(path, "skipped", None)
    }

    pub fn failed(path: &Path, error: &anyhow::Error) -> Self {
        Self::empty(path, "failed", Some(format!("{error:#}")))
    }
}

/// Aggregate statistics written to the stats file
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RunStats {
    /// Seconds since the Unix epoch
    pub run_start: u64,
    pub total_processing_time_ms: u64,
    pub total_chars_processed: u64,
    pub total_lines_emitted: u64,
    pub overall_chars_per_sec: f64,
    pub files_processed: u64,
    pub files_skipped: u64,
    pub files_failed: u64,
    pub file_stats: Vec<FileStats>,
}

fn chars_per_sec(chars: u64, seconds: f64) -> f64 {
    if chars == 0 {
        0.0
    } else {
        chars as f64 / seconds.max(f64::EPSILON)
    }
}

/// Read, decode and clean one file, then write `<stem>_reflow.<ext>` next to it
pub async fn process_file(
    path: &Path,
    reflower: Arc<LineReflower>,
    options: Arc<CleanOptions>,
    reader: &AsyncFileReader,
) -> Result<FileStats> {
    let start = Instant::now();
    let (text, read_stats) = reader.read_file_text(path).await?;

    let source = path.to_path_buf();
    let (report, cleaning_time) = tokio::task::spawn_blocking(move || -> Result<_> {
        let clean_start = Instant::now();
        let report = reflower.clean_text_with_report(&text, &options);
        let cleaning_time = clean_start.elapsed();
        create_complete_aux_file(&source, &report.text)
            .with_context(|| format!("Failed to write reflowed output for {}", source.display()))?;
        Ok((report, cleaning_time))
    })
    .await
    .context("Cleaning task panicked")??;

    let elapsed = start.elapsed();
    Ok(FileStats {
        path: path.display().to_string(),
        chars_processed: read_stats.chars_decoded,
        lines_in: report.assembly.lines_in as u64,
        lines_emitted: report.assembly.lines_emitted as u64,
        source_kind: Some(report.resolved.to_string()),
        processing_time_ms: elapsed.as_millis() as u64,
        cleaning_time_ms: cleaning_time.as_millis() as u64,
        chars_per_sec: chars_per_sec(read_stats.chars_decoded, elapsed.as_secs_f64()),
        status: "success".to_string(),
        error: None,
    })
}

fn progress_bar(len: usize, visible: bool) -> Result<ProgressBar> {
    if !visible {
        return Ok(ProgressBar::hidden());
    }
    let bar = ProgressBar::new(len as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    Ok(bar)
}

/// Process `files` concurrently, skipping those the restart log marks complete
/// for the same source size, mtime and cleaning options.
///
/// Successful files are marked in `restart_log`; the caller persists it.
/// With `fail_fast`, the run stops at the first failure and the partial stats are returned.
pub async fn process_files_parallel(
    files: &[PathBuf],
    reflower: Arc<LineReflower>,
    options: Arc<CleanOptions>,
    config: &ProcessingConfig,
    restart_log: &mut RestartLog,
) -> Result<RunStats> {
    let run_start = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let start = Instant::now();

    let digest = options_digest(&options)?;
    let mut file_stats = Vec::with_capacity(files.len());
    let mut pending = Vec::new();
    for path in files {
        // Taken before reading so an edit during processing shows up next run
        let fingerprint = FileFingerprint::of(path, &digest).await.ok();
        if should_process_file(path, restart_log, config.overwrite_all, fingerprint.as_ref()).await? {
            pending.push((path.clone(), fingerprint));
        } else {
            info!("Skipping completed file: {}", path.display());
            file_stats.push(FileStats::skipped(path));
        }
    }

    info!(
        "Processing {} files ({} skipped) with concurrency {}",
        pending.len(),
        file_stats.len(),
        config.max_concurrent
    );

    let bar = progress_bar(pending.len(), config.show_progress)?;
    let reader = Arc::new(AsyncFileReader::new(ReaderConfig {
        fail_fast: true,
        use_mmap: config.use_mmap,
        ..Default::default()
    }));

    let mut results = stream::iter(pending)
        .map(|(path, fingerprint)| {
            let reflower = Arc::clone(&reflower);
            let options = Arc::clone(&options);
            let reader = Arc::clone(&reader);
            async move {
                let result = process_file(&path, reflower, options, &reader).await;
                (path, fingerprint, result)
            }
        })
        .buffer_unordered(config.max_concurrent.max(1));

    while let Some((path, fingerprint, result)) = results.next().await {
        bar.inc(1);
        match result {
            Ok(stats) => {
                match fingerprint {
                    Some(fingerprint) => restart_log.mark_completed(&path, fingerprint),
                    None => warn!("Not logging {}: source could not be stat'ed", path.display()),
                }
                file_stats.push(stats);
            }
            Err(e) => {
                warn!("Failed to process {}: {:#}", path.display(), e);
                file_stats.push(FileStats::failed(&path, &e));
                if config.fail_fast {
                    bar.abandon_with_message("aborted");
                    break;
                }
            }
        }
    }
    bar.finish_and_clear();

    let count = |status: &str| file_stats.iter().filter(|s| s.status == status).count() as u64;
    let total_chars_processed: u64 = file_stats.iter().map(|s| s.chars_processed).sum();
    let total_lines_emitted: u64 = file_stats.iter().map(|s| s.lines_emitted).sum();
    let elapsed = start.elapsed();

    let stats = RunStats {
        run_start,
        total_processing_time_ms: elapsed.as_millis() as u64,
        total_chars_processed,
        total_lines_emitted,
        overall_chars_per_sec: chars_per_sec(total_chars_processed, elapsed.as_secs_f64()),
        files_processed: count("success"),
        files_skipped: count("skipped"),
        files_failed: count("failed"),
        file_stats,
    };

    info!(
        files_processed = stats.files_processed,
        files_skipped = stats.files_skipped,
        files_failed = stats.files_failed,
        total_chars = stats.total_chars_processed,
        "Batch complete"
    );

    Ok(stats)
}

/// Write run statistics as pretty JSON
pub async fn write_stats(stats: &RunStats, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(stats)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write stats file {}", path.display()))?;
    Ok(())
}
