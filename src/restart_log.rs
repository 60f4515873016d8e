use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;
use tracing::{debug, warn};

use crate::incremental::generate_aux_file_path;
use crate::line_joiner::CleanOptions;

/// Hex SHA-256 of the serialized cleaning options
pub fn options_digest(options: &CleanOptions) -> Result<String> {
    let json = serde_json::to_vec(options).context("Failed to serialize cleaning options")?;
    Ok(format!("{:x}", Sha256::digest(&json)))
}

/// The source state and options a reflowed output was produced from.
/// An output is only reused while all three fields still match.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FileFingerprint {
    pub size: u64,
    /// Modification time in milliseconds since the Unix epoch
    pub modified_ms: u64,
    pub options_digest: String,
}

impl FileFingerprint {
    pub async fn of(file_path: &Path, options_digest: &str) -> Result<Self> {
        let metadata = fs::metadata(file_path)
            .await
            .with_context(|| format!("Failed to stat {}", file_path.display()))?;
        let modified_ms = metadata
            .modified()
            .ok()
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map(|since| since.as_millis() as u64)
            .unwrap_or_default();

        Ok(Self {
            size: metadata.len(),
            modified_ms,
            options_digest: options_digest.to_string(),
        })
    }
}

/// Tracks source files whose reflowed output was written successfully
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct RestartLog {
    completed_files: HashMap<String, FileFingerprint>,
    /// Seconds since the Unix epoch
    last_updated: u64,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

impl RestartLog {
    /// Load the log under `root_dir`; a missing or unreadable log starts empty
    pub async fn load(root_dir: &Path) -> Self {
        let log_path = Self::log_path(root_dir);

        match fs::read_to_string(&log_path).await {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("Ignoring corrupt restart log {}: {}", log_path.display(), e);
                Self::default()
            }),
            Err(_) => {
                debug!("No restart log at {}", log_path.display());
                Self::default()
            }
        }
    }

    pub async fn save(&self, root_dir: &Path) -> Result<()> {
        let log_path = Self::log_path(root_dir);
        let content = serde_json::to_string_pretty(self)?;

        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&log_path, content)
            .await
            .with_context(|| format!("Failed to write restart log {}", log_path.display()))?;
        Ok(())
    }

    pub fn is_completed(&self, file_path: &Path) -> bool {
        self.completed_files.contains_key(file_path.to_string_lossy().as_ref())
    }

    /// Fingerprint recorded when `file_path` was last completed
    pub fn fingerprint(&self, file_path: &Path) -> Option<&FileFingerprint> {
        self.completed_files.get(file_path.to_string_lossy().as_ref())
    }

    pub fn mark_completed(&mut self, file_path: &Path, fingerprint: FileFingerprint) {
        self.completed_files
            .insert(file_path.to_string_lossy().into_owned(), fingerprint);
        self.last_updated = now_secs();
    }

    pub fn completed_count(&self) -> usize {
        self.completed_files.len()
    }

    /// Forget every completed file, forcing a full rerun
    pub fn clear(&mut self) {
        self.completed_files.clear();
        self.last_updated = now_secs();
    }

    fn log_path(root_dir: &Path) -> PathBuf {
        root_dir.join(".reflow_restart.json")
    }

    /// Drop entries whose source or reflowed output has disappeared.
    /// Returns the dropped paths.
    pub async fn verify_completed_files(&mut self) -> Result<Vec<PathBuf>> {
        let mut invalid_files = Vec::new();
        let mut valid_files = HashMap::new();

        for (file_path_str, fingerprint) in self.completed_files.drain() {
            let file_path = PathBuf::from(&file_path_str);
            let source_present = fs::try_exists(&file_path).await.unwrap_or(false);
            let aux_present = fs::try_exists(generate_aux_file_path(&file_path))
                .await
                .unwrap_or(false);

            if source_present && aux_present {
                valid_files.insert(file_path_str, fingerprint);
            } else {
                invalid_files.push(file_path);
            }
        }

        self.completed_files = valid_files;
        Ok(invalid_files)
    }

    pub fn get_stats(&self) -> RestartStats {
        RestartStats {
            completed_files: self.completed_files.len(),
            last_updated: self.last_updated,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RestartStats {
    pub completed_files: usize,
    pub last_updated: u64,
}

/// Whether `file_path` needs (re)processing.
///
/// Always with `overwrite_all`. Otherwise a file is skipped only when it is logged
/// complete, `current` matches the recorded fingerprint and its output still exists.
/// `current` is `None` when the source could not be stat'ed.
pub async fn should_process_file(
    file_path: &Path,
    restart_log: &RestartLog,
    overwrite_all: bool,
    current: Option<&FileFingerprint>,
) -> Result<bool> {
    if overwrite_all {
        return Ok(true);
    }

    let Some(recorded) = restart_log.fingerprint(file_path) else {
        return Ok(true);
    };

    if current != Some(recorded) {
        debug!("Source or options changed since last run: {}", file_path.display());
        return Ok(true);
    }

    let aux_path = generate_aux_file_path(file_path);
    Ok(!fs::try_exists(&aux_path).await.unwrap_or(false))
}
