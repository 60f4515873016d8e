use anyhow::Result;
use futures::stream::{self, Stream, StreamExt};
use glob::glob;
use ignore::{WalkBuilder, WalkState};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::incremental::is_aux_file;

/// Configuration for file discovery behavior
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Whether to fail fast on first error or continue processing
    pub fail_fast: bool,
    /// Extension of input files, without the dot
    pub extension: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            extension: "txt".to_string(),
        }
    }
}

impl DiscoveryConfig {
    /// True for input files: the configured extension and not one of our outputs
    pub fn matches(&self, path: &Path) -> bool {
        let extension_matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension));
        extension_matches && !is_aux_file(path)
    }
}

/// Result of file discovery validation
#[derive(Debug, Clone)]
pub struct FileValidation {
    pub path: PathBuf,
    pub error: Option<String>,
}

/// Discover input files recursively under `root_dir` using a glob walk.
/// Yields files in glob order.
pub fn discover_files(
    root_dir: impl AsRef<Path>,
    config: DiscoveryConfig,
) -> impl Stream<Item = Result<FileValidation>> {
    let root_path = root_dir.as_ref().to_path_buf();

    stream::unfold(DiscoveryState::new(root_path, config), |mut state| async move {
        state.next_file().await.map(|result| (result, state))
    })
}

/// Discover input files with `ignore`'s parallel walker, streaming them as found
pub fn discover_files_parallel(
    root_dir: impl AsRef<Path>,
    config: DiscoveryConfig,
) -> impl Stream<Item = Result<FileValidation>> {
    let root_path = root_dir.as_ref().to_path_buf();
    let config = Arc::new(config);
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        info!("Starting parallel traversal in: {}", root_path.display());
        let traversal_start = std::time::Instant::now();

        let walker = WalkBuilder::new(&root_path)
            .threads((num_cpus::get() / 2).max(1))
            .follow_links(false)
            .hidden(false)
            .ignore(false)
            .git_ignore(false)
            .build_parallel();

        let (result_tx, result_rx) = std::sync::mpsc::channel();
        let walk_config = Arc::clone(&config);

        std::thread::spawn(move || {
            walker.run(|| {
                let result_tx = result_tx.clone();
                let walk_config = Arc::clone(&walk_config);
                Box::new(move |result| {
                    if let Ok(entry) = result {
                        if entry.file_type().is_some_and(|ft| ft.is_file()) && walk_config.matches(entry.path()) {
                            debug!("Found matching file: {}", entry.path().display());
                            let _ = result_tx.send(entry.path().to_path_buf());
                        }
                    }
                    WalkState::Continue
                })
            });
        });

        let mut file_count = 0;
        while let Ok(path) = result_rx.recv() {
            file_count += 1;

            match validate_file(path, &config).await {
                Ok(validation) => {
                    if tx.send(Ok(validation)).is_err() {
                        debug!("Receiver dropped, stopping discovery");
                        break;
                    }
                }
                Err(e) => {
                    if config.fail_fast {
                        let _ = tx.send(Err(e));
                        break;
                    }
                    warn!("File validation error (continuing): {}", e);
                }
            }
        }

        info!(
            "Parallel discovery completed in {}ms, streamed {} files",
            traversal_start.elapsed().as_millis(),
            file_count
        );
    });

    stream::unfold(rx, |mut receiver| async move {
        receiver.recv().await.map(|result| (result, receiver))
    })
}

async fn validate_file(path: PathBuf, config: &DiscoveryConfig) -> Result<FileValidation> {
    match fs::metadata(&path).await {
        Ok(metadata) if metadata.is_file() => Ok(FileValidation { path, error: None }),
        Ok(_) => {
            let error = format!("Path is not a file: {}", path.display());
            warn!("{}", error);
            Ok(FileValidation { path, error: Some(error) })
        }
        Err(e) => {
            let error = format!("Cannot access file {}: {}", path.display(), e);
            warn!("{}", error);
            if config.fail_fast {
                Err(anyhow::anyhow!(error))
            } else {
                Ok(FileValidation { path, error: Some(error) })
            }
        }
    }
}

struct DiscoveryState {
    root_dir: PathBuf,
    config: DiscoveryConfig,
    glob_iter: Option<glob::Paths>,
}

impl DiscoveryState {
    fn new(root_dir: PathBuf, config: DiscoveryConfig) -> Self {
        Self {
            root_dir,
            config,
            glob_iter: None,
        }
    }

    async fn next_file(&mut self) -> Option<Result<FileValidation>> {
        if self.glob_iter.is_none() {
            let pattern = format!(
                "{}/**/*.{}",
                glob::Pattern::escape(&self.root_dir.display().to_string()),
                self.config.extension
            );
            debug!("Starting file discovery with pattern: {}", pattern);

            match glob(&pattern) {
                Ok(paths) => self.glob_iter = Some(paths),
                Err(e) => return Some(Err(anyhow::anyhow!("Failed to create glob pattern: {}", e))),
            }
        }

        let glob_iter = self.glob_iter.as_mut()?;
        loop {
            match glob_iter.next()? {
                Ok(path) if self.config.matches(&path) => {
                    debug!("Found file: {}", path.display());
                    return Some(validate_file(path, &self.config).await);
                }
                Ok(path) => debug!("Skipping {}", path.display()),
                Err(e) => {
                    let error_msg = format!("Glob iteration error: {e}");
                    warn!("{}", error_msg);
                    if self.config.fail_fast {
                        return Some(Err(anyhow::anyhow!(error_msg)));
                    }
                }
            }
        }
    }
}

async fn collect_stream(stream: impl Stream<Item = Result<FileValidation>>) -> Result<Vec<FileValidation>> {
    let mut files = Vec::new();
    let mut stream = Box::pin(stream);

    while let Some(result) = stream.next().await {
        files.push(result?);
    }

    let valid_count = files.iter().filter(|f| f.error.is_none()).count();
    let invalid_count = files.len() - valid_count;
    if invalid_count > 0 {
        warn!("Found {} files with validation issues", invalid_count);
    }
    info!("File discovery summary: {} valid, {} invalid", valid_count, invalid_count);

    Ok(files)
}

/// Collect all discovered files into a Vec
pub async fn collect_discovered_files(
    root_dir: impl AsRef<Path>,
    config: DiscoveryConfig,
) -> Result<Vec<FileValidation>> {
    collect_stream(discover_files(root_dir, config)).await
}

/// Collect all discovered files using the parallel walker
pub async fn collect_discovered_files_parallel(
    root_dir: impl AsRef<Path>,
    config: DiscoveryConfig,
) -> Result<Vec<FileValidation>> {
    collect_stream(discover_files_parallel(root_dir, config)).await
}

/// Paths of all valid input files under `root_dir`
pub async fn find_input_files<P: AsRef<Path>>(root_dir: P, config: DiscoveryConfig) -> Result<Vec<PathBuf>> {
    let validations = collect_discovered_files(root_dir, config).await?;
    Ok(validations
        .into_iter()
        .filter(|v| v.error.is_none())
        .map(|v| v.path)
        .collect())
}
