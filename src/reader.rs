use anyhow::{Context, Result};
use std::path::Path;
use std::time::Instant;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::decode::{smart_decode, DecodedText, TextEncoding};

/// Configuration for file reading behavior
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Return an error instead of empty text with `read_error` set
    pub fail_fast: bool,
    /// Buffer size for async reading
    pub buffer_size: usize,
    /// Map the file into memory instead of streaming it
    pub use_mmap: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            buffer_size: 8192,
            use_mmap: false,
        }
    }
}

/// Statistics for one file read
#[derive(Debug, Clone)]
pub struct ReadStats {
    pub file_path: String,
    pub bytes_read: u64,
    pub chars_decoded: u64,
    pub encoding: Option<TextEncoding>,
    pub duration_ms: u64,
    pub read_error: Option<String>,
}

impl ReadStats {
    fn failed(path: &Path, started: Instant, error: String) -> Self {
        Self {
            file_path: path.display().to_string(),
            bytes_read: 0,
            chars_decoded: 0,
            encoding: None,
            duration_ms: started.elapsed().as_millis() as u64,
            read_error: Some(error),
        }
    }
}

/// Reads whole files and decodes them to text
pub struct AsyncFileReader {
    config: ReaderConfig,
}

impl AsyncFileReader {
    pub fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Read and decode a file.
    ///
    /// Without `fail_fast`, I/O failures yield empty text and `read_error` in the stats.
    pub async fn read_file_text<P: AsRef<Path>>(&self, file_path: P) -> Result<(String, ReadStats)> {
        let path = file_path.as_ref();
        let start_time = Instant::now();

        debug!("Starting read of file: {}", path.display());

        let read = if self.config.use_mmap {
            read_mmap(path.to_path_buf()).await
        } else {
            self.read_buffered(path)
                .await
                .map(|bytes| (bytes.len() as u64, smart_decode(&bytes)))
        };

        let (bytes_read, decoded) = match read {
            Ok(read) => read,
            Err(e) => {
                let error_msg = format!("Failed to read file {}: {:#}", path.display(), e);
                warn!("{}", error_msg);
                if self.config.fail_fast {
                    return Err(anyhow::anyhow!(error_msg));
                }
                return Ok((String::new(), ReadStats::failed(path, start_time, error_msg)));
            }
        };

        let stats = ReadStats {
            file_path: path.display().to_string(),
            bytes_read,
            chars_decoded: decoded.text.chars().count() as u64,
            encoding: Some(decoded.encoding),
            duration_ms: start_time.elapsed().as_millis() as u64,
            read_error: None,
        };

        info!(
            "Read {}: {} bytes as {:?} in {}ms",
            path.display(),
            stats.bytes_read,
            decoded.encoding,
            stats.duration_ms
        );

        Ok((decoded.text, stats))
    }

    async fn read_buffered(&self, path: &Path) -> Result<Vec<u8>> {
        let file = File::open(path)
            .await
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let mut reader = BufReader::with_capacity(self.config.buffer_size, file);
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        Ok(bytes)
    }
}

/// Map the file and decode straight from the mapping; returns the mapped length
async fn read_mmap(path: std::path::PathBuf) -> Result<(u64, DecodedText)> {
    tokio::task::spawn_blocking(move || -> Result<(u64, DecodedText)> {
        let file = std::fs::File::open(&path).with_context(|| format!("Failed to open {}", path.display()))?;
        // Zero-length files cannot be mapped on every platform
        if file.metadata()?.len() == 0 {
            return Ok((0, smart_decode(&[])));
        }
        // SAFETY: the map is read-only and dropped before this closure returns
        let mmap = unsafe { memmap2::MmapOptions::new().map(&file)? };
        Ok((mmap.len() as u64, smart_decode(&mmap)))
    })
    .await?
}

/// Read a single file with the default configuration
pub async fn read_file_async<P: AsRef<Path>>(file_path: P) -> Result<String> {
    let reader = AsyncFileReader::new(ReaderConfig {
        fail_fast: true,
        ..Default::default()
    });
    let (text, _stats) = reader.read_file_text(file_path).await?;
    Ok(text)
}
