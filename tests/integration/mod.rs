// Integration test utilities shared across test binaries

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary directory tree of input files
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub root_path: PathBuf,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root_path = temp_dir.path().to_path_buf();

        Self { temp_dir, root_path }
    }

    /// Create an input file (and its parent directories) with given content
    pub fn create_input_file<P: AsRef<Path>>(&self, relative_path: P, content: &str) -> PathBuf {
        self.create_input_bytes(relative_path, content.as_bytes())
    }

    pub fn create_input_bytes<P: AsRef<Path>>(&self, relative_path: P, content: &[u8]) -> PathBuf {
        let file_path = self.root_path.join(relative_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    pub fn aux_file_exists<P: AsRef<Path>>(&self, source_path: P) -> bool {
        reflow::incremental::aux_file_exists(source_path)
    }

    pub fn read_aux_file<P: AsRef<Path>>(&self, source_path: P) -> String {
        reflow::incremental::read_aux_file(source_path).expect("Failed to read aux file")
    }

    pub fn stats_path(&self) -> PathBuf {
        self.root_path.join("run_stats.json")
    }
}

/// Compare two strings line by line, reporting the first mismatch
pub fn assert_golden_file(actual: &str, expected: &str, context: &str) {
    let actual_lines: Vec<&str> = actual.lines().collect();
    let expected_lines: Vec<&str> = expected.lines().collect();

    for (i, (actual_line, expected_line)) in actual_lines.iter().zip(expected_lines.iter()).enumerate() {
        if actual_line != expected_line {
            panic!(
                "{}: Line {} mismatch\nExpected: {}\nActual:   {}",
                context,
                i + 1,
                expected_line,
                actual_line
            );
        }
    }

    if actual_lines.len() != expected_lines.len() {
        panic!(
            "{}: Line count mismatch. Expected {} lines, got {} lines",
            context,
            expected_lines.len(),
            actual_lines.len()
        );
    }
}
