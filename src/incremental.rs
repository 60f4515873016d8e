// Helpers for incremental runs: where reflowed output lives
// and how to recognise files this tool wrote itself

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Suffix appended to the source stem for reflowed output
pub const AUX_SUFFIX: &str = "_reflow";

/// Generate the reflowed output path for a source file: `<stem>_reflow.<ext>` next to it.
///
/// The source extension is kept so `doc.md` and `doc.txt` never share an output.
pub fn generate_aux_file_path(source_path: &Path) -> PathBuf {
    let file_stem = source_path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let file_name = match source_path.extension() {
        Some(ext) => format!("{file_stem}{AUX_SUFFIX}.{}", ext.to_string_lossy()),
        None => format!("{file_stem}{AUX_SUFFIX}"),
    };
    source_path.with_file_name(file_name)
}

/// True when `path` is itself a reflowed output file
pub fn is_aux_file(path: &Path) -> bool {
    path.file_stem()
        .is_some_and(|stem| stem.to_string_lossy().ends_with(AUX_SUFFIX))
}

pub fn aux_file_exists<P: AsRef<Path>>(source_path: P) -> bool {
    generate_aux_file_path(source_path.as_ref()).exists()
}

/// Read the reflowed output previously written for `source_path`
///
/// # Example
/// ```no_run
/// use reflow::incremental::read_aux_file;
/// let content = read_aux_file("path/to/report.txt").expect("Failed to read aux file");
/// ```
pub fn read_aux_file<P: AsRef<Path>>(source_path: P) -> Result<String, io::Error> {
    fs::read_to_string(generate_aux_file_path(source_path.as_ref()))
}

/// Write reflowed output for `source_path`, always newline-terminated
///
/// # Example
/// ```no_run
/// use reflow::incremental::create_complete_aux_file;
/// create_complete_aux_file("path/to/report.txt", "First paragraph.\n\nSecond.").expect("Failed to write");
/// ```
pub fn create_complete_aux_file<P: AsRef<Path>>(source_path: P, content: &str) -> Result<PathBuf, io::Error> {
    let aux_path = generate_aux_file_path(source_path.as_ref());
    if content.ends_with('\n') {
        fs::write(&aux_path, content)?;
    } else {
        fs::write(&aux_path, format!("{content}\n"))?;
    }
    Ok(aux_path)
}
