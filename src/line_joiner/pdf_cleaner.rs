// Paragraph reconstruction for text extracted from PDFs
// Repairs hyphenated word breaks in addition to the shared merge rules

use tracing::debug;

use super::assembler::{assemble, AssemblyMode, AssemblySettings, AssemblyStats};
use super::patterns::LinePatterns;
use super::CleanOptions;

/// Clean newline-normalized PDF text
pub(crate) fn clean_prepared(patterns: &LinePatterns, text: &str, options: &CleanOptions) -> (String, AssemblyStats) {
    let settings = AssemblySettings {
        joiner: &options.joiner,
        mode: AssemblyMode::Merge { allow_hyphen_repair: true },
        preserve_paragraph_breaks: options.preserve_paragraph_breaks,
        collapse_whitespace: options.collapse_whitespace,
    };

    let (cleaned, stats) = assemble(patterns, text, &settings);
    debug!(
        lines_in = stats.lines_in,
        lines_emitted = stats.lines_emitted,
        "PDF text reassembled"
    );
    (cleaned, stats)
}
