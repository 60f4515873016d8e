// Paragraph reconstruction for hard-wrapped plain-text files
// No hyphen repair: a trailing hyphen in plain text is the author's

use tracing::debug;

use super::assembler::{assemble, AssemblyMode, AssemblySettings, AssemblyStats};
use super::patterns::LinePatterns;
use super::CleanOptions;

/// Clean newline-normalized plain text.
///
/// `preserve_single_line_breaks` is the already-resolved value: the caller decides
/// whether an unset option means "merge" (explicit txt) or "preserve" (auto-detected txt).
pub(crate) fn clean_prepared(
    patterns: &LinePatterns,
    text: &str,
    options: &CleanOptions,
    preserve_single_line_breaks: bool,
) -> (String, AssemblyStats) {
    let mode = if preserve_single_line_breaks {
        AssemblyMode::LinePerLine
    } else {
        AssemblyMode::Merge { allow_hyphen_repair: false }
    };

    let settings = AssemblySettings {
        joiner: &options.joiner,
        mode,
        preserve_paragraph_breaks: options.preserve_paragraph_breaks,
        collapse_whitespace: options.collapse_whitespace,
    };

    let (cleaned, stats) = assemble(patterns, text, &settings);
    debug!(
        lines_in = stats.lines_in,
        lines_emitted = stats.lines_emitted,
        preserve_single_line_breaks,
        "plain text reassembled"
    );
    (cleaned, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_joiner::normalization::prepare_input;
    use crate::line_joiner::JoinerOptions;
    use std::sync::OnceLock;

    static SHARED_PATTERNS: OnceLock<LinePatterns> = OnceLock::new();

    fn clean(raw: &str, options: &CleanOptions, preserve: bool) -> String {
        let patterns = SHARED_PATTERNS.get_or_init(|| LinePatterns::new().unwrap());
        let text = prepare_input(raw, options.strip_control_chars);
        clean_prepared(patterns, &text, options, preserve).0
    }

    #[test]
    fn test_hard_wrap_merges() {
        let raw = "Call me Ishmael. Some years ago, never mind how long\nprecisely, having little or no money in my purse,\nand nothing particular to interest me on shore.";
        assert_eq!(
            clean(raw, &CleanOptions::default(), false),
            "Call me Ishmael. Some years ago, never mind how long precisely, having little or no money in my purse, and nothing particular to interest me on shore."
        );
    }

    #[test]
    fn test_no_hyphen_repair() {
        assert_eq!(clean("exam-\nple", &CleanOptions::default(), false), "exam- ple");
    }

    #[test]
    fn test_preserve_single_line_breaks() {
        let raw = "Roses are red,\nViolets are blue\n\n\nSugar is sweet";
        assert_eq!(
            clean(raw, &CleanOptions::default(), true),
            "Roses are red,\nViolets are blue\n\nSugar is sweet"
        );
    }

    #[test]
    fn test_preserve_mode_ignores_kill_switch_state() {
        let options = CleanOptions {
            joiner: JoinerOptions {
                line_joining_enabled: false,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(clean("a\nb", &options, true), "a\nb");
        assert_eq!(clean("a\nb", &options, false), "a\n\nb");
    }

    #[test]
    fn test_preserve_mode_collapses_interior_whitespace() {
        assert_eq!(clean("  spaced    out  \nline", &CleanOptions::default(), true), "spaced out\nline");
    }

    #[test]
    fn test_strong_terminator_and_heading() {
        let raw = "Chapter text ends.\nNew paragraph line\n## Part Two\nbody";
        assert_eq!(
            clean(raw, &CleanOptions::default(), false),
            "Chapter text ends.\n\nNew paragraph line\n## Part Two\nbody"
        );
    }
}
