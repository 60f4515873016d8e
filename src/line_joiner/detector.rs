// Source-kind detection: guess whether raw text came from a PDF or a plain-text file

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::patterns::{is_blank, LinePatterns};
use super::SourceKind;

/// Tunable thresholds of the pdf/txt heuristic.
///
/// These are empirical values; treat them as knobs rather than derived constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DetectionThresholds {
    /// Hyphenated line breaks at or above this count indicate PDF extraction
    pub min_hyphen_breaks: usize,
    /// Average non-blank line length (in characters) below which text counts as PDF
    pub short_line_average: f64,
}

impl Default for DetectionThresholds {
    fn default() -> Self {
        Self {
            min_hyphen_breaks: 2,
            short_line_average: 45.0,
        }
    }
}

/// Measurements the detector based its guess on
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionStats {
    pub average_line_length: f64,
    pub hyphen_breaks: usize,
    pub non_blank_lines: usize,
}

/// Classify newline-normalized text as `Pdf` or `Txt`
pub fn detect_source_kind(
    patterns: &LinePatterns,
    text: &str,
    thresholds: &DetectionThresholds,
) -> (SourceKind, DetectionStats) {
    let (total_chars, non_blank_lines) = text
        .split('\n')
        .filter(|line| !is_blank(line))
        .fold((0usize, 0usize), |(chars, lines), line| {
            (chars + line.trim().chars().count(), lines + 1)
        });

    let average_line_length = if non_blank_lines == 0 {
        0.0
    } else {
        total_chars as f64 / non_blank_lines as f64
    };

    let hyphen_breaks = patterns.count_hyphen_breaks(text);

    let stats = DetectionStats {
        average_line_length,
        hyphen_breaks,
        non_blank_lines,
    };

    let kind = if hyphen_breaks >= thresholds.min_hyphen_breaks
        || average_line_length < thresholds.short_line_average
    {
        SourceKind::Pdf
    } else {
        SourceKind::Txt
    };

    debug!(
        ?kind,
        average_line_length,
        hyphen_breaks,
        non_blank_lines,
        "source kind detected"
    );

    (kind, stats)
}
