// Line reassembly: decide, line by line, whether physical lines of extracted text
// belong to the same logical paragraph, and rebuild the paragraphs

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

mod assembler;
pub mod decider;
pub mod detector;
pub mod normalization;
pub mod patterns;
mod pdf_cleaner;
pub mod quote_depth;
mod txt_cleaner;

pub use assembler::AssemblyStats;
pub use decider::{DecisionContext, JoinRule};
pub use detector::{detect_source_kind, DetectionStats, DetectionThresholds};
pub use patterns::LinePatterns;
pub use quote_depth::QuoteDepth;

/// Outcome of the join decision for one adjacent pair of lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinStrategy {
    /// Start a new paragraph/line
    NoJoin,
    /// Concatenate with a single space
    SpaceJoin,
    /// Concatenate directly after removing the trailing hyphen
    NoSpaceJoin,
}

/// Where the raw text came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Pdf,
    Txt,
    #[default]
    Auto,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Pdf => "pdf",
            SourceKind::Txt => "txt",
            SourceKind::Auto => "auto",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(SourceKind::Pdf),
            "txt" => Ok(SourceKind::Txt),
            "auto" => Ok(SourceKind::Auto),
            other => Err(format!("unknown source kind '{other}', expected pdf, txt or auto")),
        }
    }
}

/// Toggles consulted by the join decider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JoinerOptions {
    /// Never merge a heading or list-bullet line into the preceding text
    pub keep_list_and_heading_breaks: bool,
    /// Merge when the next line starts lowercase, in Hangul, or with an opening quote
    pub merge_continuation_lines: bool,
    /// Merge after commas, semicolons, colons and their CJK forms
    pub merge_after_soft_punctuation: bool,
    /// Merge lines that sit inside an unterminated multi-line quotation
    pub respect_quote_blocks: bool,
    /// Kill switch; when false every decision is `NoJoin`
    pub line_joining_enabled: bool,
}

impl Default for JoinerOptions {
    fn default() -> Self {
        Self {
            keep_list_and_heading_breaks: true,
            merge_continuation_lines: true,
            merge_after_soft_punctuation: true,
            respect_quote_blocks: true,
            line_joining_enabled: true,
        }
    }
}

/// Options of a cleaning call. Deserializes from the camelCase JSON
/// shape used by upload-processing callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CleanOptions {
    pub source: SourceKind,
    #[serde(flatten)]
    pub joiner: JoinerOptions,
    /// Separate paragraphs with a blank line instead of a single newline
    pub preserve_paragraph_breaks: bool,
    /// Collapse interior whitespace runs on each output line
    pub collapse_whitespace: bool,
    /// Plain text only: keep every physical line as its own line.
    /// Unset means "merge" for explicit txt and "preserve" for auto-detected txt.
    pub preserve_single_line_breaks: Option<bool>,
    /// Drop NUL, form feed and other C0 controls before processing
    pub strip_control_chars: bool,
    pub thresholds: DetectionThresholds,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            source: SourceKind::Auto,
            joiner: JoinerOptions::default(),
            preserve_paragraph_breaks: true,
            collapse_whitespace: true,
            preserve_single_line_breaks: None,
            strip_control_chars: true,
            thresholds: DetectionThresholds::default(),
        }
    }
}

/// Cleaned text plus what the cleaner decided along the way
#[derive(Debug, Clone, PartialEq)]
pub struct CleanReport {
    pub text: String,
    /// Cleaner that actually ran (never `Auto`)
    pub resolved: SourceKind,
    /// Present only when the kind was auto-detected
    pub detection: Option<DetectionStats>,
    pub preserved_single_line_breaks: bool,
    pub assembly: AssemblyStats,
}

/// Main line-reassembly interface.
///
/// Holds the compiled patterns; build once and share (it is `Send + Sync`).
#[derive(Debug, Clone)]
pub struct LineReflower {
    patterns: LinePatterns,
}

impl LineReflower {
    pub fn new() -> Result<Self> {
        Ok(Self {
            patterns: LinePatterns::new()?,
        })
    }

    pub fn patterns(&self) -> &LinePatterns {
        &self.patterns
    }

    /// Decide how `next` attaches to `prev`
    pub fn decide(
        &self,
        prev: &str,
        next: &str,
        options: &JoinerOptions,
        inside_quote_block: bool,
        allow_hyphen_repair: bool,
    ) -> JoinStrategy {
        let ctx = DecisionContext {
            options,
            inside_quote_block,
            allow_hyphen_repair,
        };
        decider::decide(&self.patterns, prev, next, ctx)
    }

    /// Clean raw text, dispatching on `options.source`
    pub fn clean_text(&self, raw: &str, options: &CleanOptions) -> String {
        self.clean_text_with_report(raw, options).text
    }

    /// Clean raw text and report the cleaner that ran and the detection measurements
    pub fn clean_text_with_report(&self, raw: &str, options: &CleanOptions) -> CleanReport {
        let text = normalization::prepare_input(raw, options.strip_control_chars);

        let (resolved, detection) = match options.source {
            SourceKind::Auto => {
                let (kind, stats) = detect_source_kind(&self.patterns, &text, &options.thresholds);
                (kind, Some(stats))
            }
            explicit => (explicit, None),
        };

        debug!(
            requested = %options.source,
            %resolved,
            chars = text.len(),
            "cleaning text"
        );

        match resolved {
            SourceKind::Txt => {
                // Auto-detected plain text keeps the author's line structure unless told otherwise
                let preserve = options
                    .preserve_single_line_breaks
                    .unwrap_or(options.source == SourceKind::Auto);
                let (cleaned, assembly) = txt_cleaner::clean_prepared(&self.patterns, &text, options, preserve);
                CleanReport {
                    text: cleaned,
                    resolved,
                    detection,
                    preserved_single_line_breaks: preserve,
                    assembly,
                }
            }
            SourceKind::Pdf | SourceKind::Auto => {
                let (cleaned, assembly) = pdf_cleaner::clean_prepared(&self.patterns, &text, options);
                CleanReport {
                    text: cleaned,
                    resolved: SourceKind::Pdf,
                    detection,
                    preserved_single_line_breaks: false,
                    assembly,
                }
            }
        }
    }

    /// Reassemble PDF-extracted text regardless of `options.source`
    pub fn clean_pdf_text(&self, raw: &str, options: &CleanOptions) -> String {
        let text = normalization::prepare_input(raw, options.strip_control_chars);
        pdf_cleaner::clean_prepared(&self.patterns, &text, options).0
    }

    /// Reassemble hard-wrapped plain text regardless of `options.source`.
    /// An unset `preserve_single_line_breaks` means merge.
    pub fn clean_txt_hard_wrap(&self, raw: &str, options: &CleanOptions) -> String {
        let text = normalization::prepare_input(raw, options.strip_control_chars);
        let preserve = options.preserve_single_line_breaks.unwrap_or(false);
        txt_cleaner::clean_prepared(&self.patterns, &text, options, preserve).0
    }
}
