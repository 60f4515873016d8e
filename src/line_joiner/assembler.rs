// Line walk shared by the PDF and plain-text cleaners
// Carries the accumulator buffer, quote depth and output sequence across physical lines

use super::decider::{decide, DecisionContext};
use super::normalization::{collapse_whitespace_per_line, finish_output};
use super::patterns::{is_blank, strip_trailing_hyphen, LinePatterns};
use super::quote_depth::QuoteDepth;
use super::{JoinStrategy, JoinerOptions};

/// How non-blank lines are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AssemblyMode {
    /// Consult the join decider for every adjacent pair
    Merge { allow_hyphen_repair: bool },
    /// Every non-blank line is its own logical line
    LinePerLine,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct AssemblySettings<'a> {
    pub joiner: &'a JoinerOptions,
    pub mode: AssemblyMode,
    pub preserve_paragraph_breaks: bool,
    pub collapse_whitespace: bool,
}

/// Emitted logical lines; an empty entry is a paragraph separator
struct OutputSequence {
    lines: Vec<String>,
    paragraph_breaks: bool,
}

impl OutputSequence {
    fn new(paragraph_breaks: bool) -> Self {
        Self {
            lines: Vec::new(),
            paragraph_breaks,
        }
    }

    /// Move the buffer into the output if it holds anything visible
    fn flush(&mut self, buffer: &mut String) {
        let content = buffer.trim();
        if !content.is_empty() {
            self.lines.push(content.to_string());
        }
        buffer.clear();
    }

    fn separator(&mut self) {
        if self.paragraph_breaks {
            self.lines.push(String::new());
        }
    }
}

/// Statistics of one walk, reported alongside the cleaned text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyStats {
    pub lines_in: usize,
    pub lines_emitted: usize,
}

/// Walk prepared (newline-normalized) text and produce the cleaned string
pub(crate) fn assemble(patterns: &LinePatterns, text: &str, settings: &AssemblySettings<'_>) -> (String, AssemblyStats) {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut output = OutputSequence::new(settings.preserve_paragraph_breaks);
    let mut buffer = String::new();
    let mut depth = QuoteDepth::new();
    let keep_structure = settings.joiner.keep_list_and_heading_breaks;
    let mut index = 0;

    while index < lines.len() {
        let line = lines[index];

        if is_blank(line) {
            output.flush(&mut buffer);
            // A run of blank lines is one paragraph break
            while index < lines.len() && is_blank(lines[index]) {
                depth.advance(lines[index]);
                index += 1;
            }
            output.separator();
            continue;
        }

        match settings.mode {
            AssemblyMode::LinePerLine => {
                buffer.push_str(line.trim());
                output.flush(&mut buffer);
            }
            AssemblyMode::Merge { allow_hyphen_repair } => {
                if buffer.is_empty() {
                    buffer.push_str(line.trim());
                } else {
                    let ctx = DecisionContext {
                        options: settings.joiner,
                        inside_quote_block: depth.inside(),
                        allow_hyphen_repair,
                    };
                    match decide(patterns, &buffer, line, ctx) {
                        JoinStrategy::NoSpaceJoin => {
                            let keep = strip_trailing_hyphen(&buffer).len();
                            buffer.truncate(keep);
                            buffer.push_str(line.trim_start());
                        }
                        JoinStrategy::SpaceJoin => {
                            buffer.push(' ');
                            buffer.push_str(line.trim());
                        }
                        JoinStrategy::NoJoin => {
                            output.flush(&mut buffer);
                            output.separator();
                            buffer.push_str(line.trim());
                        }
                    }
                }

                if keep_structure {
                    let next_is_structural = lines
                        .get(index + 1)
                        .is_some_and(|next| patterns.is_structural(next));
                    // Headings are single logical lines; a bullet or heading ahead
                    // must not be appended to the line being built
                    if patterns.is_heading(&buffer) || next_is_structural {
                        output.flush(&mut buffer);
                    }
                }
            }
        }

        depth.advance(line);
        index += 1;
    }

    output.flush(&mut buffer);

    let mut cleaned = finish_output(&output.lines);
    if settings.collapse_whitespace {
        cleaned = collapse_whitespace_per_line(&cleaned);
    }

    let stats = AssemblyStats {
        lines_in: if text.is_empty() { 0 } else { lines.len() },
        lines_emitted: output.lines.iter().filter(|line| !line.is_empty()).count(),
    };

    (cleaned, stats)
}
