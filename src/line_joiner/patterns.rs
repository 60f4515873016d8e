// Surface-pattern predicates over a single line or a pair of adjacent lines
// Character sets are literal tables; structural patterns are compiled once per LinePatterns

use anyhow::Result;
use regex_automata::meta::Regex;

/// Characters that open a quotation or bracketed aside.
/// Straight quotes appear in both tables so they net to zero in balance counting.
pub const OPENING_QUOTES: &[char] = &[
    '"', '\u{201C}', '\'', '\u{2018}', '\u{300C}', '\u{300E}', '\u{3008}', '<', '[',
];

/// Mirrors of `OPENING_QUOTES`
pub const CLOSING_QUOTES: &[char] = &[
    '"', '\u{201D}', '\'', '\u{2019}', '\u{300D}', '\u{300F}', '\u{3009}', '>', ']',
];

/// Punctuation that closes a sentence
pub const TERMINAL_STRONG: &[char] = &['.', '!', '?', '\u{2026}', '\u{3002}', '\u{FF01}', '\u{FF1F}'];

/// Punctuation that leaves a clause open
pub const TERMINAL_SOFT: &[char] = &[',', ';', ':', '\u{3001}', '\u{FF0C}'];

const HANGUL_SYLLABLES: std::ops::RangeInclusive<char> = '\u{AC00}'..='\u{D7A3}';

// Pattern sources kept together so tests and docs can refer to them
const HEADING_PATTERN: &str = r"^ {0,3}#{1,6}\s+\S";
const LIST_BULLET_PATTERN: &str = r"^ {0,3}(?:\d+\.\s|[•*\-]\s|\(\d+\)\s)";
const HYPHEN_END_PATTERN: &str = r"[A-Za-z]-\s*$";
const LETTER_START_PATTERN: &str = r"^\s*[A-Za-z]";
const HYPHEN_BREAK_PATTERN: &str = r"[A-Za-z]-\s*\n\s*[A-Za-z]";

/// Compiled structural patterns shared by the decider, cleaners and detector
#[derive(Debug, Clone)]
pub struct LinePatterns {
    heading: Regex,
    list_bullet: Regex,
    hyphen_end: Regex,
    letter_start: Regex,
    hyphen_break: Regex,
}

impl LinePatterns {
    pub fn new() -> Result<Self> {
        Ok(Self {
            heading: Regex::new(HEADING_PATTERN)?,
            list_bullet: Regex::new(LIST_BULLET_PATTERN)?,
            hyphen_end: Regex::new(HYPHEN_END_PATTERN)?,
            letter_start: Regex::new(LETTER_START_PATTERN)?,
            hyphen_break: Regex::new(HYPHEN_BREAK_PATTERN)?,
        })
    }

    /// Markdown-style `#` heading with up to three leading spaces
    pub fn is_heading(&self, line: &str) -> bool {
        self.heading.is_match(line)
    }

    /// Numbered (`1. `), glyph (`• `, `* `, `- `) or parenthesized (`(1) `) list marker
    pub fn is_list_bullet(&self, line: &str) -> bool {
        self.list_bullet.is_match(line)
    }

    /// Heading or list marker; these lines are never merged into prose
    pub fn is_structural(&self, line: &str) -> bool {
        self.is_heading(line) || self.is_list_bullet(line)
    }

    /// `prev` ends with a letter and a hyphen and `next` starts with a letter
    pub fn is_hyphen_break(&self, prev: &str, next: &str) -> bool {
        self.hyphen_end.is_match(prev) && self.letter_start.is_match(next)
    }

    /// Number of hyphen word breaks across the whole (newline-normalized) text
    pub fn count_hyphen_breaks(&self, text: &str) -> usize {
        self.hyphen_break.find_iter(text).count()
    }
}

/// Line is empty or whitespace only
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// First visible character is a lowercase ASCII letter or a Hangul syllable
pub fn starts_lowercase_or_hangul(line: &str) -> bool {
    match line.trim_start().chars().next() {
        Some(ch) => ch.is_ascii_lowercase() || HANGUL_SYLLABLES.contains(&ch),
        None => false,
    }
}

/// First visible character opens a quotation
pub fn starts_with_opening_quote(line: &str) -> bool {
    line.trim_start()
        .chars()
        .next()
        .is_some_and(|ch| OPENING_QUOTES.contains(&ch))
}

/// Last meaningful character, looking through trailing whitespace and closing quotes
fn trailing_punctuation(line: &str) -> Option<char> {
    line.trim_end()
        .trim_end_matches(|c: char| CLOSING_QUOTES.contains(&c))
        .chars()
        .next_back()
}

/// Line ends with a sentence terminator, optionally wrapped in closing quotes
pub fn ends_terminal_strong(line: &str) -> bool {
    trailing_punctuation(line).is_some_and(|ch| TERMINAL_STRONG.contains(&ch))
}

/// Line ends with a clause separator, optionally wrapped in closing quotes
pub fn ends_terminal_soft(line: &str) -> bool {
    trailing_punctuation(line).is_some_and(|ch| TERMINAL_SOFT.contains(&ch))
}

/// Remove the trailing hyphen (and whitespace around it) from a buffer ending in a word break
pub fn strip_trailing_hyphen(buffer: &str) -> &str {
    let trimmed = buffer.trim_end();
    trimmed.strip_suffix('-').unwrap_or(trimmed)
}
