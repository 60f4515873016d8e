// Running quotation depth across physical lines

use super::patterns::{CLOSING_QUOTES, OPENING_QUOTES};

/// Opening minus closing quote-like characters on a single line
pub fn balance(line: &str) -> isize {
    line.chars().fold(0isize, |acc, ch| {
        let mut delta = acc;
        if OPENING_QUOTES.contains(&ch) {
            delta += 1;
        }
        if CLOSING_QUOTES.contains(&ch) {
            delta -= 1;
        }
        delta
    })
}

/// Depth of unterminated quotations carried from one physical line to the next.
///
/// The depth is clamped at zero: a stray closer never produces a negative depth
/// that would have to be "paid back" by later openers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuoteDepth(usize);

impl QuoteDepth {
    pub fn new() -> Self {
        Self(0)
    }

    /// Apply one line's balance
    pub fn advance(&mut self, line: &str) {
        let next = self.0 as isize + balance(line);
        self.0 = next.max(0) as usize;
    }

    /// The next line starts inside an open quotation
    pub fn inside(&self) -> bool {
        self.0 > 0
    }

    pub fn depth(&self) -> usize {
        self.0
    }
}
