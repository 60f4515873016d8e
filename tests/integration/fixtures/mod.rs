// Input/expected pairs for golden-file tests

#![allow(dead_code)]

/// PDF-style extraction: short lines, a heading, a hyphenated break and a list
pub const PDF_TEXT: &str = "# Introduction
The quick brown fox jumps over the
lazy dog, and the infor-
mation age begins.
Next paragraph starts here
and continues on.

1. first item
2. second item";

pub const PDF_EXPECTED: &str = "# Introduction
The quick brown fox jumps over the lazy dog, and the information age begins.

Next paragraph starts here and continues on.

1. first item
2. second item";

/// Hard-wrapped plain text with long lines and no hyphenated breaks
pub const HARD_WRAP_TEXT: &str = "It was a bright cold day in April, and the clocks were striking thirteen.
Winston Smith, his chin nuzzled into his breast in an effort to escape
the vile wind, slipped quickly through the glass doors of Victory Mansions.

Outside, even through the shut window-pane, the world looked cold to him.";

/// HARD_WRAP_TEXT cleaned as explicit plain text (single breaks merged)
pub const HARD_WRAP_MERGED: &str = "It was a bright cold day in April, and the clocks were striking thirteen.

Winston Smith, his chin nuzzled into his breast in an effort to escape the vile wind, slipped quickly through the glass doors of Victory Mansions.

Outside, even through the shut window-pane, the world looked cold to him.";

/// A quotation spanning lines, one of which starts with a capital
pub const QUOTE_TEXT: &str = "\u{201C}Listen to me,\u{201D} she said, \u{201C}the train
leaves at noon and you
Must not miss it.\u{201D}";

pub const QUOTE_EXPECTED: &str =
    "\u{201C}Listen to me,\u{201D} she said, \u{201C}the train leaves at noon and you Must not miss it.\u{201D}";

/// Korean prose wrapped mid-sentence
pub const HANGUL_TEXT: &str = "나는 어제 학교에
갔다. 날씨가
맑았다.";

pub const HANGUL_EXPECTED: &str = "나는 어제 학교에 갔다. 날씨가 맑았다.";

/// Large PDF-like text for throughput tests
pub fn generate_large_text() -> String {
    let mut result = String::new();
    for i in 1..=500 {
        result.push_str(&format!("Paragraph {i} opens with a line that wraps\n"));
        result.push_str("onto a second line with a hyphen-\n");
        result.push_str("ated word and ends here.\n");
        if i % 10 == 0 {
            result.push('\n');
        }
    }
    result
}
