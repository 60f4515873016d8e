// Text normalization shared by both cleaners: input preparation before the line walk,
// output post-processing after it

/// Convert `\r\n` and lone `\r` line endings to `\n`
pub fn normalize_line_endings(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\r' {
            // \r\n counts as a single break
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            result.push('\n');
        } else {
            result.push(ch);
        }
    }

    result
}

/// C0 control characters that extraction tools leave behind (NUL, form feed, etc.).
/// Tab, newline and carriage return are layout and survive.
pub fn is_stray_control(ch: char) -> bool {
    matches!(ch, '\u{0000}'..='\u{0008}' | '\u{000B}' | '\u{000C}' | '\u{000E}'..='\u{001F}')
}

/// Remove stray control characters
pub fn strip_control_chars(text: &str) -> String {
    text.chars().filter(|&ch| !is_stray_control(ch)).collect()
}

/// Input preparation run before any line is classified
pub fn prepare_input(raw: &str, strip_controls: bool) -> String {
    let normalized = normalize_line_endings(raw);
    if strip_controls {
        strip_control_chars(&normalized)
    } else {
        normalized
    }
}

/// Join emitted logical lines and tidy the result.
///
/// Removes spaces/tabs before each newline, caps blank-line runs at one
/// (three or more newlines become two) and trims the whole text.
pub fn finish_output<S: AsRef<str>>(lines: &[S]) -> String {
    let joined = lines
        .iter()
        .map(|line| line.as_ref())
        .collect::<Vec<_>>()
        .join("\n");

    let mut result = String::with_capacity(joined.len());
    let mut blank_run = 0usize;

    for line in joined.split('\n') {
        let line = line.trim_end_matches([' ', '\t']);
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        result.push_str(line);
        result.push('\n');
    }

    result.trim().to_string()
}

/// Collapse every whitespace run into a single space and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    collapse_whitespace_into(text, &mut result);
    result
}

/// Collapse whitespace into a supplied buffer to avoid allocation
pub fn collapse_whitespace_into(text: &str, buffer: &mut String) {
    buffer.clear();
    buffer.reserve(text.len());

    let mut prev_was_space = false;

    for ch in text.chars() {
        if ch.is_whitespace() {
            if !prev_was_space {
                buffer.push(' ');
                prev_was_space = true;
            }
        } else {
            buffer.push(ch);
            prev_was_space = false;
        }
    }

    let trimmed = buffer.trim();
    if trimmed.len() != buffer.len() {
        let trimmed_content = trimmed.to_string();
        buffer.clear();
        buffer.push_str(&trimmed_content);
    }
}

/// Apply [`collapse_whitespace`] to every line, keeping line structure
pub fn collapse_whitespace_per_line(text: &str) -> String {
    let mut buffer = String::new();
    let mut lines = Vec::new();

    for line in text.split('\n') {
        collapse_whitespace_into(line, &mut buffer);
        lines.push(buffer.clone());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_endings_normalized() {
        assert_eq!(normalize_line_endings("a\r\nb\rc\nd"), "a\nb\nc\nd");
        assert_eq!(normalize_line_endings("\r\n\r\n"), "\n\n");
        assert_eq!(normalize_line_endings("\r\r"), "\n\n");
        assert_eq!(normalize_line_endings(""), "");
    }

    #[test]
    fn test_control_chars_stripped() {
        assert_eq!(strip_control_chars("page\u{000C}break\u{0000}"), "pagebreak");
        assert_eq!(strip_control_chars("tab\tand\nnewline"), "tab\tand\nnewline");
        assert_eq!(strip_control_chars("bell\u{0007}"), "bell");
    }

    #[test]
    fn test_prepare_input_respects_flag() {
        assert_eq!(prepare_input("a\u{0001}\r\nb", true), "a\nb");
        assert_eq!(prepare_input("a\u{0001}\r\nb", false), "a\u{0001}\nb");
    }

    #[test]
    fn test_finish_output_tidies() {
        let lines = ["", "First.  ", "", "", "", "Second.\t", ""];
        assert_eq!(finish_output(&lines), "First.\n\nSecond.");
    }

    #[test]
    fn test_finish_output_empty() {
        let lines: [&str; 3] = ["", "", ""];
        assert_eq!(finish_output(&lines), "");
        let none: [&str; 0] = [];
        assert_eq!(finish_output(&none), "");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  Leading   and\ttrailing  "), "Leading and trailing");
        assert_eq!(collapse_whitespace("ideographic\u{3000}\u{3000}space"), "ideographic space");
        assert_eq!(collapse_whitespace("   "), "");
    }

    #[test]
    fn test_collapse_whitespace_buffer_reuse() {
        let mut buffer = String::new();
        collapse_whitespace_into("one   two", &mut buffer);
        assert_eq!(buffer, "one two");
        collapse_whitespace_into(" three ", &mut buffer);
        assert_eq!(buffer, "three");
    }

    #[test]
    fn test_collapse_per_line_keeps_breaks() {
        assert_eq!(collapse_whitespace_per_line("a  b\n\n  c\t d "), "a b\n\nc d");
    }
}
