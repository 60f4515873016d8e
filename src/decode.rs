// Byte-to-text decoding for input files of unknown encoding
// UTF-8 first, UTF-16 by BOM or by NUL density, lossy UTF-8 as the last resort

use serde::Serialize;
use tracing::debug;

/// Portion of the file inspected for NUL density
const SAMPLE_LEN: usize = 4096;
/// NUL share of the sample above which UTF-16 is attempted
const NUL_RATIO_THRESHOLD: f64 = 0.2;
/// Weight of the Hangul share in the candidate score
const HANGUL_WEIGHT: f64 = 0.4;

/// Encoding the bytes were decoded with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
    /// Invalid sequences were replaced with U+FFFD
    Utf8Lossy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedText {
    pub text: String,
    pub encoding: TextEncoding,
}

impl DecodedText {
    fn new(text: String, encoding: TextEncoding) -> Self {
        Self { text, encoding }
    }
}

/// Decode raw file bytes into text, guessing the encoding when there is no BOM
pub fn smart_decode(bytes: &[u8]) -> DecodedText {
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return DecodedText::new(String::from_utf8_lossy(rest).into_owned(), TextEncoding::Utf8);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        return DecodedText::new(decode_utf16(rest, u16::from_le_bytes), TextEncoding::Utf16Le);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        return DecodedText::new(decode_utf16(rest, u16::from_be_bytes), TextEncoding::Utf16Be);
    }

    // NUL is valid UTF-8, so the density check runs before the validity check
    if looks_like_utf16(bytes) {
        let decoded = best_utf16_candidate(bytes);
        debug!(encoding = ?decoded.encoding, "decoded NUL-heavy input");
        return decoded;
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => DecodedText::new(text.to_string(), TextEncoding::Utf8),
        Err(e) => {
            debug!(valid_up_to = e.valid_up_to(), "input is not valid UTF-8, decoding lossily");
            DecodedText::new(String::from_utf8_lossy(bytes).into_owned(), TextEncoding::Utf8Lossy)
        }
    }
}

fn looks_like_utf16(bytes: &[u8]) -> bool {
    let sample = &bytes[..bytes.len().min(SAMPLE_LEN)];
    if sample.is_empty() {
        return false;
    }
    let nuls = sample.iter().filter(|&&b| b == 0).count();
    nuls as f64 > sample.len() as f64 * NUL_RATIO_THRESHOLD
}

fn best_utf16_candidate(bytes: &[u8]) -> DecodedText {
    // ASCII in UTF-16LE puts the NUL in the odd byte; try the likelier order first
    let sample = &bytes[..bytes.len().min(SAMPLE_LEN)];
    let odd_nuls = sample.iter().skip(1).step_by(2).filter(|&&b| b == 0).count();
    let even_nuls = sample.iter().step_by(2).filter(|&&b| b == 0).count();

    let le = DecodedText::new(decode_utf16(bytes, u16::from_le_bytes), TextEncoding::Utf16Le);
    let be = DecodedText::new(decode_utf16(bytes, u16::from_be_bytes), TextEncoding::Utf16Be);
    let lossy = DecodedText::new(String::from_utf8_lossy(bytes).into_owned(), TextEncoding::Utf8Lossy);

    let candidates = if odd_nuls >= even_nuls {
        [le, be, lossy]
    } else {
        [be, le, lossy]
    };

    let mut best: Option<(f64, DecodedText)> = None;
    for candidate in candidates {
        let score = score_text(&candidate.text);
        if best.as_ref().map_or(true, |(best_score, _)| score > *best_score) {
            best = Some((score, candidate));
        }
    }

    match best {
        Some((_, decoded)) => decoded,
        None => DecodedText::new(String::new(), TextEncoding::Utf8Lossy),
    }
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> String {
    let units = bytes.chunks_exact(2).map(|pair| to_unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|unit| unit.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Printable share plus a weighted Hangul share of the letters
pub fn score_text(text: &str) -> f64 {
    if text.is_empty() {
        return 0.0;
    }

    let mut total = 0usize;
    let mut printable = 0usize;
    let mut letters = 0usize;
    let mut hangul = 0usize;

    for ch in text.chars() {
        total += 1;
        let is_printable = ch == '\n'
            || ch == '\t'
            || !(ch.is_control() || ch == char::REPLACEMENT_CHARACTER);
        if is_printable {
            printable += 1;
        }
        if ch.is_alphabetic() {
            letters += 1;
        }
        if ('\u{AC00}'..='\u{D7A3}').contains(&ch) {
            hangul += 1;
        }
    }

    let printable_ratio = printable as f64 / total as f64;
    let hangul_ratio = hangul as f64 / letters.max(1) as f64;
    printable_ratio + HANGUL_WEIGHT * hangul_ratio
}
