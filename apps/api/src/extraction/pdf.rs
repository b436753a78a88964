//! Structural PDF text recovery.
//!
//! Neither strategy reads the PDF object model: there is no cross-reference
//! resolution, no stream decompression and no font encoding lookup. Both pattern-match
//! the raw bytes, which works for uncompressed text-layer PDFs. Anything else falls
//! through to the next strategy in the chain.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::bytes::Regex as BytesRegex;
use regex::Regex;

use crate::extraction::{
    normalize_whitespace, ExtractedText, ExtractionError, ExtractionMethod, TextExtractor,
};

/// A structural strategy must recover strictly more than this many characters.
pub const MIN_STRUCTURAL_CHARS: usize = 100;

/// Kerning adjustments at or below this value (thousandths of an em) read as a word gap.
const TJ_SPACE_THRESHOLD: f32 = -200.0;

/// Strategy A: literal operands of text-showing operators inside `BT … ET` objects.
pub struct TextObjectExtractor;

/// Strategy B: printable ASCII runs scraped from anywhere in the file, minus PDF syntax.
pub struct PrintableRunExtractor;

#[async_trait]
impl TextExtractor for TextObjectExtractor {
    fn name(&self) -> &'static str {
        "pdf-text-objects"
    }

    async fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
        accept(self.name(), extract_text_objects(bytes))
    }
}

#[async_trait]
impl TextExtractor for PrintableRunExtractor {
    fn name(&self) -> &'static str {
        "pdf-printable-runs"
    }

    async fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
        accept(self.name(), scrape_printable_runs(bytes))
    }
}

fn accept(strategy: &'static str, text: String) -> Result<ExtractedText, ExtractionError> {
    let chars = text.chars().count();
    if chars > MIN_STRUCTURAL_CHARS {
        Ok(ExtractedText {
            content: text,
            method: ExtractionMethod::StructuralPdf,
        })
    } else {
        Err(ExtractionError::InsufficientText {
            strategy,
            chars,
            required: MIN_STRUCTURAL_CHARS,
        })
    }
}

/// Body of a literal string: escaped bytes and one level of balanced, unescaped
/// parentheses, as in `(Python (Django) developer)`.
const LITERAL_BODY: &str = r"(?:[^\\()]|\\.|\((?:[^\\()]|\\.)*\))*";

/// A `BT … ET` text object. Literals are consumed whole so an `ET` inside one does
/// not close the object; an unbalanced `(` falls back to a single byte.
fn text_object_re() -> &'static BytesRegex {
    static RE: OnceLock<BytesRegex> = OnceLock::new();
    RE.get_or_init(|| {
        BytesRegex::new(&format!(
            r"(?s-u)\bBT\b((?:\({LITERAL_BODY}\)|[^(]|\()*?)\bET\b"
        ))
        .unwrap()
    })
}

/// `(literal) Tj`, `(literal) '`, `aw ac (literal) "` and `[array] TJ`.
fn show_operator_re() -> &'static BytesRegex {
    static RE: OnceLock<BytesRegex> = OnceLock::new();
    RE.get_or_init(|| {
        BytesRegex::new(&format!(
            r#"(?s-u)\(({LITERAL_BODY})\)\s*(?:Tj|'|")|\[((?:\({LITERAL_BODY}\)|[^\]\\(]|\\.)*)\]\s*TJ"#
        ))
        .unwrap()
    })
}

fn array_element_re() -> &'static BytesRegex {
    static RE: OnceLock<BytesRegex> = OnceLock::new();
    RE.get_or_init(|| {
        BytesRegex::new(&format!(r"(?s-u)\(({LITERAL_BODY})\)|(-?\d*\.?\d+)")).unwrap()
    })
}

/// Concatenates the literal strings shown inside every text object, in document order.
pub fn extract_text_objects(bytes: &[u8]) -> String {
    let mut pieces = Vec::new();

    for object in text_object_re().captures_iter(bytes) {
        let Some(body) = object.get(1) else { continue };
        for operator in show_operator_re().captures_iter(body.as_bytes()) {
            if let Some(literal) = operator.get(1) {
                pieces.push(decode_literal(literal.as_bytes()));
            } else if let Some(array) = operator.get(2) {
                pieces.push(decode_array(array.as_bytes()));
            }
        }
    }

    normalize_whitespace(&pieces.join(" "))
}

/// Joins the literal strings of a `TJ` array. Numeric kerning elements are dropped,
/// except large negative ones which stand for the gap between two words.
fn decode_array(array: &[u8]) -> String {
    let mut text = String::new();
    for element in array_element_re().captures_iter(array) {
        if let Some(literal) = element.get(1) {
            text.push_str(&decode_literal(literal.as_bytes()));
        } else if let Some(number) = element.get(2) {
            let kerning = std::str::from_utf8(number.as_bytes())
                .ok()
                .and_then(|n| n.parse::<f32>().ok())
                .unwrap_or_default();
            if kerning <= TJ_SPACE_THRESHOLD {
                text.push(' ');
            }
        }
    }
    text
}

/// Resolves the escape sequences of a PDF literal string body.
/// Bytes are read as Latin-1; control characters become spaces.
fn decode_literal(raw: &[u8]) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;

    while i < raw.len() {
        if raw[i] != b'\\' {
            out.push(latin1(raw[i]));
            i += 1;
            continue;
        }

        i += 1;
        let Some(&escaped) = raw.get(i) else { break };
        match escaped {
            b'n' | b'r' | b't' | b'b' | b'f' => out.push(' '),
            b'0'..=b'7' => {
                let mut value: u32 = 0;
                let mut digits = 0;
                while digits < 3 && i < raw.len() && (b'0'..=b'7').contains(&raw[i]) {
                    value = value * 8 + u32::from(raw[i] - b'0');
                    i += 1;
                    digits += 1;
                }
                out.push(latin1((value & 0xFF) as u8));
                continue;
            }
            // Backslash at end of line continues the string.
            b'\r' | b'\n' => {}
            other => out.push(latin1(other)),
        }
        i += 1;
    }

    out
}

fn latin1(byte: u8) -> char {
    if byte.is_ascii_control() {
        ' '
    } else {
        char::from(byte)
    }
}

fn printable_run_re() -> &'static BytesRegex {
    static RE: OnceLock<BytesRegex> = OnceLock::new();
    RE.get_or_init(|| BytesRegex::new(r"(?-u)[A-Za-z0-9\s.,@()\-]{4,}").unwrap())
}

fn structural_noise_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\b\d+\s+\d+\s+(?:obj|R)\b|\b(?:endobj|endstream|stream|startxref|xref|trailer)\b|%%EOF",
        )
        .unwrap()
    })
}

fn stray_symbol_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s.,@()+#\-]").unwrap())
}

/// Joins every printable ASCII run of four or more bytes, then strips PDF syntax
/// keywords, indirect references and leftover symbols.
pub fn scrape_printable_runs(bytes: &[u8]) -> String {
    let runs: Vec<&str> = printable_run_re()
        .find_iter(bytes)
        .filter_map(|m| std::str::from_utf8(m.as_bytes()).ok())
        .collect();

    let joined = normalize_whitespace(&runs.join(" "));
    let without_syntax = structural_noise_re().replace_all(&joined, " ");
    let without_symbols = stray_symbol_re().replace_all(&without_syntax, " ");
    normalize_whitespace(&without_symbols)
}
