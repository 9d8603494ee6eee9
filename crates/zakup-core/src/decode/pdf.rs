//! PDF text extraction using lopdf and pdf-extract.
//!
//! The container stores text as a flat stream of positioned glyph runs with
//! no semantic ordering guarantee, so decoding is a three-step
//! reconstruction: collect runs with their (x, y) positions, re-order them
//! top-to-bottom / left-to-right with a same-line tolerance band, then run a
//! de-fragmentation pass over the assembled text.

use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};
use tracing::{debug, trace};

use crate::error::DecodeError;

use lazy_static::lazy_static;
use regex::Regex;

/// Runs whose y positions differ by no more than this are treated as the
/// same visual line, so sub-pixel y noise does not reorder them.
const LINE_TOLERANCE: f64 = 3.0;

/// A kern adjustment in a TJ array more negative than this (thousandths of
/// an em) renders as an inter-word gap.
const KERN_SPACE_THRESHOLD: f64 = -180.0;

/// One positioned text run from a page content stream.
#[derive(Debug, Clone)]
struct TextRun {
    x: f64,
    y: f64,
    text: String,
}

/// Decode a PDF document into raw extracted text.
pub fn decode_pdf(data: &[u8]) -> Result<String, DecodeError> {
    let mut doc = Document::load_mem(data).map_err(|e| DecodeError::PdfParse(e.to_string()))?;

    // Handle PDFs with empty password encryption; keep the decrypted bytes
    // around for the flat extractor fallback.
    let raw_data = if doc.is_encrypted() {
        if doc.decrypt("").is_err() {
            return Err(DecodeError::Encrypted);
        }
        debug!("decrypted PDF with empty password");
        let mut decrypted = Vec::new();
        doc.save_to(&mut decrypted)
            .map_err(|e| DecodeError::PdfParse(format!("failed to save decrypted PDF: {}", e)))?;
        decrypted
    } else {
        data.to_vec()
    };

    let pages = doc.get_pages();
    if pages.is_empty() {
        return Err(DecodeError::NoPages);
    }

    let mut page_texts = Vec::new();
    for (&number, &page_id) in &pages {
        let runs = collect_page_runs(&doc, page_id).unwrap_or_default();
        trace!("page {}: {} text runs", number, runs.len());
        let text = assemble_runs(runs);
        if !text.is_empty() {
            page_texts.push(text);
        }
    }
    let mut text = page_texts.join("\n\n");

    // Positional reconstruction cannot map CID-encoded fonts; hand those
    // documents to the flat extractor instead.
    if text.trim().is_empty() {
        debug!("positional extraction produced no text, using flat extractor");
        text = pdf_extract::extract_text_from_mem(&raw_data)
            .map_err(|e| DecodeError::TextExtraction(e.to_string()))?;
    }

    Ok(defragment(&text))
}

/// Walk a page content stream and collect text runs with positions.
///
/// Only the text-positioning subset of operators is interpreted: the run
/// origin tracks `Tm`/`Td`/`TD`/`TL`/`T*`, which is enough to order runs;
/// glyph widths are not needed because same-position runs keep
/// content-stream order.
fn collect_page_runs(doc: &Document, page_id: ObjectId) -> Result<Vec<TextRun>, DecodeError> {
    let content = doc
        .get_page_content(page_id)
        .map_err(|e| DecodeError::TextExtraction(e.to_string()))?;
    let content =
        Content::decode(&content).map_err(|e| DecodeError::TextExtraction(e.to_string()))?;

    let mut runs = Vec::new();
    let mut x = 0.0f64;
    let mut y = 0.0f64;
    let mut leading = 0.0f64;

    fn push(x: f64, y: f64, text: String, runs: &mut Vec<TextRun>) {
        if !text.is_empty() {
            runs.push(TextRun { x, y, text });
        }
    }

    for op in &content.operations {
        match op.operator.as_str() {
            "BT" => {
                x = 0.0;
                y = 0.0;
                leading = 0.0;
            }
            "Tm" => {
                if op.operands.len() >= 6 {
                    x = as_number(&op.operands[4]).unwrap_or(x);
                    y = as_number(&op.operands[5]).unwrap_or(y);
                }
            }
            "Td" | "TD" => {
                if op.operands.len() >= 2 {
                    let tx = as_number(&op.operands[0]).unwrap_or(0.0);
                    let ty = as_number(&op.operands[1]).unwrap_or(0.0);
                    x += tx;
                    y += ty;
                    if op.operator == "TD" {
                        leading = -ty;
                    }
                }
            }
            "TL" => {
                if let Some(l) = op.operands.first().and_then(as_number) {
                    leading = l;
                }
            }
            "T*" => y -= leading,
            "Tj" => {
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    push(x, y, decode_pdf_string(bytes), &mut runs);
                }
            }
            "'" => {
                y -= leading;
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    push(x, y, decode_pdf_string(bytes), &mut runs);
                }
            }
            "\"" => {
                y -= leading;
                if let Some(Object::String(bytes, _)) = op.operands.get(2) {
                    push(x, y, decode_pdf_string(bytes), &mut runs);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = op.operands.first() {
                    let mut buf = String::new();
                    for item in items {
                        match item {
                            Object::String(bytes, _) => buf.push_str(&decode_pdf_string(bytes)),
                            other => {
                                if as_number(other).is_some_and(|n| n < KERN_SPACE_THRESHOLD) {
                                    buf.push(' ');
                                }
                            }
                        }
                    }
                    push(x, y, buf, &mut runs);
                }
            }
            _ => {}
        }
    }

    Ok(runs)
}

fn as_number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

/// Decode a PDF string object: BOM-marked UTF-16BE, UTF-8, or byte-per-char.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else if let Ok(s) = std::str::from_utf8(bytes) {
        s.to_string()
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}

/// Order runs top-to-bottom then left-to-right and join them into text.
///
/// PDF origin is bottom-left, so top-to-bottom means descending y. Both
/// sorts are stable: runs with equal keys keep content-stream order. Runs
/// within a line are concatenated with no added separator; lines are joined
/// with newlines.
fn assemble_runs(mut runs: Vec<TextRun>) -> String {
    runs.sort_by(|a, b| b.y.total_cmp(&a.y));

    let mut lines: Vec<Vec<TextRun>> = Vec::new();
    for run in runs {
        match lines.last_mut() {
            Some(line) if (line[0].y - run.y).abs() <= LINE_TOLERANCE => line.push(run),
            _ => lines.push(vec![run]),
        }
    }

    for line in &mut lines {
        line.sort_by(|a, b| a.x.total_cmp(&b.x));
    }

    lines
        .iter()
        .map(|line| line.iter().map(|r| r.text.as_str()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

lazy_static! {
    static ref CURRENCY_FRAGMENTS: Vec<(Regex, &'static str)> = vec![
        (Regex::new(r"(?i)\bK\s*Z\s*T\b").unwrap(), "KZT"),
        (Regex::new(r"(?i)\bU\s*S\s*D\b").unwrap(), "USD"),
        (Regex::new(r"(?i)\bE\s*U\s*R\b").unwrap(), "EUR"),
        (Regex::new(r"(?i)\bR\s*U\s*B\b").unwrap(), "RUB"),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenClass {
    Cyrillic,
    Latin,
    Digit,
    Other,
}

fn char_class(c: char) -> TokenClass {
    if c.is_ascii_digit() {
        TokenClass::Digit
    } else if c.is_ascii_alphabetic() {
        TokenClass::Latin
    } else if ('\u{0400}'..='\u{04FF}').contains(&c) {
        TokenClass::Cyrillic
    } else {
        TokenClass::Other
    }
}

fn token_class(token: &str) -> TokenClass {
    let mut chars = token.chars();
    let first = match chars.next() {
        Some(c) => char_class(c),
        None => return TokenClass::Other,
    };
    if first == TokenClass::Other {
        return TokenClass::Other;
    }
    if chars.all(|c| char_class(c) == first) {
        first
    } else {
        TokenClass::Other
    }
}

/// De-fragmentation pass over decoded text.
///
/// Many source PDFs emit each character as a separate run, producing
/// spuriously space-separated letters and digits. Adjacent single-character
/// tokens of the same script class are merged into one token, and split
/// currency codes ("K Z T") are coalesced into canonical 3-letter codes.
/// Lossy by design: unrelated adjacent single-letter tokens merge too.
pub(crate) fn defragment(text: &str) -> String {
    let merged: Vec<String> = text.lines().map(defragment_line).collect();
    let mut out = merged.join("\n");
    for (pattern, code) in CURRENCY_FRAGMENTS.iter() {
        out = pattern.replace_all(&out, *code).into_owned();
    }
    out
}

fn defragment_line(line: &str) -> String {
    let mut tokens: Vec<String> = Vec::new();
    // True while the last token is a cluster built from single-char tokens;
    // only such clusters keep absorbing further single chars.
    let mut tail_is_cluster = false;

    for token in line.split_whitespace() {
        let class = token_class(token);
        let is_single = token.chars().count() == 1 && class != TokenClass::Other;
        if is_single && tail_is_cluster {
            if let Some(last) = tokens.last_mut() {
                if token_class(last) == class {
                    last.push_str(token);
                    continue;
                }
            }
        }
        tokens.push(token.to_string());
        tail_is_cluster = is_single;
    }

    tokens.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::Operation;
    use lopdf::{Document, Object, Stream, dictionary};
    use pretty_assertions::assert_eq;

    fn run(x: f64, y: f64, text: &str) -> TextRun {
        TextRun { x, y, text: text.to_string() }
    }

    #[test]
    fn runs_ordered_top_to_bottom_then_left_to_right() {
        let runs = vec![
            run(200.0, 650.0, " 150000"),
            run(72.0, 700.0, "Коммерческое предложение"),
            run(72.0, 650.0, "ИТОГО:"),
        ];
        assert_eq!(
            assemble_runs(runs),
            "Коммерческое предложение\nИТОГО: 150000"
        );
    }

    #[test]
    fn sub_pixel_y_noise_stays_on_one_line() {
        let runs = vec![
            run(72.0, 650.4, "ИТОГО:"),
            run(150.0, 649.8, " 150000"),
            run(230.0, 650.1, " KZT"),
        ];
        assert_eq!(assemble_runs(runs), "ИТОГО: 150000 KZT");
    }

    #[test]
    fn equal_position_runs_keep_stream_order() {
        let runs = vec![run(72.0, 700.0, "АО "), run(72.0, 700.0, "Пример")];
        assert_eq!(assemble_runs(runs), "АО Пример");
    }

    #[test]
    fn defragment_merges_split_currency_code() {
        assert_eq!(defragment("150000 K Z T"), "150000 KZT");
        assert_eq!(defragment("100 U S D"), "100 USD");
    }

    #[test]
    fn defragment_merges_single_letter_runs() {
        assert_eq!(defragment("И Т О Г О : нет"), "ИТОГО : нет");
        assert_eq!(defragment("1 5 0 0 0 0 тенге"), "150000 тенге");
    }

    #[test]
    fn defragment_does_not_cross_script_boundaries() {
        assert_eq!(defragment("А B 1"), "А B 1");
    }

    #[test]
    fn defragment_leaves_whole_words_alone() {
        let text = "Доставка в течение 7 дней";
        assert_eq!(defragment(text), text);
    }

    #[test]
    fn defragment_does_not_glue_single_char_onto_word() {
        // "Доставка" is a whole word, not a single-letter cluster.
        assert_eq!(defragment("Доставка и оплата"), "Доставка и оплата");
    }

    #[test]
    fn pdf_string_decoding() {
        assert_eq!(decode_pdf_string("ИТОГО".as_bytes()), "ИТОГО");
        // UTF-16BE with BOM: "AB"
        assert_eq!(decode_pdf_string(&[0xFE, 0xFF, 0x00, 0x41, 0x00, 0x42]), "AB");
        // Invalid UTF-8 falls back to byte-per-char
        assert_eq!(decode_pdf_string(&[0x41, 0xFF]), "Aÿ");
    }

    fn build_pdf(lines: &[(i64, i64, &str)]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
        ];
        for &(x, y, text) in lines {
            operations.push(Operation::new(
                "Tm",
                vec![1.into(), 0.into(), 0.into(), 1.into(), x.into(), y.into()],
            ));
            operations.push(Operation::new("Tj", vec![Object::string_literal(text)]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn decodes_synthetic_pdf_in_reading_order() {
        let bytes = build_pdf(&[
            (72, 650, "ITOGO: 150000 K Z T"),
            (72, 700, "Kommercheskoe predlozhenie"),
        ]);
        let text = decode_pdf(&bytes).unwrap();
        assert_eq!(text, "Kommercheskoe predlozhenie\nITOGO: 150000 KZT");
    }

    #[test]
    fn decoding_is_deterministic() {
        let bytes = build_pdf(&[(72, 700, "Postavka 7 dnej"), (72, 650, "Summa 5000")]);
        let first = decode_pdf(&bytes).unwrap();
        let second = decode_pdf(&bytes).unwrap();
        assert_eq!(first, second);
    }
}
