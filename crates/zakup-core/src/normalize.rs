//! Text normalization between decoding and extraction.

/// Normalize decoder output: collapse runs of horizontal whitespace to
/// single spaces, trim every line, and drop blank lines.
///
/// Line boundaries are preserved because the fallback extractor's line-item
/// cascade operates on candidate lines. The function is idempotent:
/// normalizing already-normalized text is a no-op.
pub fn normalize(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
