//! Sliding-window text chunker with stable indexing.
//!
//! Splits document text into overlapping character windows: walk the text
//! in windows of `target_size` characters, stepping by
//! `target_size - overlap`. The final window may be shorter and is still
//! emitted as long as it contains at least one non-whitespace character.
//!
//! Sizes are character counts, not tokens or bytes; multi-byte UTF-8
//! input is sliced on character boundaries. Identical input and
//! parameters always produce an identical chunk sequence; there is no
//! randomness and no locale-dependent tokenization.
//!
//! # Example
//!
//! ```rust
//! use groundwork::chunk::chunk_text;
//!
//! let text = "x".repeat(500);
//! let spans = chunk_text(&text, 200, 50, 50).unwrap();
//! assert_eq!(spans.len(), 3);
//! assert_eq!(spans[1].index, 1);
//! assert_eq!(spans[1].char_len, 200);
//! ```

use anyhow::anyhow;

use crate::error::IngestError;

/// Default minimum viable document length in characters.
pub const MIN_DOCUMENT_CHARS: usize = 50;

/// One window produced by [`chunk_text`]: zero-based index, text span,
/// and span length in characters.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkSpan {
    pub index: i64,
    pub text: String,
    pub char_len: usize,
}

/// Split `text` into overlapping windows of `target_size` characters.
///
/// Adjacent windows share `overlap` characters: window `i+1` starts
/// `target_size - overlap` characters after window `i`. Full-size windows
/// are always emitted; a shorter final window is emitted only if it
/// contains at least one non-whitespace character.
///
/// # Errors
///
/// - [`IngestError::ExtractionTooShort`] when the text is shorter than
///   `min_chars` or shorter than `target_size`; such documents are
///   rejected rather than chunked.
/// - `overlap >= target_size` or `target_size == 0` are parameter errors.
pub fn chunk_text(
    text: &str,
    target_size: usize,
    overlap: usize,
    min_chars: usize,
) -> Result<Vec<ChunkSpan>, IngestError> {
    if target_size == 0 {
        return Err(IngestError::Other(anyhow!("target_size must be > 0")));
    }
    if overlap >= target_size {
        return Err(IngestError::Other(anyhow!(
            "overlap ({}) must be smaller than target_size ({})",
            overlap,
            target_size
        )));
    }

    // Byte offset of every character boundary, plus the end of the text,
    // so windows measured in characters can slice the UTF-8 buffer.
    let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    boundaries.push(text.len());
    let total_chars = boundaries.len() - 1;

    if total_chars < min_chars {
        return Err(IngestError::ExtractionTooShort {
            length: total_chars,
            minimum: min_chars,
        });
    }
    if total_chars < target_size {
        return Err(IngestError::ExtractionTooShort {
            length: total_chars,
            minimum: target_size,
        });
    }

    let step = target_size - overlap;
    let mut spans = Vec::new();
    let mut start = 0usize;
    let mut index: i64 = 0;

    loop {
        let end = (start + target_size).min(total_chars);
        let piece = &text[boundaries[start]..boundaries[end]];
        let is_final = end == total_chars;
        let is_short = end - start < target_size;

        if !(is_short && piece.chars().all(char::is_whitespace)) {
            spans.push(ChunkSpan {
                index,
                text: piece.to_string(),
                char_len: end - start,
            });
            index += 1;
        }

        if is_final {
            break;
        }
        start += step;
    }

    Ok(spans)
}
