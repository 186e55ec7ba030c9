//! Text chunking
//!
//! Proposal text is cut into fixed-size character windows that overlap by a
//! fixed number of characters. Windows are counted in Unicode scalar values
//! and ignore sentence or token structure.

use crate::config::ChunkConfig;

/// Separator placed between the text of consecutive PDF pages
pub const PAGE_SEPARATOR: &str = "\n\n";

/// Join page texts into one document
pub fn join_pages(pages: &[String]) -> String {
    pages.join(PAGE_SEPARATOR)
}

/// Split text into overlapping windows of at most `config.max_chars` characters.
///
/// Consecutive windows share exactly `config.overlap_chars` characters. The
/// last window ends at the end of the text. Empty text yields no windows.
pub fn split_text(text: &str, config: &ChunkConfig) -> Vec<String> {
    // Byte offset of every char, plus the end of the string
    let mut offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let char_count = offsets.len();
    offsets.push(text.len());

    if char_count == 0 {
        return Vec::new();
    }

    let size = config.max_chars.max(1);
    let step = size.saturating_sub(config.overlap_chars).max(1);

    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let end = (start + size).min(char_count);
        chunks.push(text[offsets[start]..offsets[end]].to_string());

        if end == char_count {
            break;
        }
        start += step;
    }

    chunks
}

/// Split text and drop windows that hold nothing but whitespace
pub fn chunk_text(text: &str, config: &ChunkConfig) -> Vec<String> {
    split_text(text, config)
        .into_iter()
        .filter(|chunk| !chunk.trim().is_empty())
        .collect()
}
