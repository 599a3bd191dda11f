//! Text chunking with configurable size and overlap.

use crate::types::ChunkCandidate;

/// Chunk text into fixed-size character windows.
///
/// `chunk_size` and `overlap` are counted in characters. Every candidate's
/// metadata records `source` plus the character span it covers.
pub fn chunk_text(
    source_id: &str,
    source: &str,
    text: &str,
    chunk_size: usize,
    overlap: usize,
) -> Vec<ChunkCandidate> {
    if text.trim().is_empty() || chunk_size == 0 {
        return vec![];
    }

    // Byte offset of every char, plus the end of the string
    let mut offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    offsets.push(text.len());
    let char_count = offsets.len() - 1;

    let step = if chunk_size > overlap {
        chunk_size - overlap
    } else {
        chunk_size
    };

    let mut chunks = Vec::new();
    let mut position = 0u32;
    let mut start = 0usize;

    while start < char_count {
        let end = (start + chunk_size).min(char_count);
        let window = text[offsets[start]..offsets[end]].trim();

        if !window.is_empty() {
            chunks.push(ChunkCandidate {
                source_id: source_id.to_string(),
                position,
                text: window.to_string(),
                metadata: serde_json::json!({
                    "source": source,
                    "start": start,
                    "end": end,
                }),
            });
            position += 1;
        }

        if end == char_count {
            break;
        }
        start += step;
    }

    tracing::debug!(
        "Chunked text into {} chunks (size: {}, overlap: {})",
        chunks.len(),
        chunk_size,
        overlap
    );

    chunks
}
