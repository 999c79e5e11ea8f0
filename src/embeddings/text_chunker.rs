//! Text chunker
//!
//! Splits document text into overlapping character windows. A window is cut
//! at the strongest natural boundary (paragraph, line, sentence, clause, word)
//! found in its second half; failing that it is cut hard at `chunk_size`.
//! Consecutive chunks always share exactly `chunk_overlap` characters.

use serde::{Deserialize, Serialize};

/// Boundaries in order of preference. A chunk ends right after the separator.
const SEPARATORS: &[&str] = &["\n\n", "\n", ". ", "? ", "! ", "; ", ", ", " "];

/// A bounded substring of a source document. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub source_id: String,
    /// Character (not byte) offset of the chunk within its document.
    pub offset: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    /// Sizes are in characters. The overlap is clamped below `chunk_size`
    /// so every window advances.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    pub fn chunk(&self, source_id: &str, text: &str) -> Vec<Chunk> {
        // Byte position of every char boundary, plus the end of the text.
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let total = boundaries.len() - 1;

        if total == 0 {
            return Vec::new();
        }

        if total <= self.chunk_size {
            return vec![Chunk {
                text: text.to_string(),
                source_id: source_id.to_string(),
                offset: 0,
            }];
        }

        let chars: Vec<char> = text.chars().collect();
        let mut chunks = Vec::new();
        let mut start = 0;

        loop {
            let mut end = (start + self.chunk_size).min(total);
            if end < total {
                let earliest = (start + self.chunk_overlap + 1).max(start + self.chunk_size / 2);
                end = natural_break(&chars, earliest, end);
            }

            chunks.push(Chunk {
                text: text[boundaries[start]..boundaries[end]].to_string(),
                source_id: source_id.to_string(),
                offset: start,
            });

            if end == total {
                break;
            }
            start = end - self.chunk_overlap;
        }

        chunks
    }
}

/// Latest position in `earliest..=latest` that directly follows the most
/// preferred separator, or `latest` when none occurs.
fn natural_break(chars: &[char], earliest: usize, latest: usize) -> usize {
    for separator in SEPARATORS {
        let pattern: Vec<char> = separator.chars().collect();
        let found = (earliest..=latest)
            .rev()
            .find(|&end| end >= pattern.len() && chars[end - pattern.len()..end] == pattern[..]);
        if let Some(end) = found {
            return end;
        }
    }
    latest
}
