//! Sliding-window text chunker.
//!
//! Splits page text into overlapping character windows. Windows are counted in
//! Unicode scalar values, never bytes, so multi-byte text is never split inside
//! a code point.
//!
//! For a text of `L` characters with window `W` and overlap `O`:
//! - `L <= W` yields the text as a single chunk;
//! - otherwise windows start at `0, W-O, 2(W-O), ...` until a window reaches the
//!   end of the text, giving `ceil((L - O) / (W - O))` chunks. The last window may
//!   be shorter than `W`.

mod error;


pub use error::ChunkingError;

use serde::{Deserialize, Serialize};

/// One immutable text span of a document page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// `<document-id>:<chunk-index>`.
    pub id: String,
    /// Owning document.
    pub doc_id: u64,
    /// Position within the document, contiguous from 0.
    pub chunk_index: u64,
    /// 1-based page the span came from.
    pub page: u32,
    pub text: String,
}

impl Chunk {
    pub fn new(doc_id: u64, chunk_index: u64, page: u32, text: String) -> Self {
        Self {
            id: chunk_id(doc_id, chunk_index),
            doc_id,
            chunk_index,
            page,
            text,
        }
    }
}

/// Document-scoped chunk id, `<document-id>:<chunk-index>`.
#[inline]
pub fn chunk_id(doc_id: u64, chunk_index: u64) -> String {
    format!("{}:{}", doc_id, chunk_index)
}

/// Deterministic sliding-window chunker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    window: usize,
    overlap: usize,
}

impl Chunker {
    /// Creates a chunker; requires `window > 0` and `overlap < window`.
    pub fn new(window: usize, overlap: usize) -> Result<Self, ChunkingError> {
        if window == 0 || overlap >= window {
            return Err(ChunkingError::InvalidWindow { window, overlap });
        }
        Ok(Self { window, overlap })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Distance between consecutive window starts.
    pub fn stride(&self) -> usize {
        self.window - self.overlap
    }

    /// Splits `text` into windows. Empty input yields one empty chunk.
    pub fn split(&self, text: &str) -> Vec<String> {
        self.spans(text)
            .into_iter()
            .map(|(start, end)| text[start..end].to_string())
            .collect()
    }

    /// Byte ranges of every window, aligned to char boundaries.
    pub fn spans(&self, text: &str) -> Vec<(usize, usize)> {
        // Byte offset of every char plus the end sentinel.
        let offsets: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let len = offsets.len() - 1;

        if len <= self.window {
            return vec![(0, text.len())];
        }

        let stride = self.stride();
        let mut spans = Vec::with_capacity((len - self.overlap).div_ceil(stride));
        let mut start = 0;
        loop {
            let end = (start + self.window).min(len);
            spans.push((offsets[start], offsets[end]));
            // A further window would lie entirely inside this one's overlap.
            if end == len {
                break;
            }
            start += stride;
        }
        spans
    }

    /// Chunks one page, numbering chunks from `first_index`.
    pub fn chunk_page(&self, doc_id: u64, page: u32, text: &str, first_index: u64) -> Vec<Chunk> {
        self.split(text)
            .into_iter()
            .enumerate()
            .map(|(i, piece)| Chunk::new(doc_id, first_index + i as u64, page, piece))
            .collect()
    }

    /// Chunks a sequence of `(page, text)` pairs with contiguous indices across pages.
    pub fn chunk_pages<'a, I>(&self, doc_id: u64, pages: I) -> Vec<Chunk>
    where
        I: IntoIterator<Item = (u32, &'a str)>,
    {
        let mut chunks = Vec::new();
        for (page, text) in pages {
            let next = chunks.len() as u64;
            chunks.extend(self.chunk_page(doc_id, page, text, next));
        }
        chunks
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            window: crate::constants::DEFAULT_CHUNK_WINDOW,
            overlap: crate::constants::DEFAULT_CHUNK_OVERLAP,
        }
    }
}
