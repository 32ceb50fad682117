//! Page-indexed plain-text extraction.

mod error;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod pdf;


pub use error::ExtractError;
#[cfg(any(test, feature = "mock"))]
pub use mock::StaticExtractor;
pub use pdf::PdfExtractor;

use std::path::Path;

use async_trait::async_trait;

/// Text of one page. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub page: u32,
    pub text: String,
}

impl PageText {
    pub fn new(page: u32, text: impl Into<String>) -> Self {
        Self {
            page,
            text: text.into(),
        }
    }
}

/// Produces the pages of a document in order. Calling it twice on the same
/// path yields the same pages.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn pages(&self, path: &Path) -> Result<Vec<PageText>, ExtractError>;
}

/// Opening excerpt of a document: the non-blank text of the first
/// `max_pages` pages joined by newlines, cut to `max_chars` characters.
pub fn excerpt(pages: &[PageText], max_pages: usize, max_chars: usize) -> String {
    let joined = pages
        .iter()
        .take(max_pages)
        .map(|p| p.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    match joined.char_indices().nth(max_chars) {
        Some((cut, _)) => joined[..cut].to_string(),
        None => joined,
    }
}
