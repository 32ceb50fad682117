use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{ExtractError, PageText, TextExtractor};

/// Extractor serving fixed page lists keyed by path.
#[derive(Debug, Default, Clone)]
pub struct StaticExtractor {
    documents: HashMap<PathBuf, Vec<String>>,
}

impl StaticExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document<I, S>(mut self, path: impl Into<PathBuf>, pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.documents
            .insert(path.into(), pages.into_iter().map(Into::into).collect());
        self
    }
}

#[async_trait]
impl TextExtractor for StaticExtractor {
    async fn pages(&self, path: &Path) -> Result<Vec<PageText>, ExtractError> {
        let pages = self
            .documents
            .get(path)
            .ok_or_else(|| ExtractError::NotFound(path.to_path_buf()))?;
        Ok(pages
            .iter()
            .enumerate()
            .map(|(i, text)| PageText::new(i as u32 + 1, text.clone()))
            .collect())
    }
}
