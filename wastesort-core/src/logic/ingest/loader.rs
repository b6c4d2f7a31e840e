use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::IngestError;

/// One page of source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub source: String,
    /// 0-based
    pub page: usize,
}

/// Capability: turn a file into page-level documents
pub trait DocumentLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Vec<Document>, IngestError>;
}

/// UTF-8 text where form feeds separate pages
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFileLoader;

impl DocumentLoader for TextFileLoader {
    fn load(&self, path: &Path) -> Result<Vec<Document>, IngestError> {
        let raw = fs::read_to_string(path).map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        paginate(path, &raw)
    }
}

/// PDF text extraction through `pdf-extract`
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfLoader;

impl DocumentLoader for PdfLoader {
    fn load(&self, path: &Path) -> Result<Vec<Document>, IngestError> {
        let bytes = fs::read(path).map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let text = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| IngestError::Pdf {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        log::debug!("Extracted {} chars from {}", text.len(), path.display());

        paginate(path, &text)
    }
}

/// Picks [`PdfLoader`] for `.pdf` files and [`TextFileLoader`] for the rest
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionLoader;

impl ExtensionLoader {
    pub fn is_pdf(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
    }
}

impl DocumentLoader for ExtensionLoader {
    fn load(&self, path: &Path) -> Result<Vec<Document>, IngestError> {
        if Self::is_pdf(path) {
            PdfLoader.load(path)
        } else {
            TextFileLoader.load(path)
        }
    }
}

/// Form feeds separate pages; blank pages are dropped but keep their number
fn paginate(path: &Path, raw: &str) -> Result<Vec<Document>, IngestError> {
    let source = path.display().to_string();
    let pages: Vec<Document> = raw
        .split('\x0c')
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(page, text)| Document {
            text: text.to_string(),
            source: source.clone(),
            page,
        })
        .collect();

    if pages.is_empty() {
        return Err(IngestError::EmptyDocument(path.to_path_buf()));
    }
    Ok(pages)
}
