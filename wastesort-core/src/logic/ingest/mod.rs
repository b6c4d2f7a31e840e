//! Document Ingestion
//!
//! load → split → embed → persist, and reopen for similarity search.
//! Independent from the classification pipeline.

pub mod embedder;
pub mod index;
pub mod loader;
pub mod splitter;


use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::constants::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_INDEX_DIR};
use crate::error::ExportError;

pub use embedder::{ApiEmbedder, ApiEmbedderConfig, Embedder, EmbeddingError, HashEmbedder};
pub use index::{FlatIndex, IndexManifest, IndexedChunk, SearchHit, VectorIndex};
pub use loader::{Document, DocumentLoader, ExtensionLoader, PdfLoader, TextFileLoader};
pub use splitter::{Chunk, RecursiveCharacterSplitter, TextSplitter};

/// Handle returned by [`Ingestor::ingest`] and [`load`]
pub type VectorIndexHandle = FlatIndex;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot extract text from {path}: {message}")]
    Pdf { path: PathBuf, message: String },

    #[error("{0} contains no text")]
    EmptyDocument(PathBuf),

    #[error("chunk_overlap ({chunk_overlap}) must be smaller than chunk_size ({chunk_size})")]
    InvalidChunking {
        chunk_size: usize,
        chunk_overlap: usize,
    },

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error("index is inconsistent: {0}")]
    IndexMismatch(String),

    #[error("index serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Chunking parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSettings {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkSettings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

pub fn default_index_location() -> PathBuf {
    PathBuf::from(DEFAULT_INDEX_DIR)
}

/// Ingestion chain with a pluggable loader and embedder
pub struct Ingestor {
    loader: Arc<dyn DocumentLoader>,
    embedder: Arc<dyn Embedder>,
}

impl Ingestor {
    pub fn new(loader: Arc<dyn DocumentLoader>, embedder: Arc<dyn Embedder>) -> Self {
        Self { loader, embedder }
    }

    /// PDF or text loader by extension, plus local hash embedder; needs no network
    pub fn local() -> Self {
        Self::new(Arc::new(ExtensionLoader), Arc::new(HashEmbedder::default()))
    }

    pub fn embedder(&self) -> &dyn Embedder {
        self.embedder.as_ref()
    }

    /// Build an index for `document_path` and persist it under `index_location`.
    ///
    /// An existing index at that location is replaced.
    pub async fn ingest(
        &self,
        document_path: &Path,
        index_location: &Path,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> Result<VectorIndexHandle, IngestError> {
        let splitter = RecursiveCharacterSplitter::new(chunk_size, chunk_overlap)?;

        let documents = self.loader.load(document_path)?;
        let chunks = splitter.split_documents(&documents);
        if chunks.is_empty() {
            return Err(IngestError::EmptyDocument(document_path.to_path_buf()));
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(IngestError::IndexMismatch(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        let indexed: Vec<IndexedChunk> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexedChunk {
                id: Uuid::new_v4().to_string(),
                text: chunk.text,
                source: chunk.source,
                page: chunk.page,
                embedding,
            })
            .collect();

        let manifest = IndexManifest {
            embedder: self.embedder.name().to_string(),
            dimension: self.embedder.dimension(),
            chunk_size,
            chunk_overlap,
            source_sha256: file_sha256(document_path)?,
            chunk_count: indexed.len(),
            created_at: Utc::now(),
        };

        let index = FlatIndex::new(manifest, indexed)?;
        index.save(index_location)?;

        log::info!(
            "Ingested {} ({} pages, {} chunks) into {}",
            document_path.display(),
            documents.len(),
            index.len(),
            index_location.display()
        );
        Ok(index)
    }

    /// [`Self::ingest`] with the default chunk settings
    pub async fn ingest_with_defaults(
        &self,
        document_path: &Path,
        index_location: &Path,
    ) -> Result<VectorIndexHandle, IngestError> {
        let settings = ChunkSettings::default();
        self.ingest(
            document_path,
            index_location,
            settings.chunk_size,
            settings.chunk_overlap,
        )
        .await
    }
}

/// Reopen a persisted index
pub fn load(index_location: &Path) -> Result<VectorIndexHandle, IngestError> {
    let index = FlatIndex::load(index_location)?;
    log::debug!(
        "Loaded index {} ({} chunks, embedder {})",
        index_location.display(),
        index.len(),
        index.manifest().embedder
    );
    Ok(index)
}

fn file_sha256(path: &Path) -> Result<String, IngestError> {
    let bytes = fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}
