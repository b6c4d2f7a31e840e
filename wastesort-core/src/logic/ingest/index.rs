//! Flat cosine index persisted as two JSON files.

use std::cmp::Ordering;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::embedder::Embedder;
use super::IngestError;
use crate::logic::report::writer::atomic_write;

pub const INDEX_FILE: &str = "index.json";
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedChunk {
    pub id: String,
    pub text: String,
    pub source: String,
    pub page: usize,
    pub embedding: Vec<f32>,
}

/// What built the index; checked on load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    pub embedder: String,
    pub dimension: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub source_sha256: String,
    pub chunk_count: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SearchHit {
    pub id: String,
    pub text: String,
    pub source: String,
    pub page: usize,
    pub score: f32,
}

/// Capability: store embedded chunks and answer nearest-neighbour queries
pub trait VectorIndex: Send + Sync {
    fn search(&self, query: &[f32], k: usize) -> Vec<SearchHit>;
    fn save(&self, dir: &Path) -> Result<(), IngestError>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
pub struct FlatIndex {
    manifest: IndexManifest,
    chunks: Vec<IndexedChunk>,
}

impl FlatIndex {
    pub fn new(manifest: IndexManifest, chunks: Vec<IndexedChunk>) -> Result<Self, IngestError> {
        if let Some(bad) = chunks.iter().find(|c| c.embedding.len() != manifest.dimension) {
            return Err(IngestError::IndexMismatch(format!(
                "chunk {} has dimension {}, manifest says {}",
                bad.id,
                bad.embedding.len(),
                manifest.dimension
            )));
        }
        Ok(Self { manifest, chunks })
    }

    /// Reopen an index written by [`VectorIndex::save`]
    pub fn load(dir: &Path) -> Result<Self, IngestError> {
        let manifest: IndexManifest = read_json(&dir.join(MANIFEST_FILE))?;
        let chunks: Vec<IndexedChunk> = read_json(&dir.join(INDEX_FILE))?;

        if chunks.len() != manifest.chunk_count {
            return Err(IngestError::IndexMismatch(format!(
                "manifest lists {} chunks, index holds {}",
                manifest.chunk_count,
                chunks.len()
            )));
        }
        Self::new(manifest, chunks)
    }

    pub fn manifest(&self) -> &IndexManifest {
        &self.manifest
    }

    pub fn chunks(&self) -> &[IndexedChunk] {
        &self.chunks
    }

    /// Embed `text` with the same embedder family, then search
    pub async fn similarity_search(
        &self,
        text: &str,
        k: usize,
        embedder: &dyn Embedder,
    ) -> Result<Vec<SearchHit>, IngestError> {
        if embedder.dimension() != self.manifest.dimension {
            return Err(IngestError::IndexMismatch(format!(
                "embedder {} produces dimension {}, index uses {}",
                embedder.name(),
                embedder.dimension(),
                self.manifest.dimension
            )));
        }
        let query = embedder.embed(text).await?;
        Ok(self.search(&query, k))
    }
}

impl VectorIndex for FlatIndex {
    fn search(&self, query: &[f32], k: usize) -> Vec<SearchHit> {
        if k == 0 {
            return Vec::new();
        }

        let mut hits: Vec<SearchHit> = self
            .chunks
            .iter()
            .map(|c| SearchHit {
                id: c.id.clone(),
                text: c.text.clone(),
                source: c.source.clone(),
                page: c.page,
                score: cosine_similarity(query, &c.embedding),
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        hits.truncate(k);
        hits
    }

    fn save(&self, dir: &Path) -> Result<(), IngestError> {
        fs::create_dir_all(dir).map_err(|source| IngestError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        // Manifest last: a readable manifest implies a complete index
        atomic_write(&dir.join(INDEX_FILE), &serde_json::to_vec(&self.chunks)?)?;
        atomic_write(
            &dir.join(MANIFEST_FILE),
            &serde_json::to_vec_pretty(&self.manifest)?,
        )?;
        Ok(())
    }

    fn len(&self) -> usize {
        self.chunks.len()
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, IngestError> {
    let bytes = fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// 0.0 for mismatched lengths or zero vectors
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
