//! Text embedders.
//!
//! [`HashEmbedder`] is local and deterministic (SimHash over SHA-256 word
//! hashes), so an index built today can be queried by a later build.
//! [`ApiEmbedder`] calls an OpenAI-compatible `/embeddings` endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

pub const DEFAULT_HASH_DIMENSION: usize = 384;

/// Bits in one SHA-256 digest
const DIGEST_BITS: usize = 256;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("embedding request failed: {0}")]
    Request(String),

    #[error("unexpected embedding response: {0}")]
    Response(String),
}

/// Capability: map text to fixed-length vectors
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Sequential by default
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    fn dimension(&self) -> usize;

    /// Recorded in the index manifest
    fn name(&self) -> &str {
        "unknown"
    }
}

// ============================================================================
// HASH EMBEDDER
// ============================================================================

#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
    name: String,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            name: format!("hash-simhash-v2-{}", dimension),
        }
    }

    fn compute(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for word in text.split_whitespace() {
            let word = word.to_lowercase();
            // One digest per 256 dimensions, salted with the block index
            for (block, chunk) in vector.chunks_mut(DIGEST_BITS).enumerate() {
                let digest = Sha256::new()
                    .chain_update(word.as_bytes())
                    .chain_update((block as u64).to_le_bytes())
                    .finalize();
                for (i, val) in chunk.iter_mut().enumerate() {
                    let bit = (digest[i / 8] >> (i % 8)) & 1;
                    *val += if bit == 1 { 1.0 } else { -1.0 };
                }
            }
        }

        // Empty text stays a zero vector
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for val in &mut vector {
                *val /= norm;
            }
        }
        vector
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_DIMENSION)
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(self.compute(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| self.compute(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// API EMBEDDER
// ============================================================================

#[derive(Debug, Clone)]
pub struct ApiEmbedderConfig {
    /// e.g. `https://api.openai.com/v1`
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub dimension: usize,
}

impl Default for ApiEmbedderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".into(),
            api_key: None,
            model: "text-embedding-3-small".into(),
            dimension: 1536,
        }
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

pub struct ApiEmbedder {
    config: ApiEmbedderConfig,
    http: reqwest::Client,
}

impl ApiEmbedder {
    pub fn new(config: ApiEmbedderConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/embeddings", self.config.base_url.trim_end_matches('/'))
    }

    async fn request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = serde_json::json!({
            "input": texts,
            "model": self.config.model,
        });

        let mut req = self.http.post(self.endpoint()).json(&body);
        if let Some(key) = &self.config.api_key {
            req = req.bearer_auth(key);
        }

        let response = req
            .send()
            .await
            .map_err(|e| EmbeddingError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Request(format!("HTTP {}: {}", status, detail)));
        }

        let mut parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::Response(e.to_string()))?;

        if parsed.data.len() != texts.len() {
            return Err(EmbeddingError::Response(format!(
                "asked for {} embeddings, got {}",
                texts.len(),
                parsed.data.len()
            )));
        }
        parsed.data.sort_by_key(|item| item.index);

        let vectors: Vec<Vec<f32>> = parsed.data.into_iter().map(|item| item.embedding).collect();
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.config.dimension) {
            return Err(EmbeddingError::Response(format!(
                "expected dimension {}, got {}",
                self.config.dimension,
                bad.len()
            )));
        }
        Ok(vectors)
    }
}

#[async_trait]
impl Embedder for ApiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.request(&[text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| EmbeddingError::Response("empty data array".into()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.request(texts).await
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_embedding_is_deterministic() {
        let embedder = HashEmbedder::default();
        let a = embedder.embed("recycle the cardboard").await.unwrap();
        let b = embedder.embed("Recycle the CARDBOARD").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), DEFAULT_HASH_DIMENSION);
    }

    #[tokio::test]
    async fn test_hash_dimensions_past_one_digest_are_independent() {
        let embedder = HashEmbedder::default();
        let v = embedder.embed("battery").await.unwrap();

        // A single word gives +/-1 per dimension before normalizing
        let signs: Vec<bool> = v.iter().map(|x| *x > 0.0).collect();
        assert_ne!(signs[256..384], signs[0..128]);
        assert_ne!(signs[256..384], signs[128..256]);
    }

    #[tokio::test]
    async fn test_hash_embedding_is_unit_length() {
        let embedder = HashEmbedder::new(64);
        let v = embedder.embed("glass bottles and tin cans").await.unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_empty_text_gives_zero_vector() {
        let embedder = HashEmbedder::new(16);
        let v = embedder.embed("   ").await.unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[tokio::test]
    async fn test_batch_matches_single() {
        let embedder = HashEmbedder::new(32);
        let texts = vec!["paper".to_string(), "plastic bag".to_string()];
        let batch = embedder.embed_batch(&texts).await.unwrap();
        assert_eq!(batch[1], embedder.embed("plastic bag").await.unwrap());
    }

    #[test]
    fn test_api_endpoint_joins_base_url() {
        let embedder = ApiEmbedder::new(ApiEmbedderConfig {
            base_url: "http://localhost:8080/v1/".into(),
            ..ApiEmbedderConfig::default()
        });
        assert_eq!(embedder.endpoint(), "http://localhost:8080/v1/embeddings");
        assert_eq!(embedder.name(), "text-embedding-3-small");
    }

    #[test]
    fn test_response_parsing_accepts_openai_shape() {
        let raw = r#"{"object":"list","data":[{"object":"embedding","index":0,"embedding":[0.1,0.2]}]}"#;
        let parsed: EmbeddingResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.data[0].embedding, vec![0.1, 0.2]);
    }
}
