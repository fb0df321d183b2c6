//! Embedding trait and vector utilities.
//!
//! Defines the [`Embedder`] trait that every embedding backend
//! implements, the offline [`HashingEmbedder`], and pure helpers for
//! vector serialization and distance computation.
//!
//! Network and model-backed embedders (OpenAI, Ollama, fastembed) live in
//! the `finrag` app crate.

use anyhow::Result;
use async_trait::async_trait;
use sha2::{Digest, Sha256};

/// An embedding backend.
///
/// Implementations return one vector per input text, in input order,
/// each of length [`dims`](Embedder::dims).
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Returns the model identifier (e.g. `"all-minilm-l6-v2"`).
    fn model_name(&self) -> &str;
    /// Returns the embedding vector dimensionality (e.g. `384`).
    fn dims(&self) -> usize;
    /// Embed a batch of texts.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Deterministic bag-of-words embedder using feature hashing.
///
/// Each lowercase alphanumeric token is hashed into one of `dims` buckets
/// with a sign bit; the result is L2-normalized. No model, no network.
/// Texts sharing vocabulary land close together, which is enough for
/// tests and small offline corpora.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dims: usize,
}

impl HashingEmbedder {
    pub const MODEL_NAME: &'static str = "hashing-bow";

    pub fn new(dims: usize) -> Self {
        Self { dims: dims.max(1) }
    }

    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dims];
        let lower = text.to_lowercase();
        for token in lower.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            let digest = Sha256::digest(token.as_bytes());
            let bucket = u64::from_le_bytes([
                digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6],
                digest[7],
            ]) as usize
                % self.dims;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            v[bucket] += sign;
        }
        normalize(&mut v);
        v
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    fn model_name(&self) -> &str {
        Self::MODEL_NAME
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

/// Scale a vector to unit length in place. Zero vectors are left as is.
pub fn normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Encode a float vector as a BLOB (little-endian f32 bytes).
///
/// ```rust
/// use finrag_core::embedding::{vec_to_blob, blob_to_vec};
///
/// let v = vec![1.0f32, -2.5, 3.125];
/// let blob = vec_to_blob(&v);
/// assert_eq!(blob.len(), 12);
/// assert_eq!(blob_to_vec(&blob), v);
/// ```
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vec.len() * 4);
    for &v in vec {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Decode a BLOB back into a float vector.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Squared Euclidean distance, the store's ranking metric.
///
/// Vectors of different lengths are maximally distant.
pub fn squared_l2_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Map a non-negative distance into a `[0, 1]` similarity.
///
/// NaN and infinite distances score `0.0`.
pub fn distance_to_similarity(distance: f64) -> f64 {
    if !distance.is_finite() {
        return 0.0;
    }
    1.0 / (1.0 + distance.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_blob_roundtrip() {
        let vec = vec![1.0f32, -2.5, 3.125, 0.0, -0.001];
        assert_eq!(blob_to_vec(&vec_to_blob(&vec)), vec);
    }

    #[test]
    fn test_squared_l2() {
        assert_eq!(squared_l2_distance(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
        assert_eq!(squared_l2_distance(&[1.0], &[1.0, 2.0]), f32::INFINITY);
    }

    #[test]
    fn test_distance_to_similarity() {
        assert_eq!(distance_to_similarity(0.0), 1.0);
        assert!((distance_to_similarity(1.0) - 0.5).abs() < 1e-12);
        assert_eq!(distance_to_similarity(f64::INFINITY), 0.0);
        assert_eq!(distance_to_similarity(-4.0), 1.0);
    }

    #[test]
    fn test_nan_distance_is_not_a_match() {
        assert_eq!(distance_to_similarity(f64::NAN), 0.0);
        let nan = squared_l2_distance(&[f32::NAN], &[0.0]) as f64;
        assert_eq!(distance_to_similarity(nan), 0.0);
    }

    #[test]
    fn test_hashing_embedder_is_deterministic_and_unit_length() {
        let e = HashingEmbedder::new(64);
        let a = e.embed_one("Lucro líquido de R$ 10 milhões");
        let b = e.embed_one("Lucro líquido de R$ 10 milhões");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_hashing_embedder_prefers_shared_vocabulary() {
        let e = HashingEmbedder::default();
        let q = e.embed_one("receita do banco");
        let near = e.embed_one("A receita do banco cresceu no trimestre");
        let far = e.embed_one("Chuvas fortes atingem o litoral");
        assert!(squared_l2_distance(&q, &near) < squared_l2_distance(&q, &far));
    }

    #[test]
    fn test_hashing_embedder_empty_text() {
        let e = HashingEmbedder::new(8);
        assert!(e.embed_one("  ").iter().all(|x| *x == 0.0));
    }
}
