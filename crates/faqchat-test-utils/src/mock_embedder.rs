// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock embedding adapter with scripted vectors.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use faqchat_core::traits::adapter::PluginAdapter;
use faqchat_core::traits::embedding::EmbeddingAdapter;
use faqchat_core::types::{AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus};
use faqchat_core::FaqchatError;

/// A mock embedding model.
///
/// Texts registered with [`MockEmbedder::with_vector`] embed to their scripted
/// vector. Any other text embeds to a one-hot vector chosen by hashing the
/// text, so unrelated texts are orthogonal to each other most of the time.
#[derive(Clone)]
pub struct MockEmbedder {
    dimensions: usize,
    vectors: HashMap<String, Vec<f32>>,
    failing: Vec<String>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
    texts: Arc<AtomicUsize>,
}

impl MockEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            vectors: HashMap::new(),
            failing: Vec::new(),
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
            texts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Scripts the vector returned for `text`.
    pub fn with_vector(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.into(), vector);
        self
    }

    /// Makes any call that includes `text` fail with an embedding error.
    pub fn failing_on(mut self, text: impl Into<String>) -> Self {
        self.failing.push(text.into());
        self
    }

    /// Sleeps before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `embed` calls made.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of texts embedded across all calls.
    pub fn texts_embedded(&self) -> usize {
        self.texts.load(Ordering::SeqCst)
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        if let Some(v) = self.vectors.get(text) {
            return v.clone();
        }
        let hash = text
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325_u64, |h, b| {
                (h ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
            });
        let mut v = vec![0.0; self.dimensions];
        if self.dimensions > 0 {
            v[(hash % self.dimensions as u64) as usize] = 1.0;
        }
        v
    }
}

#[async_trait]
impl PluginAdapter for MockEmbedder {
    fn name(&self) -> &str {
        "mock-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, FaqchatError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl EmbeddingAdapter for MockEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, FaqchatError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(bad) = input.texts.iter().find(|t| self.failing.contains(t)) {
            return Err(FaqchatError::Embedding {
                message: format!("mock failure embedding `{bad}`"),
                source: None,
            });
        }
        self.texts.fetch_add(input.texts.len(), Ordering::SeqCst);

        let embeddings: Vec<Vec<f32>> = input.texts.iter().map(|t| self.vector_for(t)).collect();
        let dimensions = embeddings.first().map(Vec::len).unwrap_or(self.dimensions);
        Ok(EmbeddingOutput {
            embeddings,
            dimensions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_and_fallback_vectors() {
        let embedder = MockEmbedder::new(4).with_vector("hello", vec![1.0, 0.0, 0.0, 0.0]);
        let out = embedder
            .embed(EmbeddingInput {
                texts: vec!["hello".into(), "other".into()],
            })
            .await
            .unwrap();

        assert_eq!(out.embeddings[0], vec![1.0, 0.0, 0.0, 0.0]);
        assert_eq!(out.embeddings[1].len(), 4);
        assert_eq!(out.embeddings[1].iter().sum::<f32>(), 1.0);
        assert_eq!(embedder.calls(), 1);
        assert_eq!(embedder.texts_embedded(), 2);
    }

    #[tokio::test]
    async fn failing_text_errors() {
        let embedder = MockEmbedder::new(2).failing_on("boom");
        let err = embedder
            .embed(EmbeddingInput {
                texts: vec!["ok".into(), "boom".into()],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, FaqchatError::Embedding { .. }));
        assert_eq!(embedder.texts_embedded(), 0);
    }
}
