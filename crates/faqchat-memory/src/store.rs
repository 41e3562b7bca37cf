// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory vector store.
//!
//! Collections live in a `RwLock<HashMap>`; searches take the read lock and
//! score every record with cosine similarity. Records are kept in id order so
//! equal scores rank deterministically.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use faqchat_core::traits::{PluginAdapter, VectorStoreAdapter};
use faqchat_core::types::{AdapterType, FaqRecord, HealthStatus, ScoredRecord, VectorField};
use faqchat_core::{FaqchatError, StoreError};
use tokio::sync::RwLock;
use tracing::debug;

use crate::types::cosine_similarity;

#[derive(Debug, Default)]
struct Collection {
    /// Fixed vector length, set on creation or by the first upsert.
    dimension: Option<usize>,
    records: BTreeMap<u64, FaqRecord>,
}

impl Collection {
    fn check(&mut self, len: usize) -> Result<(), StoreError> {
        match self.dimension {
            Some(expected) if expected != len => Err(StoreError::DimensionMismatch {
                expected,
                actual: len,
            }),
            Some(_) => Ok(()),
            None => {
                self.dimension = Some(len);
                Ok(())
            }
        }
    }
}

/// Vector store holding every collection in process memory.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    /// Dimension given to new collections. 0 lets the first record decide.
    dimension: usize,
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryVectorStore {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Returns a snapshot of the records in `collection`, ordered by id.
    pub async fn records(&self, collection: &str) -> Result<Vec<FaqRecord>, FaqchatError> {
        let collections = self.collections.read().await;
        let coll = collections
            .get(collection)
            .ok_or_else(|| StoreError::MissingCollection(collection.to_string()))?;
        Ok(coll.records.values().cloned().collect())
    }

    /// Returns the fixed vector length of `collection`, if known yet.
    pub async fn dimension(&self, collection: &str) -> Option<usize> {
        self.collections
            .read()
            .await
            .get(collection)
            .and_then(|c| c.dimension)
    }
}

#[async_trait]
impl PluginAdapter for InMemoryVectorStore {
    fn name(&self) -> &str {
        "in-memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::VectorStore
    }

    async fn health_check(&self) -> Result<HealthStatus, FaqchatError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl VectorStoreAdapter for InMemoryVectorStore {
    async fn collection_exists(&self, collection: &str) -> Result<bool, FaqchatError> {
        Ok(self.collections.read().await.contains_key(collection))
    }

    async fn create_collection(&self, collection: &str) -> Result<(), FaqchatError> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_insert_with(|| Collection {
                dimension: (self.dimension > 0).then_some(self.dimension),
                records: BTreeMap::new(),
            });
        debug!(collection, dimension = self.dimension, "collection created");
        Ok(())
    }

    async fn upsert(&self, collection: &str, record: FaqRecord) -> Result<(), FaqchatError> {
        let mut collections = self.collections.write().await;
        let coll = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::MissingCollection(collection.to_string()))?;

        let len = record.question_embedding.len();
        if record.response_embedding.len() != len {
            return Err(StoreError::DimensionMismatch {
                expected: len,
                actual: record.response_embedding.len(),
            }
            .into());
        }
        coll.check(len)?;
        coll.records.insert(record.id, record);
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        field: VectorField,
        vector: &[f32],
        top: usize,
        skip: usize,
    ) -> Result<Vec<ScoredRecord>, FaqchatError> {
        let collections = self.collections.read().await;
        let coll = collections
            .get(collection)
            .ok_or_else(|| StoreError::MissingCollection(collection.to_string()))?;

        if let Some(expected) = coll.dimension
            && expected != vector.len()
        {
            return Err(StoreError::DimensionMismatch {
                expected,
                actual: vector.len(),
            }
            .into());
        }

        let mut scored: Vec<ScoredRecord> = coll
            .records
            .values()
            .map(|record| ScoredRecord {
                score: cosine_similarity(vector, record.vector(field)),
                record: record.clone(),
            })
            .collect();

        // Stable sort keeps id order among equal scores.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored.into_iter().skip(skip).take(top).collect())
    }

    async fn count(&self, collection: &str) -> Result<usize, FaqchatError> {
        let collections = self.collections.read().await;
        let coll = collections
            .get(collection)
            .ok_or_else(|| StoreError::MissingCollection(collection.to_string()))?;
        Ok(coll.records.len())
    }
}
