// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vector store adapter trait for FAQ collections.

use async_trait::async_trait;

use crate::error::FaqchatError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{FaqRecord, ScoredRecord, VectorField};

/// Adapter for keyed record collections searchable by vector similarity.
#[async_trait]
pub trait VectorStoreAdapter: PluginAdapter {
    /// Returns true if the named collection has been created.
    async fn collection_exists(&self, collection: &str) -> Result<bool, FaqchatError>;

    /// Creates the named collection. Creating an existing collection is a no-op.
    async fn create_collection(&self, collection: &str) -> Result<(), FaqchatError>;

    /// Inserts the record, replacing any record with the same id.
    async fn upsert(&self, collection: &str, record: FaqRecord) -> Result<(), FaqchatError>;

    /// Returns the `top` records nearest to `vector` in `field`, after skipping
    /// the first `skip`, ordered by descending similarity.
    async fn search(
        &self,
        collection: &str,
        field: VectorField,
        vector: &[f32],
        top: usize,
        skip: usize,
    ) -> Result<Vec<ScoredRecord>, FaqchatError>;

    /// Returns the number of records in the named collection.
    async fn count(&self, collection: &str) -> Result<usize, FaqchatError>;
}
