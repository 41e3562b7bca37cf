// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for faqchat.

use thiserror::Error;

/// The primary error type used across all faqchat adapter traits and core operations.
#[derive(Debug, Error)]
pub enum FaqchatError {
    /// Vector store errors (missing collection, dimension mismatch).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Chat model errors (API failure, model not found, malformed response).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Embedding model errors.
    #[error("embedding error: {message}")]
    Embedding {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Tool invocation errors (invalid arguments, handler failure).
    #[error("skill error: {message}")]
    Skill {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A component was used before its setup completed.
    #[error("{component} is not initialized")]
    NotInitialized { component: String },

    /// Fetching a remote or local resource failed.
    #[error("failed to fetch {url}: {message}")]
    Fetch {
        url: String,
        message: String,
        status: Option<u16>,
    },

    /// The static seed file is missing or malformed.
    #[error("invalid seed data in {path}: {message}")]
    SeedData { path: String, message: String },

    /// A request bounded by a configured timeout did not finish in time.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Error raised by the in-memory vector store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The named collection has not been created.
    #[error("collection `{0}` does not exist")]
    MissingCollection(String),

    /// A vector does not match the collection's fixed dimension.
    #[error("vector length {actual} does not match collection dimension {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl From<StoreError> for FaqchatError {
    fn from(e: StoreError) -> Self {
        FaqchatError::Storage {
            source: Box::new(e),
        }
    }
}
