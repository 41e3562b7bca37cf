// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for faqchat.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the workspace. The Ollama client, the
//! in-memory vector store, and the test mocks all implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{FaqchatError, StoreError};
pub use types::{AdapterType, HealthStatus};

pub use traits::{EmbeddingAdapter, PluginAdapter, ProviderAdapter, VectorStoreAdapter};
