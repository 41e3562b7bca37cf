// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for faqchat integration tests.
//!
//! Provides mock adapters for fast, deterministic tests without a running
//! Ollama server.
//!
//! # Components
//!
//! - [`MockProvider`] - Chat model with pre-configured responses and request capture
//! - [`MockEmbedder`] - Embedding model with scripted vectors and call counting

pub mod mock_embedder;
pub mod mock_provider;

pub use mock_embedder::MockEmbedder;
pub use mock_provider::MockProvider;
