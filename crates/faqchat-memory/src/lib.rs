// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! FAQ memory for faqchat.
//!
//! ## Architecture
//!
//! - **InMemoryVectorStore**: named collections of FAQ records searched by exhaustive cosine scan
//! - **load_seed_file**: reads the static `[{question, response}]` seed list
//! - **FaqMatcher**: one-time seeding plus the two-pass question/response lookup

pub mod matcher;
pub mod seed;
pub mod store;
pub mod types;

pub use matcher::{FaqMatcher, SeedReport, SeedState};
pub use seed::{load_seed_file, SeedEntry};
pub use store::InMemoryVectorStore;
pub use types::cosine_similarity;
