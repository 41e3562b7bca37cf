// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks the constraints serde cannot express: score thresholds in range,
//! positive neighbour counts, and non-empty model names.

use crate::diagnostic::ConfigError;
use crate::model::FaqchatConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &FaqchatConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let endpoint = config.ollama.endpoint.trim();
    if endpoint.is_empty() {
        fail("ollama.endpoint must not be empty".to_string());
    } else if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
        fail(format!(
            "ollama.endpoint `{endpoint}` must start with http:// or https://"
        ));
    }

    for (key, value) in [
        ("ollama.chat_model", &config.ollama.chat_model),
        ("ollama.embedding_model", &config.ollama.embedding_model),
        ("ollama.vision_model", &config.ollama.vision_model),
        ("faq.seed_path", &config.faq.seed_path),
        ("faq.collection", &config.faq.collection),
    ] {
        if value.trim().is_empty() {
            fail(format!("{key} must not be empty"));
        }
    }

    for (key, value) in [
        ("faq.question_threshold", config.faq.question_threshold),
        ("faq.response_threshold", config.faq.response_threshold),
    ] {
        if !(0.0..=1.0).contains(&value) {
            fail(format!("{key} must be between 0.0 and 1.0, got {value}"));
        }
    }

    for (key, value) in [
        ("faq.question_top", config.faq.question_top),
        ("faq.response_top", config.faq.response_top),
        ("faq.seed_concurrency", config.faq.seed_concurrency),
        ("agent.max_tool_iterations", config.agent.max_tool_iterations),
        ("image.max_image_bytes", config.image.max_image_bytes),
    ] {
        if value < 1 {
            fail(format!("{key} must be at least 1, got {value}"));
        }
    }

    if config.ollama.timeout_secs == 0 {
        fail("ollama.timeout_secs must be greater than 0".to_string());
    }
    if config.image.fetch_timeout_secs == 0 {
        fail("image.fetch_timeout_secs must be greater than 0".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
