// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Files are merged in XDG order, later ones winning: `/etc/faqchat/faqchat.toml`,
//! `~/.config/faqchat/faqchat.toml`, then `./faqchat.toml`. `FAQCHAT_*`
//! environment variables override all of them.

#![allow(clippy::result_large_err)] // figment::Error is large and not ours to box

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::FaqchatConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/faqchat/faqchat.toml` (system-wide)
/// 3. `~/.config/faqchat/faqchat.toml` (user XDG config)
/// 4. `./faqchat.toml` (local directory)
/// 5. `FAQCHAT_*` environment variables
pub fn load_config() -> Result<FaqchatConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<FaqchatConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FaqchatConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<FaqchatConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FaqchatConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(FaqchatConfig::default()))
        .merge(Toml::file("/etc/faqchat/faqchat.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("faqchat/faqchat.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("faqchat.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `FAQCHAT_OLLAMA_CHAT_MODEL` must map to `ollama.chat_model`,
/// not `ollama.chat.model`.
fn env_provider() -> Env {
    Env::prefixed("FAQCHAT_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("ollama_", "ollama.", 1)
            .replacen("faq_", "faq.", 1)
            .replacen("image_", "image.", 1);
        mapped.into()
    })
}
