// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for faqchat.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level faqchat configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FaqchatConfig {
    /// Agent identity and chat loop settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Ollama runtime and model settings.
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// FAQ seeding and matching settings.
    #[serde(default)]
    pub faq: FaqConfig,

    /// Image description settings.
    #[serde(default)]
    pub image: ImageConfig,
}

/// Agent identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the agent.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Inline system prompt string. Overridden by `system_prompt_file` if both set.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Path to a markdown file containing the system prompt.
    /// Takes precedence over `system_prompt` if both are set.
    #[serde(default)]
    pub system_prompt_file: Option<String>,

    /// Maximum number of tool-call round trips per user message.
    #[serde(default = "default_max_tool_iterations")]
    pub max_tool_iterations: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            system_prompt: None,
            system_prompt_file: None,
            max_tool_iterations: default_max_tool_iterations(),
        }
    }
}

fn default_agent_name() -> String {
    "faqchat".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_tool_iterations() -> usize {
    5
}

/// Ollama runtime configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model used for the conversation and tool selection.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Model used to embed FAQ questions, answers, and user queries.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Vision-capable model used to describe images.
    #[serde(default = "default_vision_model")]
    pub vision_model: String,

    /// Request timeout for chat, embedding, and show calls.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Pull the configured models before starting.
    #[serde(default = "default_pull_on_start")]
    pub pull_on_start: bool,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            chat_model: default_chat_model(),
            embedding_model: default_embedding_model(),
            vision_model: default_vision_model(),
            timeout_secs: default_timeout_secs(),
            pull_on_start: default_pull_on_start(),
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_chat_model() -> String {
    "llama3.2".to_string()
}

fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_vision_model() -> String {
    "llava".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_pull_on_start() -> bool {
    true
}

/// FAQ collection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FaqConfig {
    /// Path to the JSON seed file (`[{ "question": ..., "response": ... }]`).
    #[serde(default = "default_seed_path")]
    pub seed_path: String,

    /// Name of the vector collection holding the FAQ records.
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Fixed embedding length for the collection. 0 adopts the length of
    /// the first stored record.
    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: usize,

    /// Minimum score (exclusive) for a question-vector match.
    #[serde(default = "default_question_threshold")]
    pub question_threshold: f32,

    /// Minimum score (exclusive) for a response-vector match.
    #[serde(default = "default_response_threshold")]
    pub response_threshold: f32,

    /// Number of nearest neighbours fetched from the question vectors.
    #[serde(default = "default_question_top")]
    pub question_top: usize,

    /// Number of nearest neighbours fetched from the response vectors.
    #[serde(default = "default_response_top")]
    pub response_top: usize,

    /// Number of seed entries embedded concurrently.
    #[serde(default = "default_seed_concurrency")]
    pub seed_concurrency: usize,

    /// Re-upsert every seed record even when the collection already exists.
    #[serde(default)]
    pub reseed_on_start: bool,
}

impl Default for FaqConfig {
    fn default() -> Self {
        Self {
            seed_path: default_seed_path(),
            collection: default_collection(),
            embedding_dim: default_embedding_dim(),
            question_threshold: default_question_threshold(),
            response_threshold: default_response_threshold(),
            question_top: default_question_top(),
            response_top: default_response_top(),
            seed_concurrency: default_seed_concurrency(),
            reseed_on_start: false,
        }
    }
}

fn default_seed_path() -> String {
    "faq.json".to_string()
}

fn default_collection() -> String {
    "faq".to_string()
}

fn default_embedding_dim() -> usize {
    0
}

fn default_question_threshold() -> f32 {
    0.3
}

fn default_response_threshold() -> f32 {
    0.5
}

fn default_question_top() -> usize {
    3
}

fn default_response_top() -> usize {
    5
}

fn default_seed_concurrency() -> usize {
    8
}

/// Image description configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ImageConfig {
    /// Timeout for downloading remote images.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Largest image accepted, in bytes.
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,

    /// Allow `file://` URLs and bare paths.
    #[serde(default = "default_allow_local_files")]
    pub allow_local_files: bool,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: default_fetch_timeout_secs(),
            max_image_bytes: default_max_image_bytes(),
            allow_local_files: default_allow_local_files(),
        }
    }
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_max_image_bytes() -> usize {
    20 * 1024 * 1024
}

fn default_allow_local_files() -> bool {
    true
}
