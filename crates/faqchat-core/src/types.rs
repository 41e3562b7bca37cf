// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the faqchat crates.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Embedding,
    VectorStore,
}

// --- Chat types ---

/// Author of a chat message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    /// Result of a tool call, only present in a turn's working messages.
    Tool,
}

/// Raw image bytes attached to a chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub bytes: Vec<u8>,
    /// MIME type such as `image/png`. `image/*` when unknown.
    pub media_type: String,
}

/// A tool call requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    pub arguments: serde_json::Value,
}

/// A single message sent to or received from a chat model.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub images: Vec<ImageData>,
    pub tool_calls: Vec<ToolCall>,
    /// For `Role::Tool` messages, the tool that produced the content.
    pub tool_name: Option<String>,
}

impl ChatMessage {
    fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            images: Vec::new(),
            tool_calls: Vec::new(),
            tool_name: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::text(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::text(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text(Role::Assistant, content)
    }

    /// A tool result message answering a call to `tool_name`.
    pub fn tool(tool_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_name: Some(tool_name.into()),
            ..Self::text(Role::Tool, content)
        }
    }

    /// Attaches an image to this message.
    pub fn with_image(mut self, image: ImageData) -> Self {
        self.images.push(image);
        self
    }
}

/// A tool definition advertised to the chat model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema describing the tool's arguments.
    pub parameters: serde_json::Value,
}

/// A request to a chat model.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolDefinition>,
}

/// Token accounting reported by the model runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A complete (non-streamed) chat model response.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub model: String,
    pub message: ChatMessage,
    pub usage: TokenUsage,
}

// --- Embedding types ---

/// Input for an embedding adapter.
#[derive(Debug, Clone)]
pub struct EmbeddingInput {
    pub texts: Vec<String>,
}

/// Output from an embedding adapter, one vector per input text.
#[derive(Debug, Clone)]
pub struct EmbeddingOutput {
    pub embeddings: Vec<Vec<f32>>,
    pub dimensions: usize,
}

// --- FAQ types ---

/// A seeded FAQ entry with one embedding for its question and one for its response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqRecord {
    pub id: u64,
    pub question: String,
    pub response: String,
    #[serde(skip)]
    pub question_embedding: Vec<f32>,
    #[serde(skip)]
    pub response_embedding: Vec<f32>,
}

impl FaqRecord {
    /// Returns the embedding stored in the given field.
    pub fn vector(&self, field: VectorField) -> &[f32] {
        match field {
            VectorField::Question => &self.question_embedding,
            VectorField::Response => &self.response_embedding,
        }
    }
}

/// Read-only projection of a [`FaqRecord`] handed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqResult {
    pub question: String,
    pub response: String,
}

impl From<&FaqRecord> for FaqResult {
    fn from(record: &FaqRecord) -> Self {
        Self {
            question: record.question.clone(),
            response: record.response.clone(),
        }
    }
}

/// Named vector fields of a [`FaqRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum VectorField {
    Question,
    Response,
}

/// A record returned by a nearest-neighbour search with its similarity score.
#[derive(Debug, Clone)]
pub struct ScoredRecord {
    pub record: FaqRecord,
    /// Cosine similarity, higher is more similar.
    pub score: f32,
}
