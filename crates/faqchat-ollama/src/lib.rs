// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ollama adapters for faqchat.
//!
//! [`OllamaProvider`] implements [`ProviderAdapter`] over `/api/chat` and is
//! used for both the conversation model and the vision model.
//! [`OllamaEmbedder`] implements [`EmbeddingAdapter`] over `/api/embed`.
//! [`ModelSummary`] condenses `/api/show` output for the startup banner.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use faqchat_config::model::OllamaConfig;
use faqchat_core::traits::{EmbeddingAdapter, PluginAdapter, ProviderAdapter};
use faqchat_core::types::{
    AdapterType, ChatMessage, EmbeddingInput, EmbeddingOutput, HealthStatus, ImageData,
    ProviderRequest, ProviderResponse, Role, TokenUsage, ToolCall, ToolDefinition,
};
use faqchat_core::FaqchatError;
use tracing::debug;

pub use client::{OllamaClient, PullStream};
use types::{
    ApiFunction, ApiFunctionCall, ApiMessage, ApiTool, ApiToolCall, ChatRequest, EmbedRequest,
    ShowResponse,
};

/// Builds a client from the `[ollama]` config section.
pub fn client_from_config(config: &OllamaConfig) -> Result<OllamaClient, FaqchatError> {
    OllamaClient::new(&config.endpoint, Duration::from_secs(config.timeout_secs))
}

/// Chat model adapter backed by `/api/chat`.
pub struct OllamaProvider {
    client: OllamaClient,
}

impl OllamaProvider {
    pub fn new(client: OllamaClient) -> Self {
        Self { client }
    }

    fn to_chat_request(request: &ProviderRequest) -> ChatRequest {
        ChatRequest {
            model: request.model.clone(),
            messages: request.messages.iter().map(to_api_message).collect(),
            stream: false,
            tools: request.tools.iter().map(to_api_tool).collect(),
        }
    }
}

fn to_api_message(msg: &ChatMessage) -> ApiMessage {
    ApiMessage {
        role: msg.role.to_string(),
        content: msg.content.clone(),
        images: msg.images.iter().map(|img| STANDARD.encode(&img.bytes)).collect(),
        tool_calls: msg
            .tool_calls
            .iter()
            .map(|call| ApiToolCall {
                function: ApiFunctionCall {
                    name: call.name.clone(),
                    arguments: call.arguments.clone(),
                },
            })
            .collect(),
        tool_name: msg.tool_name.clone(),
    }
}

fn to_api_tool(def: &ToolDefinition) -> ApiTool {
    ApiTool {
        type_: "function".to_string(),
        function: ApiFunction {
            name: def.name.clone(),
            description: def.description.clone(),
            parameters: def.parameters.clone(),
        },
    }
}

fn from_api_message(msg: ApiMessage) -> ChatMessage {
    let role = msg.role.parse().unwrap_or(Role::Assistant);
    ChatMessage {
        role,
        content: msg.content,
        images: msg
            .images
            .iter()
            .filter_map(|b64| STANDARD.decode(b64).ok())
            .map(|bytes| ImageData {
                bytes,
                media_type: "image/*".to_string(),
            })
            .collect(),
        tool_calls: msg
            .tool_calls
            .into_iter()
            .map(|call| ToolCall {
                name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect(),
        tool_name: msg.tool_name,
    }
}

#[async_trait]
impl PluginAdapter for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, FaqchatError> {
        match self.client.version().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }
}

#[async_trait]
impl ProviderAdapter for OllamaProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, FaqchatError> {
        let api_request = Self::to_chat_request(&request);
        debug!(
            model = %api_request.model,
            messages = api_request.messages.len(),
            tools = api_request.tools.len(),
            "sending chat request"
        );
        let response = self.client.chat(&api_request).await?;

        Ok(ProviderResponse {
            model: response.model,
            message: from_api_message(response.message),
            usage: TokenUsage {
                input_tokens: response.prompt_eval_count,
                output_tokens: response.eval_count,
            },
        })
    }
}

/// Embedding adapter backed by `/api/embed`.
pub struct OllamaEmbedder {
    client: OllamaClient,
    model: String,
}

impl OllamaEmbedder {
    pub fn new(client: OllamaClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl PluginAdapter for OllamaEmbedder {
    fn name(&self) -> &str {
        "ollama-embed"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, FaqchatError> {
        match self.client.version().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }
}

#[async_trait]
impl EmbeddingAdapter for OllamaEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, FaqchatError> {
        if input.texts.is_empty() {
            return Ok(EmbeddingOutput {
                embeddings: Vec::new(),
                dimensions: 0,
            });
        }

        let expected = input.texts.len();
        let response = self
            .client
            .embed(&EmbedRequest {
                model: self.model.clone(),
                input: input.texts,
            })
            .await?;

        if response.embeddings.len() != expected {
            return Err(FaqchatError::Embedding {
                message: format!(
                    "expected {expected} embeddings, got {}",
                    response.embeddings.len()
                ),
                source: None,
            });
        }

        let dimensions = response.embeddings.first().map(Vec::len).unwrap_or(0);
        if response.embeddings.iter().any(|e| e.len() != dimensions) {
            return Err(FaqchatError::Embedding {
                message: "embeddings in one response have differing lengths".to_string(),
                source: None,
            });
        }

        Ok(EmbeddingOutput {
            embeddings: response.embeddings,
            dimensions,
        })
    }
}

/// The handful of model facts shown at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelSummary {
    pub name: String,
    pub architecture: Option<String>,
    pub parameter_count: Option<u64>,
    pub quantization: Option<String>,
    pub languages: Option<String>,
    pub context_length: Option<u64>,
    pub embedding_length: Option<u64>,
}

impl ModelSummary {
    /// Extracts a summary from a `/api/show` response.
    ///
    /// Optional facts are matched by key suffix, so `llama.context_length`
    /// and `bert.context_length` both fill `context_length`.
    pub fn from_show(name: &str, show: &ShowResponse) -> Self {
        let info = &show.model_info;
        let by_suffix = |suffix: &str| {
            info.iter()
                .find(|(key, _)| key.ends_with(suffix))
                .map(|(_, value)| value)
        };

        Self {
            name: name.to_string(),
            architecture: info
                .get("general.architecture")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            parameter_count: info.get("general.parameter_count").and_then(|v| v.as_u64()),
            quantization: Some(show.details.quantization_level.clone()).filter(|q| !q.is_empty()),
            languages: by_suffix(".languages").map(render_value),
            context_length: by_suffix(".context_length").and_then(|v| v.as_u64()),
            embedding_length: by_suffix(".embedding_length").and_then(|v| v.as_u64()),
        }
    }
}

fn render_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(render_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// Fetches and summarizes `/api/show` for `model`.
pub async fn describe_model(
    client: &OllamaClient,
    model: &str,
) -> Result<ModelSummary, FaqchatError> {
    let show = client.show(model).await?;
    Ok(ModelSummary::from_show(model, &show))
}
