// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock chat model adapter for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` with pre-configured replies
//! and records every request it receives.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use faqchat_core::traits::adapter::PluginAdapter;
use faqchat_core::traits::provider::ProviderAdapter;
use faqchat_core::types::{
    AdapterType, ChatMessage, HealthStatus, ProviderRequest, ProviderResponse, TokenUsage,
    ToolCall,
};
use faqchat_core::FaqchatError;

/// A queued reply: an assistant message, or an error message to fail with.
type Reply = Result<ChatMessage, String>;

/// A mock chat model that returns pre-configured replies.
///
/// Replies are popped from a FIFO queue. When the queue is empty,
/// a default "mock response" text is returned.
#[derive(Clone)]
pub struct MockProvider {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    requests: Arc<Mutex<Vec<ProviderRequest>>>,
}

impl MockProvider {
    /// Create a new mock provider with an empty reply queue.
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock provider pre-loaded with the given text replies.
    pub fn with_responses(responses: Vec<String>) -> Self {
        let provider = Self::new();
        if let Ok(mut queue) = provider.replies.try_lock() {
            queue.extend(responses.into_iter().map(|text| Ok(ChatMessage::assistant(text))));
        }
        provider
    }

    /// Queue a plain text reply.
    pub async fn add_response(&self, text: impl Into<String>) {
        self.replies
            .lock()
            .await
            .push_back(Ok(ChatMessage::assistant(text)));
    }

    /// Queue a reply that requests a single tool call.
    pub async fn add_tool_call(&self, name: impl Into<String>, arguments: serde_json::Value) {
        let mut msg = ChatMessage::assistant("");
        msg.tool_calls.push(ToolCall {
            name: name.into(),
            arguments,
        });
        self.replies.lock().await.push_back(Ok(msg));
    }

    /// Queue a reply that fails with a provider error.
    pub async fn add_error(&self, message: impl Into<String>) {
        self.replies.lock().await.push_back(Err(message.into()));
    }

    /// Returns every request received so far, oldest first.
    pub async fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().await.clone()
    }

    async fn next_reply(&self) -> Reply {
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(ChatMessage::assistant("mock response")))
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, FaqchatError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, FaqchatError> {
        let model = request.model.clone();
        self.requests.lock().await.push(request);

        let message = self.next_reply().await.map_err(|message| FaqchatError::Provider {
            message,
            source: None,
        })?;
        Ok(ProviderResponse {
            model,
            message,
            usage: TokenUsage {
                input_tokens: 10,
                output_tokens: 20,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ProviderRequest {
        ProviderRequest {
            model: "test-model".to_string(),
            messages: vec![ChatMessage::user("hi")],
            tools: vec![],
        }
    }

    #[tokio::test]
    async fn default_response_when_queue_empty() {
        let provider = MockProvider::new();
        let resp = provider.complete(request()).await.unwrap();
        assert_eq!(resp.message.content, "mock response");
    }

    #[tokio::test]
    async fn queued_responses_returned_in_order() {
        let provider =
            MockProvider::with_responses(vec!["first".to_string(), "second".to_string()]);

        assert_eq!(provider.complete(request()).await.unwrap().message.content, "first");
        assert_eq!(provider.complete(request()).await.unwrap().message.content, "second");
        assert_eq!(
            provider.complete(request()).await.unwrap().message.content,
            "mock response"
        );
    }

    #[tokio::test]
    async fn tool_calls_and_errors_are_replayed() {
        let provider = MockProvider::new();
        provider
            .add_tool_call("faq", serde_json::json!({"question": "q"}))
            .await;
        provider.add_error("model exploded").await;

        let first = provider.complete(request()).await.unwrap();
        assert_eq!(first.message.tool_calls[0].name, "faq");
        let err = provider.complete(request()).await.unwrap_err();
        assert!(err.to_string().contains("model exploded"));
    }

    #[tokio::test]
    async fn requests_are_recorded() {
        let provider = MockProvider::new();
        provider.complete(request()).await.unwrap();
        let seen = provider.requests().await;
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].model, "test-model");
        assert_eq!(seen[0].messages[0].content, "hi");
    }
}
