// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat turn processing with tool calls.
//!
//! Each turn goes through states: Idle -> Processing -> CallingTools ->
//! Processing -> ... -> Idle. The model may request tools several times per
//! turn, up to the configured iteration cap.

use std::sync::Arc;

use faqchat_config::model::AgentConfig;
use faqchat_core::traits::ProviderAdapter;
use faqchat_core::types::{ChatMessage, ProviderRequest, ToolCall};
use faqchat_core::FaqchatError;
use faqchat_skill::{ToolOutput, ToolRegistry};
use tracing::{debug, info, warn};

use crate::conversation::Conversation;

/// Callback invoked after every tool call, for display.
pub type ToolObserver = Box<dyn Fn(&ToolCall, &ToolOutput) + Send + Sync>;

/// States of a chat session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for user input.
    Idle,
    /// Waiting for the chat model.
    Processing,
    /// Running the tools requested by the model.
    CallingTools,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Processing => write!(f, "processing"),
            SessionState::CallingTools => write!(f, "calling-tools"),
        }
    }
}

/// Runs user turns against the chat model with the registered tools.
pub struct ChatSession {
    provider: Arc<dyn ProviderAdapter>,
    tools: Arc<ToolRegistry>,
    model: String,
    max_tool_iterations: usize,
    state: SessionState,
    observer: Option<ToolObserver>,
}

impl ChatSession {
    pub fn new(
        provider: Arc<dyn ProviderAdapter>,
        tools: Arc<ToolRegistry>,
        model: impl Into<String>,
        config: &AgentConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            model: model.into(),
            max_tool_iterations: config.max_tool_iterations,
            state: SessionState::Idle,
            observer: None,
        }
    }

    /// Installs a callback that sees every tool call and its output.
    pub fn with_tool_observer(mut self, observer: ToolObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Processes one user turn and returns the assistant's reply.
    ///
    /// The user turn is appended first and stays in the transcript even if
    /// the turn fails. On success the final assistant text is appended.
    pub async fn process_turn(
        &mut self,
        conversation: &mut Conversation,
        input: &str,
    ) -> Result<String, FaqchatError> {
        conversation.push_user(input);
        let result = self.run_turn(conversation).await;
        self.state = SessionState::Idle;

        let reply = result?;
        conversation.push_assistant(reply.clone());
        Ok(reply)
    }

    async fn run_turn(&mut self, conversation: &Conversation) -> Result<String, FaqchatError> {
        let mut messages = conversation.messages().to_vec();
        let tools = self.tools.tool_definitions();
        let mut input_tokens = 0u32;
        let mut output_tokens = 0u32;
        let mut iterations = 0usize;

        loop {
            self.state = SessionState::Processing;
            let response = self
                .provider
                .complete(ProviderRequest {
                    model: self.model.clone(),
                    messages: messages.clone(),
                    tools: tools.clone(),
                })
                .await?;
            input_tokens += response.usage.input_tokens;
            output_tokens += response.usage.output_tokens;
            let reply = response.message;

            if reply.tool_calls.is_empty() || iterations >= self.max_tool_iterations {
                if !reply.tool_calls.is_empty() {
                    warn!(
                        max = self.max_tool_iterations,
                        "tool iteration cap reached, using last reply"
                    );
                }
                info!(iterations, input_tokens, output_tokens, "turn finished");
                return Ok(reply.content);
            }

            iterations += 1;
            self.state = SessionState::CallingTools;
            debug!(
                iteration = iterations,
                calls = reply.tool_calls.len(),
                "model requested tools"
            );

            let calls = reply.tool_calls.clone();
            messages.push(reply);
            for call in &calls {
                let output = self.tools.dispatch(call).await;
                if let Some(observer) = &self.observer {
                    observer(call, &output);
                }
                messages.push(ChatMessage::tool(&call.name, tool_message(&output)));
            }
        }
    }
}

fn tool_message(output: &ToolOutput) -> String {
    if output.is_error {
        format!("Error: {}", output.content)
    } else {
        output.content.clone()
    }
}
