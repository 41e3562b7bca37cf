// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! System prompt resolution.

use faqchat_config::model::AgentConfig;
use faqchat_core::FaqchatError;
use tracing::{info, warn};

/// Loads the system prompt: `system_prompt_file`, then `system_prompt`,
/// then the built-in FAQ assistant prompt.
///
/// An unreadable or empty prompt file falls through to the next source.
pub async fn load_system_prompt(config: &AgentConfig) -> Result<String, FaqchatError> {
    if let Some(ref file_path) = config.system_prompt_file {
        match tokio::fs::read_to_string(file_path).await {
            Ok(content) if !content.trim().is_empty() => {
                info!(path = file_path.as_str(), "loaded system prompt from file");
                return Ok(content.trim().to_string());
            }
            Ok(_) => warn!(path = file_path.as_str(), "system prompt file is empty"),
            Err(e) => warn!(
                path = file_path.as_str(),
                error = %e,
                "failed to read system prompt file, falling back"
            ),
        }
    }

    if let Some(ref prompt) = config.system_prompt
        && !prompt.trim().is_empty()
    {
        return Ok(prompt.clone());
    }

    Ok(default_prompt(&config.name))
}

fn default_prompt(name: &str) -> String {
    format!(
        "You are {name}, a virtual assistant that answers frequently asked questions \
from a predefined list. Give direct and accurate answers, and only for questions on that list.
Rules:
- If the user greets you, answer with an appropriate greeting.
- If the user's question matches or resembles a question on the list, give the corresponding answer.
- If the question is not on the list, reply: \"Sorry, I don't know how to answer that question.\"
- Never invent answers or go beyond what the list says.
- You may rephrase an answer to make it clearer, as long as its meaning stays the same."
    )
}
