// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! FAQ lookup tool.
//!
//! Returns the matching FAQ entries as a JSON array of `{question, response}`.

use std::sync::Arc;

use async_trait::async_trait;
use faqchat_core::FaqchatError;
use faqchat_memory::FaqMatcher;
use serde::Deserialize;

use crate::tool::{parse_args, Tool, ToolOutput};

#[derive(Debug, Deserialize)]
struct FaqArgs {
    question: String,
}

/// Searches the FAQ collection for entries related to a question.
pub struct FaqTool {
    matcher: Arc<FaqMatcher>,
}

impl FaqTool {
    pub fn new(matcher: Arc<FaqMatcher>) -> Self {
        Self { matcher }
    }
}

#[async_trait]
impl Tool for FaqTool {
    fn name(&self) -> &str {
        "faq"
    }

    fn description(&self) -> &str {
        "Searches the frequently asked questions for answers related to the user's question. \
         Only invoke this when the user asked an explicit question."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "question": {
                    "type": "string",
                    "description": "The question the user asked"
                }
            },
            "required": ["question"]
        })
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<ToolOutput, FaqchatError> {
        let args: FaqArgs = parse_args(self.name(), input)?;
        let results = self.matcher.find_faq(&args.question).await?;
        let content = serde_json::to_string(&results).map_err(|e| FaqchatError::Skill {
            message: format!("failed to serialize FAQ results: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(ToolOutput::text(content))
    }
}
