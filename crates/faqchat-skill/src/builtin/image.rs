// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Image description tool.

use std::sync::Arc;

use async_trait::async_trait;
use faqchat_core::FaqchatError;
use serde::Deserialize;

use crate::tool::{parse_args, Tool, ToolOutput};
use crate::vision::ImageDescriber;

#[derive(Debug, Deserialize)]
struct ImageArgs {
    image_url: String,
}

/// Describes an image linked in the conversation.
pub struct ImageTool {
    describer: Arc<ImageDescriber>,
}

impl ImageTool {
    pub fn new(describer: Arc<ImageDescriber>) -> Self {
        Self { describer }
    }
}

#[async_trait]
impl Tool for ImageTool {
    fn name(&self) -> &str {
        "describe_image"
    }

    fn description(&self) -> &str {
        "Describes the content of an image. Invoke this whenever an image link is available, \
         including image links that appear inside FAQ answers."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "image_url": {
                    "type": "string",
                    "description": "URL or local path of the image"
                }
            },
            "required": ["image_url"]
        })
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<ToolOutput, FaqchatError> {
        let args: ImageArgs = parse_args(self.name(), input)?;
        let description = self.describer.describe(&args.image_url).await?;
        Ok(ToolOutput::text(description))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ToolRegistry;
    use faqchat_config::model::ImageConfig;
    use faqchat_core::types::ToolCall;
    use faqchat_test_utils::MockProvider;

    #[tokio::test]
    async fn describes_local_image() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("logo.png");
        std::fs::write(&file, b"png").unwrap();

        let provider = MockProvider::with_responses(vec!["A blue logo.".into()]);
        let describer = Arc::new(ImageDescriber::new("llava", ImageConfig::default()));
        describer.initialize(Arc::new(provider));

        let output = ImageTool::new(describer)
            .invoke(serde_json::json!({"image_url": file.to_str().unwrap()}))
            .await
            .unwrap();
        assert_eq!(output, ToolOutput::text("A blue logo."));
    }

    #[tokio::test]
    async fn describer_failure_reaches_model_as_error_output() {
        let describer = Arc::new(ImageDescriber::new("llava", ImageConfig::default()));
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(ImageTool::new(describer)));

        let output = registry
            .dispatch(&ToolCall {
                name: "describe_image".into(),
                arguments: serde_json::json!({"image_url": "https://example.com/a.png"}),
            })
            .await;
        assert!(output.is_error);
        assert!(output.content.contains("not initialized"));
    }
}
