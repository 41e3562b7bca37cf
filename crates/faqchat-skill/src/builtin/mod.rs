// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in tools offered to the chat model.

pub mod faq;
pub mod image;

pub use faq::FaqTool;
pub use image::ImageTool;

use std::sync::Arc;

use faqchat_memory::FaqMatcher;

use crate::{ImageDescriber, ToolRegistry};

/// Registers the FAQ and image tools into the given registry.
pub fn register_builtins(
    registry: &mut ToolRegistry,
    matcher: Arc<FaqMatcher>,
    describer: Arc<ImageDescriber>,
) {
    registry.register(Arc::new(FaqTool::new(matcher)));
    registry.register(Arc::new(ImageTool::new(describer)));
}
