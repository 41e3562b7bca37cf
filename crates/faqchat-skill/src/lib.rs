// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tools the chat model can call, and the image describer behind one of them.
//!
//! [`ToolRegistry`] is the explicit dispatch table from tool name to handler.
//! [`builtin::register_builtins`] installs the `faq` and `describe_image` tools.

pub mod builtin;
pub mod tool;
pub mod vision;

pub use tool::{parse_args, Tool, ToolOutput, ToolRegistry};
pub use vision::ImageDescriber;
