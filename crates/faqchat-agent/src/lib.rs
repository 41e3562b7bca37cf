// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat turn processing for faqchat.
//!
//! A [`Conversation`] is the transcript owned by the caller. A [`ChatSession`]
//! runs one user turn at a time against the chat model, dispatching the tool
//! calls the model makes through a [`faqchat_skill::ToolRegistry`].

pub mod conversation;
pub mod prompt;
pub mod session;

pub use conversation::Conversation;
pub use prompt::load_system_prompt;
pub use session::{ChatSession, SessionState, ToolObserver};
