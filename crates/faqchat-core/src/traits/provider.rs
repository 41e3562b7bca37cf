// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for chat model integrations.

use async_trait::async_trait;

use crate::error::FaqchatError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ProviderRequest, ProviderResponse};

/// Adapter for chat model integrations.
///
/// Provider adapters handle communication with language model runtimes,
/// including tool definitions and image attachments. The model named in
/// the request is used, so one adapter serves both the chat and the vision
/// model.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Sends a completion request and returns the full response.
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, FaqchatError>;
}
