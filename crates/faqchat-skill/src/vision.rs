// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Image description through a vision-capable chat model.
//!
//! An image reference is either a local path (`file://` URL or bare path) or
//! an `http(s)` URL. Local references are read from disk and never touch the
//! network; remote references are downloaded and never touch the filesystem.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use faqchat_config::model::ImageConfig;
use faqchat_core::traits::ProviderAdapter;
use faqchat_core::types::{ChatMessage, ImageData, ProviderRequest};
use faqchat_core::FaqchatError;
use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use tracing::{debug, info, warn};

/// Instruction sent with every image.
const DESCRIBE_INSTRUCTION: &str = "\
Describe the image in detail.
If it is a screenshot of an application, name every UI component with its type and label.
Someone who cannot see the image must be able to understand everything in it from your description alone.
If the image is a chart, describe what it represents and how it is organized.
If the image is a diagram, describe what it represents and how it is organized.
If the image contains text, transcribe the text.";

/// Fallback media type when nothing better is known.
const UNKNOWN_MEDIA_TYPE: &str = "image/*";

#[derive(Debug, Clone, PartialEq, Eq)]
enum ImageSource {
    Local(PathBuf),
    Remote(Url),
}

/// Describes images with the configured vision model.
pub struct ImageDescriber {
    model: String,
    config: ImageConfig,
    http: reqwest::Client,
    provider: OnceLock<Arc<dyn ProviderAdapter>>,
}

impl ImageDescriber {
    /// Creates an uninitialized describer that will use `model`.
    pub fn new(model: impl Into<String>, config: ImageConfig) -> Self {
        Self {
            model: model.into(),
            config,
            http: reqwest::Client::new(),
            provider: OnceLock::new(),
        }
    }

    /// Installs the chat provider used to reach the vision model.
    ///
    /// The model itself is pulled during bootstrap. Later calls keep the
    /// first provider.
    pub fn initialize(&self, provider: Arc<dyn ProviderAdapter>) {
        if self.provider.set(provider).is_err() {
            warn!("image describer already initialized");
            return;
        }
        info!(model = %self.model, "image describer initialized");
    }

    pub fn is_initialized(&self) -> bool {
        self.provider.get().is_some()
    }

    /// Describes the image at `image_ref` and returns the model's text verbatim.
    pub async fn describe(&self, image_ref: &str) -> Result<String, FaqchatError> {
        let provider = self
            .provider
            .get()
            .cloned()
            .ok_or_else(|| FaqchatError::NotInitialized {
                component: "image describer".to_string(),
            })?;

        info!(image = image_ref, "describing image");
        let image = match parse_image_ref(image_ref)? {
            ImageSource::Local(path) => self.read_local(image_ref, &path).await?,
            ImageSource::Remote(url) => self.fetch_remote(url).await?,
        };
        debug!(bytes = image.bytes.len(), media_type = %image.media_type, "image loaded");

        let request = ProviderRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(DESCRIBE_INSTRUCTION).with_image(image)],
            tools: Vec::new(),
        };
        let response = provider.complete(request).await?;
        Ok(response.message.content)
    }

    async fn read_local(&self, image_ref: &str, path: &Path) -> Result<ImageData, FaqchatError> {
        let fetch_error = |message: String| FaqchatError::Fetch {
            url: image_ref.to_string(),
            message,
            status: None,
        };

        if !self.config.allow_local_files {
            return Err(fetch_error("local image files are disabled".to_string()));
        }

        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|e| fetch_error(format!("cannot read {}: {e}", path.display())))?;
        self.check_size(image_ref, meta.len())?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| fetch_error(format!("cannot read {}: {e}", path.display())))?;
        self.check_size(image_ref, bytes.len() as u64)?;

        Ok(ImageData {
            bytes,
            media_type: media_type_for_path(path).to_string(),
        })
    }

    async fn fetch_remote(&self, url: Url) -> Result<ImageData, FaqchatError> {
        let timeout = Duration::from_secs(self.config.fetch_timeout_secs);
        let fetch_error = |message: String, status: Option<u16>| FaqchatError::Fetch {
            url: url.to_string(),
            message,
            status,
        };
        let transport_error = |e: reqwest::Error, status: Option<u16>| {
            if e.is_timeout() && !e.is_connect() {
                FaqchatError::Timeout { duration: timeout }
            } else {
                fetch_error(format!("request failed: {e}"), status)
            }
        };

        let response = self
            .http
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(e, None))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(
                format!("server returned {status}"),
                Some(status.as_u16()),
            ));
        }
        if let Some(len) = response.content_length() {
            self.check_size(url.as_str(), len)?;
        }

        let media_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| media_type_for_path(Path::new(url.path())).to_string());

        // Chunked bodies carry no length up front, so the limit is enforced
        // while reading.
        let mut body = response.bytes_stream();
        let mut bytes = Vec::new();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| transport_error(e, Some(status.as_u16())))?;
            if (bytes.len() + chunk.len()) as u64 > self.max_bytes() {
                return Err(fetch_error(
                    format!(
                        "image exceeds the {} byte limit",
                        self.config.max_image_bytes
                    ),
                    Some(status.as_u16()),
                ));
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(ImageData { bytes, media_type })
    }

    fn max_bytes(&self) -> u64 {
        self.config.max_image_bytes as u64
    }

    fn check_size(&self, image_ref: &str, len: u64) -> Result<(), FaqchatError> {
        if len > self.max_bytes() {
            return Err(FaqchatError::Fetch {
                url: image_ref.to_string(),
                message: format!(
                    "image is {len} bytes, larger than the {} byte limit",
                    self.config.max_image_bytes
                ),
                status: None,
            });
        }
        Ok(())
    }
}

fn parse_image_ref(image_ref: &str) -> Result<ImageSource, FaqchatError> {
    let trimmed = image_ref.trim();
    let fetch_error = |message: String| FaqchatError::Fetch {
        url: image_ref.to_string(),
        message,
        status: None,
    };
    if trimmed.is_empty() {
        return Err(fetch_error("empty image reference".to_string()));
    }

    match Url::parse(trimmed) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(ImageSource::Remote(url)),
            "file" => url
                .to_file_path()
                .map(ImageSource::Local)
                .map_err(|()| fetch_error("invalid file URL".to_string())),
            // Windows drive letters parse as one-letter schemes.
            scheme if scheme.len() == 1 => Ok(ImageSource::Local(PathBuf::from(trimmed))),
            scheme => Err(fetch_error(format!("unsupported URL scheme `{scheme}`"))),
        },
        Err(_) => Ok(ImageSource::Local(PathBuf::from(trimmed))),
    }
}

fn media_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => UNKNOWN_MEDIA_TYPE,
    }
}
