// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Ollama API.
//!
//! Provides [`OllamaClient`] which handles request construction, status
//! handling, and the NDJSON progress stream of `/api/pull`. Failures are
//! returned to the caller as they happen; nothing is retried.

use std::pin::Pin;
use std::time::Duration;

use faqchat_core::FaqchatError;
use futures::stream::{self, Stream, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::types::{
    ApiErrorResponse, ChatRequest, ChatResponse, EmbedRequest, EmbedResponse, PullProgress,
    PullRequest, ShowRequest, ShowResponse, VersionResponse,
};

/// Stream of pull progress lines.
pub type PullStream = Pin<Box<dyn Stream<Item = Result<PullProgress, FaqchatError>> + Send>>;

/// Which error variant a failed call maps to.
#[derive(Debug, Clone, Copy)]
enum Surface {
    Provider,
    Embedding,
}

impl Surface {
    fn error(
        self,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> FaqchatError {
        match self {
            Surface::Provider => FaqchatError::Provider { message, source },
            Surface::Embedding => FaqchatError::Embedding { message, source },
        }
    }
}

/// HTTP client for an Ollama server.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl OllamaClient {
    /// Creates a client for the server at `endpoint`, e.g. `http://localhost:11434`.
    ///
    /// `timeout` bounds chat, embed, and show calls. Pulls are not bounded
    /// since downloads can take arbitrarily long.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, FaqchatError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| FaqchatError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: endpoint.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Returns the server base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Sends a non-streamed chat request.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, FaqchatError> {
        let mut req = request.clone();
        req.stream = false;
        self.post_json("/api/chat", &req, Surface::Provider).await
    }

    /// Embeds every input string in one call.
    pub async fn embed(&self, request: &EmbedRequest) -> Result<EmbedResponse, FaqchatError> {
        self.post_json("/api/embed", request, Surface::Embedding).await
    }

    /// Fetches model metadata.
    pub async fn show(&self, model: &str) -> Result<ShowResponse, FaqchatError> {
        let req = ShowRequest {
            model: model.to_string(),
        };
        self.post_json("/api/show", &req, Surface::Provider).await
    }

    /// Returns the server version. Used as the health check.
    pub async fn version(&self) -> Result<String, FaqchatError> {
        let response = self
            .client
            .get(self.url("/api/version"))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| request_failed(Surface::Provider, e, Some(self.timeout)))?;
        let parsed: VersionResponse = read_body(response, Surface::Provider).await?;
        Ok(parsed.version)
    }

    /// Starts pulling `model` and returns its progress stream.
    ///
    /// The stream yields an error item if the server reports one mid-pull.
    pub async fn pull(&self, model: &str) -> Result<PullStream, FaqchatError> {
        let req = PullRequest {
            model: model.to_string(),
            stream: true,
        };
        let response = self
            .client
            .post(self.url("/api/pull"))
            .json(&req)
            .send()
            .await
            .map_err(|e| request_failed(Surface::Provider, e, None))?;

        let status = response.status();
        debug!(status = %status, model, "pull response received");
        if !status.is_success() {
            return Err(status_error(response, Surface::Provider).await);
        }

        Ok(parse_ndjson_stream(response))
    }

    /// Posts `body` as JSON and decodes the response.
    async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        surface: Surface,
    ) -> Result<T, FaqchatError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.url(path))
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| request_failed(surface, e, Some(self.timeout)))?;

        let status = response.status();
        debug!(status = %status, path, "response received");
        if !status.is_success() {
            return Err(status_error(response, surface).await);
        }
        read_body(response, surface).await
    }
}

/// Maps a transport failure. `timeout` is the per-request bound, if one was set;
/// connect timeouts stay transport errors.
fn request_failed(surface: Surface, e: reqwest::Error, timeout: Option<Duration>) -> FaqchatError {
    match timeout {
        Some(duration) if e.is_timeout() && !e.is_connect() => FaqchatError::Timeout { duration },
        _ => surface.error(format!("HTTP request failed: {e}"), Some(Box::new(e))),
    }
}

async fn read_body<T: DeserializeOwned>(
    response: reqwest::Response,
    surface: Surface,
) -> Result<T, FaqchatError> {
    let body = response.text().await.map_err(|e| {
        surface.error(
            format!("failed to read response body: {e}"),
            Some(Box::new(e)),
        )
    })?;
    serde_json::from_str(&body).map_err(|e| {
        surface.error(
            format!("failed to parse Ollama response: {e}"),
            Some(Box::new(e)),
        )
    })
}

async fn status_error(response: reqwest::Response, surface: Surface) -> FaqchatError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
        Ok(api_err) => format!("Ollama API error ({status}): {}", api_err.error),
        Err(_) => format!("Ollama returned {status}: {body}"),
    };
    surface.error(message, None)
}

/// Splits a chunked body into newline-delimited JSON progress records.
fn parse_ndjson_stream(response: reqwest::Response) -> PullStream {
    let chunks = response
        .bytes_stream()
        .map(Some)
        .chain(stream::once(async { None }));

    let lines = chunks
        .scan(Vec::<u8>::new(), |buf, chunk| {
            let items = match chunk {
                Some(Ok(bytes)) => {
                    buf.extend_from_slice(&bytes);
                    drain_lines(buf)
                }
                Some(Err(e)) => vec![Err(request_failed(Surface::Provider, e, None))],
                // Trailing line without a newline.
                None => parse_line(&std::mem::take(buf)).into_iter().collect(),
            };
            futures::future::ready(Some(items))
        })
        .flat_map(stream::iter);

    Box::pin(lines)
}

fn drain_lines(buf: &mut Vec<u8>) -> Vec<Result<PullProgress, FaqchatError>> {
    let mut out = Vec::new();
    while let Some(pos) = buf.iter().position(|b| *b == b'\n') {
        let line: Vec<u8> = buf.drain(..=pos).collect();
        if let Some(item) = parse_line(&line) {
            out.push(item);
        }
    }
    out
}

fn parse_line(line: &[u8]) -> Option<Result<PullProgress, FaqchatError>> {
    let text = match std::str::from_utf8(line) {
        Ok(text) => text.trim(),
        Err(e) => return Some(Err(malformed_line(e))),
    };
    if text.is_empty() {
        return None;
    }
    let parsed = serde_json::from_str::<PullProgress>(text).map_err(malformed_line);
    Some(parsed.and_then(|progress| match &progress.error {
        Some(error) => Err(FaqchatError::Provider {
            message: format!("pull failed: {error}"),
            source: None,
        }),
        None => Ok(progress),
    }))
}

fn malformed_line(e: impl std::error::Error + Send + Sync + 'static) -> FaqchatError {
    FaqchatError::Provider {
        message: format!("malformed pull progress line: {e}"),
        source: Some(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ApiMessage;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> OllamaClient {
        OllamaClient::new(base_url, Duration::from_secs(5)).unwrap()
    }

    fn chat_request() -> ChatRequest {
        ChatRequest {
            model: "llama3.2".into(),
            messages: vec![ApiMessage {
                role: "user".into(),
                content: "Hello".into(),
                images: vec![],
                tool_calls: vec![],
                tool_name: None,
            }],
            stream: true,
            tools: vec![],
        }
    }

    #[tokio::test]
    async fn chat_success_forces_non_streaming() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(serde_json::json!({"stream": false, "model": "llama3.2"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "llama3.2",
                "message": {"role": "assistant", "content": "Hi there!"},
                "done": true,
                "prompt_eval_count": 12,
                "eval_count": 4
            })))
            .mount(&server)
            .await;

        let result = test_client(&server.uri()).chat(&chat_request()).await.unwrap();
        assert_eq!(result.message.content, "Hi there!");
        assert_eq!(result.prompt_eval_count, 12);
        assert!(result.done);
    }

    #[tokio::test]
    async fn server_error_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(503).set_body_json(serde_json::json!({"error": "busy"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let err = test_client(&server.uri()).chat(&chat_request()).await.unwrap_err();
        assert!(matches!(err, FaqchatError::Provider { .. }));
        assert!(err.to_string().contains("busy"), "got: {err}");
    }

    #[tokio::test]
    async fn missing_model_surfaces_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"error": "model \"llama3.2\" not found"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .chat(&chat_request())
            .await
            .unwrap_err();
        assert!(matches!(err, FaqchatError::Provider { .. }));
        assert!(err.to_string().contains("not found"), "got: {err}");
    }

    #[tokio::test]
    async fn embed_errors_map_to_embedding_variant() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(serde_json::json!({"error": "bad input"})),
            )
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .embed(&EmbedRequest {
                model: "nomic-embed-text".into(),
                input: vec!["x".into()],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, FaqchatError::Embedding { .. }));
    }

    #[tokio::test]
    async fn pull_stream_yields_progress_lines() {
        let server = MockServer::start().await;
        let body = concat!(
            "{\"status\":\"pulling manifest\"}\n",
            "{\"status\":\"downloading\",\"digest\":\"sha256:abc\",\"total\":100,\"completed\":40}\n",
            "\n",
            "{\"status\":\"success\"}"
        );

        Mock::given(method("POST"))
            .and(path("/api/pull"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let stream = test_client(&server.uri()).pull("llava").await.unwrap();
        let items: Vec<PullProgress> = stream.map(|r| r.unwrap()).collect().await;

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].status, "pulling manifest");
        assert_eq!(items[1].completed, Some(40));
        assert_eq!(items[1].total, Some(100));
        assert_eq!(items[2].status, "success");
    }

    #[tokio::test]
    async fn pull_stream_reports_server_error_line() {
        let server = MockServer::start().await;
        let body = "{\"status\":\"pulling manifest\"}\n{\"error\":\"pull model manifest: file does not exist\"}\n";

        Mock::given(method("POST"))
            .and(path("/api/pull"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let stream = test_client(&server.uri()).pull("nope").await.unwrap();
        let items: Vec<_> = stream.collect().await;
        assert!(items[0].is_ok());
        let err = items[1].as_ref().unwrap_err();
        assert!(err.to_string().contains("file does not exist"));
    }

    #[tokio::test]
    async fn version_reads_server_version() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/version"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"version": "0.5.7"})),
            )
            .mount(&server)
            .await;

        let client = test_client(&format!("{}/", server.uri()));
        assert_eq!(client.version().await.unwrap(), "0.5.7");
    }

    #[tokio::test]
    async fn slow_response_is_a_timeout() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(2))
                    .set_body_json(serde_json::json!({
                        "message": {"role": "assistant", "content": ""}
                    })),
            )
            .mount(&server)
            .await;

        let client = OllamaClient::new(&server.uri(), Duration::from_millis(200)).unwrap();
        let err = client.chat(&chat_request()).await.unwrap_err();
        assert!(
            matches!(
                err,
                FaqchatError::Timeout { duration } if duration == Duration::from_millis(200)
            ),
            "got: {err:?}"
        );
    }

    #[test]
    fn invalid_utf8_line_is_reported() {
        let mut buf = b"{\"status\":\"a\"}\n\xff\xfe\n".to_vec();
        let items = drain_lines(&mut buf);
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        let err = items[1].as_ref().unwrap_err();
        assert!(err.to_string().contains("malformed pull progress line"), "got: {err}");
    }

    #[test]
    fn drain_lines_keeps_partial_tail() {
        let mut buf = b"{\"status\":\"a\"}\n{\"sta".to_vec();
        let items = drain_lines(&mut buf);
        assert_eq!(items.len(), 1);
        assert_eq!(buf, b"{\"sta".to_vec());
    }
}
