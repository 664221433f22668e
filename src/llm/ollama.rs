// src/llm/ollama.rs
// HTTP client for a local Ollama server: streamed and single-shot chat, plus
// the version probe behind the status endpoint.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::Client as HttpClient;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::error::UpstreamError;
use super::types::{ChatRequest, ChatResponse, GenerationOptions, OllamaChatPayload, VersionResponse};
use crate::config::UpstreamConfig;
use crate::persona::resolve_system_prompt;

/// Bound on establishing the TCP/TLS connection. The request deadline still
/// covers the whole exchange.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Raw upstream body, chunk by chunk. Dropping it closes the connection.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, UpstreamError>> + Send>>;

pub enum ChatReply {
    Stream(ByteStream),
    Complete(ChatResponse),
}

#[derive(Clone)]
pub struct OllamaClient {
    http: HttpClient,
    config: Arc<UpstreamConfig>,
}

impl OllamaClient {
    pub fn new(config: UpstreamConfig) -> Self {
        let http = HttpClient::builder()
            .timeout(config.request_timeout())
            .connect_timeout(CONNECT_TIMEOUT.min(config.request_timeout()))
            .pool_max_idle_per_host(10)
            .build()
            .unwrap_or_else(|_| HttpClient::new());

        Self {
            http,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url(), path)
    }

    fn payload<'a>(&'a self, request: &'a ChatRequest, stream: bool) -> OllamaChatPayload<'a> {
        OllamaChatPayload {
            model: &self.config.model,
            messages: &request.messages,
            stream,
            system: resolve_system_prompt(request.system_prompt.as_deref(), self.config.persona()),
            options: GenerationOptions::for_request(request),
        }
    }

    /// One `POST /api/chat`, no retry. A non-2xx status fails before any
    /// body is handed out.
    pub async fn send_chat(
        &self,
        request: &ChatRequest,
        streaming: bool,
    ) -> Result<ChatReply, UpstreamError> {
        let url = self.endpoint("/api/chat");
        let deadline = self.config.request_timeout();

        debug!(
            model = %self.config.model,
            streaming,
            messages = request.messages.len(),
            "Sending chat request to Ollama"
        );

        let response = self
            .http
            .post(&url)
            .json(&self.payload(request, streaming))
            .send()
            .await
            .map_err(|e| UpstreamError::from_transport(e, &url, deadline))?;

        let response = ensure_success(response).await?;

        if streaming {
            let bytes = response
                .bytes_stream()
                .map(move |chunk| chunk.map_err(|e| UpstreamError::from_transport(e, &url, deadline)));
            return Ok(ChatReply::Stream(Box::pin(bytes)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::from_transport(e, &url, deadline))?;
        let parsed: ChatResponse =
            serde_json::from_slice(&body).map_err(|e| UpstreamError::Decode(e.to_string()))?;
        Ok(ChatReply::Complete(parsed))
    }

    pub async fn chat_stream(&self, request: &ChatRequest) -> Result<ByteStream, UpstreamError> {
        match self.send_chat(request, true).await? {
            ChatReply::Stream(bytes) => Ok(bytes),
            ChatReply::Complete(_) => Err(UpstreamError::Decode(
                "expected a streamed reply".to_string(),
            )),
        }
    }

    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, UpstreamError> {
        match self.send_chat(request, false).await? {
            ChatReply::Complete(response) => Ok(response),
            ChatReply::Stream(_) => Err(UpstreamError::Decode(
                "expected a single reply body".to_string(),
            )),
        }
    }

    /// `GET /api/version` under the short status deadline.
    pub async fn version(&self) -> Result<String, UpstreamError> {
        let url = self.endpoint("/api/version");
        let deadline = self.config.status_timeout();

        let response = self
            .http
            .get(&url)
            .timeout(deadline)
            .send()
            .await
            .map_err(|e| UpstreamError::from_transport(e, &url, deadline))?;
        let response = ensure_success(response).await?;

        let body: VersionResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))?;
        Ok(body.version.unwrap_or_else(|| "unknown".to_string()))
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, UpstreamError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|e| format!("(failed to read body: {e})"));
    warn!(status = status.as_u16(), body = %body, "Ollama returned an error status");
    Err(UpstreamError::BadStatus {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::ChatMessage;
    use crate::persona::DEFAULT_PERSONA_PROMPT;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answers a single connection with a canned HTTP response.
    async fn serve_once(raw_response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 65536];
            let _ = stream.read(&mut buf).await;
            stream.write_all(raw_response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
        });
        format!("http://127.0.0.1:{port}")
    }

    fn client_for(base_url: String) -> OllamaClient {
        OllamaClient::new(UpstreamConfig::default().with_base_url(base_url))
    }

    #[test]
    fn test_payload_uses_persona_when_prompt_missing() {
        let client = client_for("http://localhost:11434".to_string());
        let request = ChatRequest::new(vec![ChatMessage::user("hello")]);
        let payload = serde_json::to_value(client.payload(&request, true)).unwrap();

        assert_eq!(payload["model"], "llama3.2");
        assert_eq!(payload["stream"], true);
        assert_eq!(payload["system"], DEFAULT_PERSONA_PROMPT);
        assert_eq!(payload["messages"][0]["role"], "user");
        assert_eq!(payload["options"]["num_predict"], 2000);
    }

    #[test]
    fn test_blank_request_prompt_falls_back() {
        let client = client_for("http://localhost:11434".to_string());
        let request = ChatRequest::new(vec![]).with_system_prompt("  ");
        let payload = serde_json::to_value(client.payload(&request, true)).unwrap();
        assert_eq!(payload["system"], DEFAULT_PERSONA_PROMPT);
    }

    #[test]
    fn test_payload_prefers_request_prompt() {
        let client = client_for("http://localhost:11434".to_string());
        let request = ChatRequest::new(vec![]).with_system_prompt("Answer in French.");
        let payload = serde_json::to_value(client.payload(&request, false)).unwrap();

        assert_eq!(payload["system"], "Answer in French.");
        assert_eq!(payload["stream"], false);
    }

    #[tokio::test]
    async fn test_bad_status_surfaces_body() {
        let base = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\n\
             Content-Type: text/plain\r\n\
             Content-Length: 13\r\n\
             Connection: close\r\n\r\n\
             model loading",
        )
        .await;

        let err = client_for(base)
            .chat(&ChatRequest::new(vec![ChatMessage::user("hi")]))
            .await
            .err()
            .unwrap();
        match err {
            UpstreamError::BadStatus { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "model loading");
            }
            other => panic!("expected BadStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unexpected_single_body_is_decode_error() {
        let base = serve_once(
            "HTTP/1.1 200 OK\r\n\
             Content-Type: application/json\r\n\
             Content-Length: 11\r\n\
             Connection: close\r\n\r\n\
             {\"ok\":true}",
        )
        .await;

        let err = client_for(base)
            .chat(&ChatRequest::new(vec![ChatMessage::user("hi")]))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, UpstreamError::Decode(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_connection_refused_is_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = client_for(format!("http://127.0.0.1:{port}"))
            .version()
            .await
            .err()
            .unwrap();
        assert!(matches!(err, UpstreamError::Unreachable { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_version_defaults_to_unknown() {
        let base = serve_once(
            "HTTP/1.1 200 OK\r\n\
             Content-Type: application/json\r\n\
             Content-Length: 2\r\n\
             Connection: close\r\n\r\n\
             {}",
        )
        .await;

        assert_eq!(client_for(base).version().await.unwrap(), "unknown");
    }
}
