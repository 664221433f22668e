// src/llm/error.rs
// Failures talking to the Ollama server.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("could not reach Ollama at {url}: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("Ollama did not answer within {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Ollama API error: {body}")]
    BadStatus { status: u16, body: String },

    #[error("unexpected response from Ollama: {0}")]
    Decode(String),
}

impl UpstreamError {
    /// Sort a transport failure into the variants callers branch on.
    pub fn from_transport(err: reqwest::Error, url: &str, deadline: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(deadline)
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Unreachable {
                url: url.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

/// A chat request that cannot be sent as-is.
#[derive(Debug, Error, PartialEq)]
pub enum InvalidRequest {
    #[error("temperature must be between 0.0 and 2.0, got {0}")]
    Temperature(f64),

    #[error("max_tokens must be a positive integer")]
    MaxTokens,
}

impl InvalidRequest {
    pub fn field(&self) -> &'static str {
        match self {
            Self::Temperature(_) => "temperature",
            Self::MaxTokens => "max_tokens",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_status_message_carries_body() {
        let err = UpstreamError::BadStatus {
            status: 503,
            body: "model is loading".to_string(),
        };
        assert_eq!(err.to_string(), "Ollama API error: model is loading");
    }

    #[test]
    fn test_timeout_message() {
        let err = UpstreamError::Timeout(Duration::from_secs(60));
        assert_eq!(err.to_string(), "Ollama did not answer within 60s");
    }
}
