// src/llm/types.rs
// Request and response shapes shared by the relay and the Ollama client.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use super::error::InvalidRequest;

pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2000;
pub const TEMPERATURE_RANGE: RangeInclusive<f64> = 0.0..=2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Body of `POST /api/chat`.
///
/// Optional fields stay `None` until [`ChatRequest::temperature`] and
/// [`ChatRequest::max_tokens`] resolve them, so an explicit `null` from the
/// client behaves like an omitted field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,

    #[serde(default, rename = "systemPrompt", skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(&self) -> f64 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    pub fn validate(&self) -> Result<(), InvalidRequest> {
        let temperature = self.temperature();
        if !temperature.is_finite() || !TEMPERATURE_RANGE.contains(&temperature) {
            return Err(InvalidRequest::Temperature(temperature));
        }
        if self.max_tokens() == 0 {
            return Err(InvalidRequest::MaxTokens);
        }
        Ok(())
    }
}

/// Sampling parameters forwarded to Ollama under `options`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationOptions {
    pub temperature: f64,
    #[serde(rename = "num_predict")]
    pub max_tokens: u32,
    pub top_k: u32,
    pub top_p: f64,
    pub repeat_penalty: f64,
    pub seed: u64,
    #[serde(rename = "num_ctx")]
    pub context_window: u32,
    #[serde(rename = "num_thread")]
    pub threads: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            top_k: 40,
            top_p: 0.9,
            repeat_penalty: 1.1,
            seed: 42,
            context_window: 4096,
            threads: 4,
        }
    }
}

impl GenerationOptions {
    /// Fixed defaults with the request's temperature and token budget applied.
    pub fn for_request(request: &ChatRequest) -> Self {
        Self {
            temperature: request.temperature(),
            max_tokens: request.max_tokens(),
            ..Self::default()
        }
    }
}

/// Wire payload for Ollama's `/api/chat`.
#[derive(Debug, Serialize)]
pub struct OllamaChatPayload<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub stream: bool,
    pub system: &'a str,
    pub options: GenerationOptions,
}

/// Single-shot `/api/chat` reply.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub message: ResponseMessage,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub role: Option<Role>,
    pub content: String,
}

impl ChatResponse {
    pub fn content(&self) -> &str {
        &self.message.content
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersionResponse {
    #[serde(default)]
    pub version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_defaults() {
        let request: ChatRequest =
            serde_json::from_value(json!({"messages": [{"role": "user", "content": "hi"}]}))
                .unwrap();
        assert_eq!(request.temperature(), 0.7);
        assert_eq!(request.max_tokens(), 2000);
        assert_eq!(request.system_prompt, None);
        assert_eq!(request.messages[0].role, Role::User);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_request_camel_case_system_prompt() {
        let request: ChatRequest = serde_json::from_value(json!({
            "messages": [],
            "systemPrompt": "Be brief.",
            "temperature": 0.2,
            "max_tokens": 64
        }))
        .unwrap();
        assert_eq!(request.system_prompt.as_deref(), Some("Be brief."));
        assert_eq!(request.temperature(), 0.2);
        assert_eq!(request.max_tokens(), 64);
    }

    #[test]
    fn test_validation_bounds() {
        assert!(ChatRequest::new(vec![]).with_temperature(0.0).validate().is_ok());
        assert!(ChatRequest::new(vec![]).with_temperature(2.0).validate().is_ok());
        assert_eq!(
            ChatRequest::new(vec![]).with_temperature(2.5).validate(),
            Err(InvalidRequest::Temperature(2.5))
        );
        assert!(ChatRequest::new(vec![]).with_temperature(f64::NAN).validate().is_err());
        assert_eq!(
            ChatRequest::new(vec![]).with_max_tokens(0).validate(),
            Err(InvalidRequest::MaxTokens)
        );
    }

    #[test]
    fn test_unknown_role_rejected() {
        let parsed: Result<ChatRequest, _> =
            serde_json::from_value(json!({"messages": [{"role": "tool", "content": "x"}]}));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_options_use_ollama_names() {
        let request = ChatRequest::new(vec![]).with_temperature(1.0).with_max_tokens(10);
        let value = serde_json::to_value(GenerationOptions::for_request(&request)).unwrap();
        assert_eq!(
            value,
            json!({
                "temperature": 1.0,
                "num_predict": 10,
                "top_k": 40,
                "top_p": 0.9,
                "repeat_penalty": 1.1,
                "seed": 42,
                "num_ctx": 4096,
                "num_thread": 4
            })
        );
    }

    #[test]
    fn test_response_content() {
        let response: ChatResponse = serde_json::from_value(json!({
            "model": "llama3.2",
            "message": {"role": "assistant", "content": "Hello"},
            "done": true
        }))
        .unwrap();
        assert_eq!(response.content(), "Hello");
        assert!(response.done);
    }
}
