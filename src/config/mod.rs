// src/config/mod.rs
// Runtime configuration. Built once at startup from flags, environment and
// `.env`, then handed to each component; nothing reads globals.

use anyhow::{Context, Result, bail};
use clap::Args;
use std::time::Duration;

use crate::persona::{DEFAULT_PERSONA_PROMPT, resolve_system_prompt};

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.2";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Top-level relay settings
#[derive(Debug, Clone, Args)]
pub struct RelayConfig {
    /// Address the HTTP server binds to
    #[arg(long, env = "RELAY_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port the HTTP server listens on
    #[arg(short, long, env = "RELAY_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Seconds between SSE keep-alive comments on idle chat streams
    #[arg(long, env = "RELAY_KEEP_ALIVE_SECS", default_value_t = 15)]
    pub keep_alive_secs: u64,

    /// Largest accepted document upload, in bytes
    #[arg(long, env = "RELAY_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    #[command(flatten)]
    pub upstream: UpstreamConfig,
}

/// Where and how to reach the Ollama server
#[derive(Debug, Clone, Args)]
pub struct UpstreamConfig {
    /// Base URL of the Ollama API
    #[arg(long = "ollama-url", env = "OLLAMA_API_URL", default_value = DEFAULT_OLLAMA_URL)]
    pub base_url: String,

    /// Model name passed on every request
    #[arg(long, env = "OLLAMA_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Replaces the built-in persona prompt
    #[arg(long, env = "RELAY_SYSTEM_PROMPT")]
    pub system_prompt: Option<String>,

    /// Deadline for a whole upstream chat call, body included
    #[arg(long, env = "OLLAMA_TIMEOUT_SECS", default_value_t = 60)]
    pub request_timeout_secs: u64,

    /// Deadline for the version probe behind the status endpoint
    #[arg(long, env = "OLLAMA_STATUS_TIMEOUT_SECS", default_value_t = 3)]
    pub status_timeout_secs: u64,
}

impl UpstreamConfig {
    /// Point at a different Ollama instance (test doubles, remote hosts).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Base URL without a trailing slash, ready for path joins.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Persona prompt used when a request has none.
    pub fn persona(&self) -> &str {
        resolve_system_prompt(self.system_prompt.as_deref(), DEFAULT_PERSONA_PROMPT)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn status_timeout(&self) -> Duration {
        Duration::from_secs(self.status_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.base_url)
            .with_context(|| format!("invalid Ollama base URL '{}'", self.base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("Ollama base URL must be http or https, got '{}'", url.scheme());
        }
        if self.model.trim().is_empty() {
            bail!("model name must not be empty");
        }
        if self.request_timeout_secs == 0 || self.status_timeout_secs == 0 {
            bail!("upstream timeouts must be greater than zero");
        }
        Ok(())
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            system_prompt: None,
            request_timeout_secs: 60,
            status_timeout_secs: 3,
        }
    }
}

impl RelayConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs.max(1))
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_upload_bytes == 0 {
            bail!("max upload size must be greater than zero");
        }
        self.upstream.validate()
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            keep_alive_secs: 15,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            upstream: UpstreamConfig::default(),
        }
    }
}
