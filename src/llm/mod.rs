// src/llm/mod.rs
// Ollama client, wire types and the streaming frame decoder

pub mod error;
pub mod ollama;
pub mod streaming;
pub mod types;

pub use error::{InvalidRequest, UpstreamError};
pub use ollama::{ByteStream, ChatReply, OllamaClient};
pub use types::{ChatMessage, ChatRequest, ChatResponse, GenerationOptions, Role};
