// src/llm/streaming/mod.rs
// Turns Ollama's chunked NDJSON body into rendered text increments

pub mod decoder;

pub use decoder::{FrameDecoder, StreamIncrement, decode_stream};
