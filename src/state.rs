// src/state.rs
// Shared, read-only application state handed to every handler

use std::sync::Arc;

use crate::analysis::{DocumentAnalyzer, DocumentTextExtractor, TextExtractor};
use crate::config::RelayConfig;
use crate::llm::OllamaClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub ollama: OllamaClient,
    pub analyzer: Arc<DocumentAnalyzer>,
}

impl AppState {
    pub fn new(config: RelayConfig) -> Self {
        Self::with_extractor(config, Arc::new(DocumentTextExtractor))
    }

    /// Same as [`AppState::new`] with a different document extractor.
    pub fn with_extractor(config: RelayConfig, extractor: Arc<dyn TextExtractor>) -> Self {
        let ollama = OllamaClient::new(config.upstream.clone());
        let analyzer = Arc::new(DocumentAnalyzer::new(ollama.clone(), extractor));

        Self {
            config: Arc::new(config),
            ollama,
            analyzer,
        }
    }
}
