// src/analysis/mod.rs
// Document analysis: extract text from an upload, ask the model for a
// structured summary, and always hand back a schema-valid result.

pub mod extract;
pub mod patterns;
pub mod prompt;
pub mod result;

pub use extract::{DocumentKind, DocumentTextExtractor, ExtractionError, TextExtractor};
pub use patterns::{extract_dates, extract_diagnoses, extract_medications};
pub use prompt::build_analysis_prompt;
pub use result::{AnalysisResult, PARSE_FAILURE_SENTINEL};

use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::llm::{ChatMessage, ChatRequest, OllamaClient, UpstreamError};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Error analyzing document: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Error analyzing document: {0}")]
    Upstream(#[from] UpstreamError),
}

pub struct DocumentAnalyzer {
    ollama: OllamaClient,
    extractor: Arc<dyn TextExtractor>,
}

impl DocumentAnalyzer {
    pub fn new(ollama: OllamaClient, extractor: Arc<dyn TextExtractor>) -> Self {
        Self { ollama, extractor }
    }

    /// Extract, prompt, call the model once, parse.
    ///
    /// Only extraction and transport failures are errors. A reply that does
    /// not fit the schema comes back as a degraded result.
    pub async fn analyze(
        &self,
        bytes: Bytes,
        file_name: Option<&str>,
    ) -> Result<AnalysisResult, AnalysisError> {
        let text = self.extractor.extract(bytes, file_name).await?;
        info!(
            file = file_name.unwrap_or("<unnamed>"),
            chars = text.chars().count(),
            "Extracted document text"
        );

        let request = ChatRequest::new(vec![ChatMessage::user(build_analysis_prompt(&text))]);
        let reply = self.ollama.chat(&request).await?;

        Ok(AnalysisResult::from_reply(reply.content()))
    }
}
