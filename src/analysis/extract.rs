// src/analysis/extract.rs
//! Text extraction for uploaded documents.
//!
//! PDFs go through `pdf-extract` on the blocking pool, via a scratch copy on
//! disk that is removed when extraction finishes. UTF-8 text and Markdown
//! pass straight through.

use async_trait::async_trait;
use bytes::Bytes;
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("unsupported document type: {0}")]
    Unsupported(String),

    #[error("could not stage upload for extraction: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to extract PDF text: {0}")]
    Pdf(String),

    #[error("extraction task failed: {0}")]
    Task(String),
}

/// Turns raw upload bytes into plain text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, bytes: Bytes, file_name: Option<&str>) -> Result<String, ExtractionError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
}

impl DocumentKind {
    /// Content wins over the file name: `%PDF` magic means PDF whatever the
    /// extension says.
    pub fn detect(bytes: &[u8], file_name: Option<&str>) -> Option<Self> {
        if bytes.starts_with(b"%PDF") {
            return Some(Self::Pdf);
        }

        let extension = file_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);
        if extension.as_deref() == Some("pdf") {
            return Some(Self::Pdf);
        }

        std::str::from_utf8(bytes).ok().map(|_| Self::Text)
    }
}

/// Default extractor for PDF and plain-text uploads.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentTextExtractor;

#[async_trait]
impl TextExtractor for DocumentTextExtractor {
    async fn extract(&self, bytes: Bytes, file_name: Option<&str>) -> Result<String, ExtractionError> {
        let kind = DocumentKind::detect(&bytes, file_name).ok_or_else(|| {
            ExtractionError::Unsupported(file_name.unwrap_or("binary upload").to_string())
        })?;
        debug!(?kind, bytes = bytes.len(), "Extracting document text");

        let raw = match kind {
            DocumentKind::Pdf => extract_pdf(bytes).await?,
            DocumentKind::Text => String::from_utf8_lossy(&bytes).into_owned(),
        };
        Ok(clean_text(&raw))
    }
}

async fn extract_pdf(bytes: Bytes) -> Result<String, ExtractionError> {
    tokio::task::spawn_blocking(move || {
        let mut scratch = tempfile::Builder::new()
            .prefix("relay-upload-")
            .suffix(".pdf")
            .tempfile()?;
        scratch.write_all(&bytes)?;
        scratch.flush()?;

        pdf_extract::extract_text(scratch.path()).map_err(|e| ExtractionError::Pdf(e.to_string()))
    })
    .await
    .map_err(|e| ExtractionError::Task(e.to_string()))?
}

/// Normalize line endings, strip trailing whitespace and squeeze runs of
/// blank lines down to one.
pub fn clean_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;

    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }

    out.trim().to_string()
}
