// src/analysis/result.rs
//! The analysis reply schema and the tolerant parse that fills it.
//!
//! Models often wrap JSON in a code fence or a sentence of prose. Parsing
//! tries the reply as-is, then the fenced body, then the outermost `{...}`.
//! When none of those deserializes, [`AnalysisResult::degraded`] builds a
//! schema-valid placeholder from the raw text.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

pub const PARSE_FAILURE_SENTINEL: &str = "Unable to parse structured analysis";
pub const FALLBACK_SUMMARY_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    pub keywords: BTreeSet<String>,
    pub findings: Vec<String>,
    pub recommendations: Vec<String>,
    pub concerns: Vec<String>,
}

impl AnalysisResult {
    /// Parse a model reply, falling back to a degraded result.
    pub fn from_reply(reply: &str) -> Self {
        match Self::parse(reply) {
            Some(result) => result,
            None => {
                warn!(reply_chars = reply.chars().count(), "Model reply did not match analysis schema");
                Self::degraded(reply)
            }
        }
    }

    pub fn parse(reply: &str) -> Option<Self> {
        let trimmed = reply.trim();
        let candidates = [Some(trimmed), fenced_body(trimmed), outer_object(trimmed)];

        candidates.into_iter().flatten().find_map(|candidate| {
            serde_json::from_str(candidate)
                .map_err(|e| debug!(error = %e, "Analysis candidate rejected"))
                .ok()
        })
    }

    /// Placeholder carrying the start of the raw reply as its summary.
    pub fn degraded(reply: &str) -> Self {
        let mut summary: String = reply.chars().take(FALLBACK_SUMMARY_CHARS).collect();
        summary.push_str("...");
        let sentinel = || vec![PARSE_FAILURE_SENTINEL.to_string()];

        Self {
            summary,
            keywords: BTreeSet::from([PARSE_FAILURE_SENTINEL.to_string()]),
            findings: sentinel(),
            recommendations: sentinel(),
            concerns: sentinel(),
        }
    }
}

/// Body of the first ``` fence, minus its language tag line.
fn fenced_body(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_ticks = &text[open + 3..];
    let body_start = after_ticks.find('\n')? + 1;
    let body = &after_ticks[body_start..];
    let close = body.find("```")?;
    Some(body[..close].trim())
}

/// From the first `{` to the last `}`.
fn outer_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
