// src/analysis/prompt.rs
// Instruction prompt for the single-shot analysis call.

use super::patterns::{extract_dates, extract_diagnoses, extract_medications};

const INSTRUCTIONS: &str = "Analyze the following document. Respond with ONLY a JSON object, \
with no prose before or after it, using exactly this schema:

{
  \"summary\": \"a short overview of the document\",
  \"keywords\": [\"important terms\"],
  \"findings\": [\"notable facts or results\"],
  \"recommendations\": [\"suggested next steps\"],
  \"concerns\": [\"potential issues or risks\"]
}";

/// Build the analysis prompt. Empty `text` still yields a complete prompt
/// with an empty document section.
pub fn build_analysis_prompt(text: &str) -> String {
    let mut prompt = String::with_capacity(INSTRUCTIONS.len() + text.len() + 256);
    prompt.push_str(INSTRUCTIONS);
    prompt.push_str("\n\n");

    let hints = [
        ("Medications mentioned", extract_medications(text)),
        ("Diagnoses mentioned", extract_diagnoses(text)),
        ("Dates mentioned", extract_dates(text)),
    ];
    if hints.iter().any(|(_, hits)| !hits.is_empty()) {
        prompt.push_str("Pre-scan hints (may be incomplete):\n");
        for (label, hits) in hints.iter().filter(|(_, hits)| !hits.is_empty()) {
            prompt.push_str(&format!("- {label}: {}\n", hits.join(", ")));
        }
        prompt.push('\n');
    }

    prompt.push_str("Document text:\n<<<\n");
    prompt.push_str(text);
    prompt.push_str("\n>>>");
    prompt
}
