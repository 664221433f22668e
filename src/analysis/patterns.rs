// src/analysis/patterns.rs
// Regex scans for medications, diagnoses and dates. Hits are passed to the
// model as hints alongside the document text.

use once_cell::sync::Lazy;
use regex::Regex;

static MEDICATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:prescribed|recommended|take|using)\s+([a-z][a-z ]*(?:\d+\s?mg)?)")
        .expect("valid regex")
});

static DIAGNOSIS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:diagnosed(?:\s+with)?|diagnosis(?:\s+of)?|condition|suffering from)\s+([a-z][a-z ]*)")
        .expect("valid regex")
});

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{1,2}[-/]\d{1,2}[-/]\d{2,4}\b").expect("valid regex"));

fn captures(re: &Regex, text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for caps in re.captures_iter(text) {
        let hit = caps[1].trim();
        if !hit.is_empty() && !found.iter().any(|f| f == hit) {
            found.push(hit.to_string());
        }
    }
    found
}

pub fn extract_medications(text: &str) -> Vec<String> {
    captures(&MEDICATION_RE, text)
}

pub fn extract_diagnoses(text: &str) -> Vec<String> {
    captures(&DIAGNOSIS_RE, text)
}

pub fn extract_dates(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for m in DATE_RE.find_iter(text) {
        if !found.iter().any(|f| f == m.as_str()) {
            found.push(m.as_str().to_string());
        }
    }
    found
}
