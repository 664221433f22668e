// src/persona/mod.rs
// Built-in persona used when a chat request carries no system prompt.

pub mod default;

pub use default::DEFAULT_PERSONA_PROMPT;

/// Pick the system prompt for a request: the caller's prompt if it has any
/// content, otherwise `fallback`.
pub fn resolve_system_prompt<'a>(requested: Option<&'a str>, fallback: &'a str) -> &'a str {
    match requested {
        Some(prompt) if !prompt.trim().is_empty() => prompt,
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_prompt_wins() {
        assert_eq!(resolve_system_prompt(Some("Be brief."), DEFAULT_PERSONA_PROMPT), "Be brief.");
    }

    #[test]
    fn test_missing_or_blank_prompt_falls_back() {
        assert_eq!(resolve_system_prompt(None, "fallback"), "fallback");
        assert_eq!(resolve_system_prompt(Some(""), "fallback"), "fallback");
        assert_eq!(resolve_system_prompt(Some("   "), "fallback"), "fallback");
    }
}
