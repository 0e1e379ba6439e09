use once_cell::sync::Lazy;
use regex::Regex;

static CODE_FENCE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[a-zA-Z0-9_-]*\s*(.*?)\s*```$").unwrap());

static MULTIPLE_NEWLINES_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Cleans a model completion by removing common wrapper artifacts
pub fn clean_llm_response(response: &str) -> String {
    let mut cleaned = response.trim().to_string();

    // Unwrap ```lang ... ``` fenced answers
    if let Some(caps) = CODE_FENCE_PATTERN.captures(&cleaned) {
        cleaned = caps[1].to_string();
    }

    // Models often quote a one-line answer
    if cleaned.len() >= 2 && cleaned.starts_with('"') && cleaned.ends_with('"') {
        cleaned = cleaned[1..cleaned.len() - 1].trim().to_string();
    }

    // Collapse multiple consecutive newlines into at most two
    cleaned = MULTIPLE_NEWLINES_PATTERN
        .replace_all(&cleaned, "\n\n")
        .to_string();

    cleaned.trim().to_string()
}
