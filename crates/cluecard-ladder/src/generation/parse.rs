//! Parsing raw generator output into candidate clues.

use cluecard_core::error::GenerationError;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ClueBlob {
    clues: Vec<String>,
}

/// Extracts the first balanced `{...}` object from `raw`, tolerating prose
/// around it. Braces inside JSON strings are ignored.
#[must_use]
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parses `{"clues": [...]}` out of `raw` and checks it has `expected`
/// entries.
///
/// # Errors
///
/// Returns `GenerationError::MalformedResponse` when no object is found, it
/// does not deserialize, or the clue count is wrong.
pub fn parse_clues(raw: &str, expected: usize) -> Result<Vec<String>, GenerationError> {
    let json = extract_json_object(raw).ok_or_else(|| {
        GenerationError::MalformedResponse("no JSON object in response".to_owned())
    })?;

    let blob: ClueBlob = serde_json::from_str(json)
        .map_err(|e| GenerationError::MalformedResponse(format!("invalid clue JSON: {e}")))?;

    if blob.clues.len() != expected {
        return Err(GenerationError::MalformedResponse(format!(
            "expected {expected} clues, got {}",
            blob.clues.len()
        )));
    }

    Ok(blob.clues.into_iter().map(|c| c.trim().to_owned()).collect())
}

/// Truncates `text` to at most `max_words` whitespace-separated words.
#[must_use]
pub fn clamp_words(text: &str, max_words: usize) -> String {
    text.split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}
