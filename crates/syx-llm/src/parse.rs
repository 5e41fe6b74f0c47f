//! Extraction of JSON objects from prose-wrapped model output.
//!
//! Models frequently wrap the requested JSON in explanation text or a fenced
//! code block. The stage retry loop treats anything this module cannot
//! recover as a parse failure, so recovery here directly saves attempts.

/// Extract the first JSON object from raw model output.
///
/// Tried in order:
/// 1. the whole text as JSON
/// 2. the body of the first ```json (or plain ```) fenced block
/// 3. brace matching from the first `{`
///
/// Returns `None` when no candidate parses.
#[must_use]
pub fn extract_json(text: &str) -> Option<serde_json::Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str(trimmed) {
        return Some(value);
    }

    if let Some(inner) = fenced_block(trimmed) {
        if let Ok(value) = serde_json::from_str(inner.trim()) {
            return Some(value);
        }
    }

    balanced_object(trimmed).and_then(|candidate| serde_json::from_str(candidate).ok())
}

/// The body of the first fenced code block, if any.
fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after_fence = &text[start + 3..];
    // Skip an optional language tag on the fence line.
    let body_start = after_fence.find('\n')? + 1;
    let body = &after_fence[body_start..];
    let end = body.find("```")?;
    Some(&body[..end])
}

/// The first brace-balanced `{...}` span, ignoring braces inside strings.
fn balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                '\\' if !escaped => escaped = true,
                '"' if !escaped => in_string = false,
                _ => escaped = false,
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}
