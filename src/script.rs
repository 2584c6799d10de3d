//! Extraction of a runnable script from raw model output.

const FENCE: &str = "```";

/// Returns the script contained in `text`.
///
/// When the whole trimmed text is one fenced block (an opening line of three
/// backticks with an optional language tag and a closing line of three
/// backticks) the trimmed inner text is returned. Anything else is returned
/// trimmed but otherwise verbatim.
pub fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    match fenced_body(trimmed) {
        Some(body) => body.trim().to_string(),
        None => trimmed.to_string(),
    }
}

fn fenced_body(text: &str) -> Option<&str> {
    let rest = text.strip_prefix(FENCE)?;
    let (tag, body) = rest.split_once('\n')?;

    let tag = tag.trim_end_matches('\r');
    if !tag.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }

    let inner = if body == FENCE {
        ""
    } else {
        body.strip_suffix(FENCE)?
            .strip_suffix('\n')
            .map(|s| s.strip_suffix('\r').unwrap_or(s))?
    };

    // A second fence inside means this is not a single block.
    if inner.lines().any(|line| line.trim_start().starts_with(FENCE)) {
        return None;
    }

    Some(inner)
}
