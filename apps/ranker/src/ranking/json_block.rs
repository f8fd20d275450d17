//! Locates the JSON object inside free-form model output.
//!
//! Models often wrap the object in prose or code fences. The scan starts at
//! the first `{` and walks to its matching `}`, skipping braces inside string
//! literals, so nested objects come back whole. If the braces never balance
//! it falls back to the first `}` after the opening brace.

/// Returns the first brace-delimited block in `text`, if any.
pub fn extract_json_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let rest = &text[start..];

    balanced_end(rest)
        .or_else(|| rest.find('}'))
        .map(|end| &rest[..=end])
}

/// Byte offset of the `}` closing the object that opens at `text[0]`.
fn balanced_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}
