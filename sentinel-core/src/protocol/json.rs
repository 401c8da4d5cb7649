//! Balanced-brace extraction of the JSON object embedded in a block body.
//!
//! Block bodies may carry whitespace and newlines around the payload, and the
//! payload's string values may themselves contain `{` and `}` characters.
//! A greedy first-`{`/last-`}` match would mis-extract those, so we scan with
//! a brace depth counter that is aware of JSON string literals and escapes.

/// Return the first top-level-balanced `{...}` substring of `body`, or `None`
/// if no complete object is present.
pub(super) fn extract_object(body: &str) -> Option<&str> {
    let start = body.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in body[start..].char_indices() {
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
                    return Some(&body[start..start + i + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}
