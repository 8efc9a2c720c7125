//! Locating JSON object spans inside free-form model output.

/// Find every top-level `{...}` span in `text`, in order of appearance.
///
/// Braces are matched by depth, and braces inside JSON string literals
/// (including escaped quotes) do not count. Prose, markdown fences and anything
/// else outside a balanced span is discarded. An opening brace that never
/// closes is skipped and scanning resumes right after it, so a complete object
/// nested behind a stray `{` is still found.
pub fn object_spans(text: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find('{') {
        let start = cursor + offset;
        match matching_brace(&text[start..]) {
            Some(end) => {
                spans.push(&text[start..=start + end]);
                cursor = start + end + 1;
            }
            None => cursor = start + 1,
        }
    }

    spans
}

/// Byte offset of the brace closing the one at offset 0, if any.
fn matching_brace(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, byte) in text.bytes().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}
