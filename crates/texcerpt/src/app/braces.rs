//! Brace-group matching for LaTeX arguments.

/// Byte length of the balanced `{...}` group at the start of `text`, braces included.
///
/// Escaped braces (`\{`, `\}`) do not count towards nesting. Returns `None` when `text` does not
/// start with `{` or the group is never closed.
pub fn group_len(text: &str) -> Option<usize> {
    if !text.starts_with('{') {
        return None;
    }
    let mut depth = 0usize;
    let mut chars = text.char_indices();
    while let Some((idx, ch)) = chars.next() {
        match ch {
            '\\' => {
                chars.next();
            }
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Contents of the balanced group at the start of `text` and the text following it.
pub fn split_group(text: &str) -> Option<(&str, &str)> {
    let len = group_len(text)?;
    Some((&text[1..len - 1], &text[len..]))
}
