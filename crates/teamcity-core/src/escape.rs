//! Attribute value escaping for service messages.
//!
//! TeamCity uses `|` as its escape character. A value is trimmed first and
//! then escaped in a single pass, so an inserted `|` is never escaped again.

/// Characters stripped from both ends of a value before escaping.
const TRIMMED: &[char] = &[' ', '\t', '\n', '\r', '\0', '\x0B'];

/// Strip surrounding whitespace. Non-ASCII whitespace is kept.
pub fn trim_value(raw: &str) -> &str {
    raw.trim_matches(TRIMMED)
}

/// Trim surrounding whitespace and escape a value for use inside `'...'`.
pub fn escape_value(raw: &str) -> String {
    let trimmed = trim_value(raw);
    let mut escaped = String::with_capacity(trimmed.len() + 8);
    for ch in trimmed.chars() {
        match ch {
            '|' => escaped.push_str("||"),
            '\'' => escaped.push_str("|'"),
            '\n' => escaped.push_str("|n"),
            '\r' => escaped.push_str("|r"),
            '[' => escaped.push_str("|["),
            ']' => escaped.push_str("|]"),
            other => escaped.push(other),
        }
    }
    escaped
}
