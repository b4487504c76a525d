//! Identifier escaping shared by every token that writes a bare field name.

use std::borrow::Cow;

/// Words the query parser treats as keywords; fields with these names must be quoted.
const RESERVED_KEYWORDS: &[&str] = &["as", "select", "where", "load", "group", "order", "include"];

/// Escape a field name or dotted path for the query text.
///
/// Each `.`-separated segment is quoted on its own when it is a reserved
/// keyword or contains characters outside `[A-Za-z0-9_]`. Quoting wraps the
/// segment in single quotes and doubles any quote inside it. Server
/// pseudo-fields such as `id()` pass through untouched.
pub fn escape_field(name: &str) -> Cow<'_, str> {
    if is_pseudo_field(name) {
        return Cow::Borrowed(name);
    }

    if !name.split('.').any(segment_needs_quotes) {
        return Cow::Borrowed(name);
    }

    let escaped = name
        .split('.')
        .map(|segment| {
            if segment_needs_quotes(segment) {
                quote(segment)
            } else {
                segment.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(".");
    Cow::Owned(escaped)
}

/// Append an escaped field name to `out`.
pub(crate) fn write_field(out: &mut String, name: &str) {
    out.push_str(&escape_field(name));
}

/// Wrap `value` in single quotes, doubling quotes inside it.
pub(crate) fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn segment_needs_quotes(segment: &str) -> bool {
    segment.is_empty()
        || RESERVED_KEYWORDS
            .iter()
            .any(|kw| kw.eq_ignore_ascii_case(segment))
        || !segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// `id()`, `key()`, `score()` and friends
fn is_pseudo_field(name: &str) -> bool {
    match name.strip_suffix("()") {
        Some(head) => {
            !head.is_empty() && head.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    }
}
