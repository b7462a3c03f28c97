//! Defensive cleanup of untrusted catalog strings.
//!
//! Every function here is total: any input degrades to a trimmed string or
//! to empty, never to an error. A malformed value in a URL-typed output
//! field is strictly worse than an empty one for the rendering layer, so
//! [`clean_url`] rejects anything that does not carry an `http`/`https`
//! scheme after cleanup.

use crate::types::LooseValue;

/// Collapses every run of whitespace (including newlines and tabs) to a
/// single space and trims the ends.
#[must_use]
pub fn clean_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Renders a loosely-typed field as a trimmed, whitespace-collapsed string.
///
/// Missing values, `null`, and non-scalar junk all become the empty string;
/// numbers and booleans render with their JSON representation.
#[must_use]
pub fn clean_string(value: Option<&LooseValue>) -> String {
    match value {
        None => String::new(),
        Some(LooseValue::Text(s)) => clean_text(s),
        Some(LooseValue::Number(n)) => clean_text(&n.to_string()),
        Some(LooseValue::Bool(b)) => b.to_string(),
        Some(LooseValue::Other(_)) => String::new(),
    }
}

/// Renders a loosely-typed field as either an absolute `http`/`https` URL
/// or the empty string.
///
/// Upstream data has been observed with URLs accidentally wrapped in
/// array-literal brackets (`"[https://…]"`) and in stray double or single
/// quotes; those wrappers are stripped before the scheme check. The check is
/// case-insensitive on the scheme only; the rest of the URL is returned
/// unchanged.
#[must_use]
pub fn clean_url(value: Option<&LooseValue>) -> String {
    let cleaned = clean_string(value);
    let stripped = cleaned
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim_matches('"')
        .trim_matches('\'');

    if has_http_scheme(stripped) {
        stripped.to_string()
    } else {
        String::new()
    }
}

/// `true` when `s` starts with `http://` or `https://`, ASCII
/// case-insensitively.
fn has_http_scheme(s: &str) -> bool {
    // str::get returns None on a non-char-boundary index, which can only
    // happen when the prefix is not ASCII and therefore not a scheme.
    s.get(..7).is_some_and(|p| p.eq_ignore_ascii_case("http://"))
        || s.get(..8).is_some_and(|p| p.eq_ignore_ascii_case("https://"))
}

#[cfg(test)]
#[path = "sanitize_test.rs"]
mod tests;
