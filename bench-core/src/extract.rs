//! Request value extraction
//!
//! Every fixture route starts by pulling one attacker-influenceable value out
//! of the request. Three source modes exist:
//!
//! - cookie mode: the URL-decoded value of a fixed cookie name, or a sentinel
//! - parameter-name mode: the *name* of the first parameter whose value
//!   equals a fixed marker string (the attacker controls the captured value
//!   by choosing which parameter name carries the marker)
//! - stream mode: the raw request body bytes
//!
//! Extraction never fails; a value (possibly a fallback constant) is always
//! produced.

use axum::http::{header, HeaderMap};
use percent_encoding::percent_decode_str;

/// Sentinel used when cookie-mode extraction finds no matching cookie.
pub const NO_COOKIE_SENTINEL: &str = "noCookieValueSupplied";

/// One value captured from a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestValue {
    /// A string captured from a cookie or a parameter name
    Text(String),
    /// The raw request body
    Stream(Vec<u8>),
}

/// Cookie-mode extraction: scan the request cookies for `name` and URL-decode
/// the match. Absent cookie yields the fixed sentinel.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> String {
    find_cookie(headers, name).unwrap_or_else(|| NO_COOKIE_SENTINEL.to_string())
}

/// Find a cookie by name, URL-decoded. The remember-me fixtures need
/// presence to be observable, so no sentinel is substituted here.
pub fn find_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    iter_cookies(headers)
        .find(|(cookie_name, _)| *cookie_name == name)
        .map(|(_, value)| url_decode(value))
}

/// Parameter-name-mode extraction over decoded (name, value) pairs. The first
/// pair whose value equals `marker` exactly yields its *name*; no match
/// yields the empty string.
pub fn parameter_name(pairs: &[(String, String)], marker: &str) -> String {
    for (name, value) in pairs {
        if value == marker {
            return name.clone();
        }
    }
    String::new()
}

/// Collect decoded request parameters from the query string and, when the
/// content type is a urlencoded form, from the body. Order is preserved:
/// query parameters first, then form parameters.
pub fn request_pairs(
    query: Option<&str>,
    content_type: Option<&str>,
    body: &[u8],
) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = Vec::new();
    if let Some(query) = query {
        for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
            pairs.push((name.into_owned(), value.into_owned()));
        }
    }
    let is_form = content_type
        .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false);
    if is_form {
        for (name, value) in url::form_urlencoded::parse(body) {
            pairs.push((name.into_owned(), value.into_owned()));
        }
    }
    pairs
}

/// Iterate `name=value` entries across all Cookie headers.
fn iter_cookies(headers: &HeaderMap) -> impl Iterator<Item = (&str, &str)> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|entry| entry.trim().split_once('='))
}

/// URL-decode the way `java.net.URLDecoder` does: `+` is a space, `%XX`
/// escapes are expanded, invalid UTF-8 is replaced rather than rejected.
pub fn url_decode(value: &str) -> String {
    let unplussed = value.replace('+', " ");
    percent_decode_str(&unplussed).decode_utf8_lossy().into_owned()
}
