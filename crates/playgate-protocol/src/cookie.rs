//! `Set-Cookie` parsing for the backend session token.
//!
//! The backend hands out its session token as a cookie. Only one value is
//! ever used: the FIRST cookie of the FIRST `Set-Cookie` header. Any other
//! cookies in the response are ignored, even if one of them looks more
//! like a session id.

use crate::ProtocolError;

/// Attribute names that may never be used as a cookie name.
const RESERVED_NAMES: &[&str] = &[
    "comment", "commenturl", "discard", "domain", "expires", "httponly",
    "max-age", "path", "port", "secure", "version",
];

/// The name/value pair of a parsed cookie. Attributes (`Path`, `Expires`,
/// ...) are dropped; the handshake has no use for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
}

/// Returns the session token carried by a response's `Set-Cookie` headers.
///
/// - No headers → `Ok(None)` (the session token is left untouched).
/// - Otherwise the first header is parsed and its first cookie's value is
///   returned, even when more headers follow.
///
/// # Errors
/// Returns [`ProtocolError::InvalidCookie`] when the first header has no
/// parsable cookie.
pub fn session_token_from(
    set_cookies: &[String],
) -> Result<Option<String>, ProtocolError> {
    match set_cookies.first() {
        Some(header) => parse_set_cookie(header).map(|c| Some(c.value)),
        None => Ok(None),
    }
}

/// Parses the first cookie out of one `Set-Cookie` header value.
///
/// A header may carry several comma-separated cookies. Netscape-style
/// headers (the ones with an `Expires=` date, which itself contains a
/// comma) carry exactly one, so they are never split.
pub fn parse_set_cookie(header: &str) -> Result<SessionCookie, ProtocolError> {
    let header = strip_header_name(header.trim());

    let first = if header.to_ascii_lowercase().contains("expires=") {
        header
    } else {
        first_unquoted(header, ',')
    };

    // The name/value pair always comes before the first attribute.
    let pair = first_unquoted(first, ';');
    let (name, value) = pair.split_once('=').ok_or_else(|| {
        ProtocolError::InvalidCookie(format!(
            "no name/value pair in `{pair}`"
        ))
    })?;

    let name = name.trim();
    if !is_valid_name(name) {
        return Err(ProtocolError::InvalidCookie(format!(
            "illegal cookie name `{name}`"
        )));
    }

    Ok(SessionCookie {
        name: name.to_string(),
        value: unquote(value.trim()).to_string(),
    })
}

/// Drops a leading `Set-Cookie:` / `Set-Cookie2:` if the caller passed a
/// full header line instead of just the value.
fn strip_header_name(header: &str) -> &str {
    let lower = header.to_ascii_lowercase();
    for prefix in ["set-cookie2:", "set-cookie:"] {
        if lower.starts_with(prefix) {
            return header[prefix.len()..].trim_start();
        }
    }
    header
}

/// Returns everything before the first `sep` that is not inside double
/// quotes (or the whole string if there is none).
fn first_unquoted(s: &str, sep: char) -> &str {
    let mut quoted = false;
    for (idx, ch) in s.char_indices() {
        match ch {
            '"' => quoted = !quoted,
            c if c == sep && !quoted => return &s[..idx],
            _ => {}
        }
    }
    s
}

fn unquote(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// An RFC 2616 token that is not an attribute name and doesn't start
/// with `$`.
fn is_valid_name(name: &str) -> bool {
    if name.is_empty() || name.starts_with('$') {
        return false;
    }
    if RESERVED_NAMES.contains(&name.to_ascii_lowercase().as_str()) {
        return false;
    }
    name.chars().all(|c| {
        c.is_ascii()
            && !c.is_ascii_control()
            && !" \t()<>@,;:\\\"/[]?={}".contains(c)
    })
}
