//! Character-class checks for header names, values, and parameters.
//!
//! These run before any parsing so that CR/LF smuggling is rejected
//! at the edge instead of being sanitized later.

use crate::error::{Error, Result};

/// RFC 2045 `tspecials`. A token is printable ASCII minus these.
const TSPECIALS: &[u8] = b"()<>@,;:\\\"/[]?=";

/// Returns true if `name` is a valid RFC 5322 field name.
///
/// A field name is one or more printable ASCII characters other than
/// the colon. Whitespace and control characters are never allowed.
#[must_use]
pub fn is_valid_header_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| (0x21..=0x7E).contains(&b) && b != b':')
}

/// Validates a header field name.
///
/// # Errors
///
/// Returns [`Error::InvalidHeaderName`] if the name is empty or contains
/// whitespace, a colon, CR/LF, or any non-printable character.
pub fn validate_header_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidHeaderName("empty field name"));
    }
    if !is_valid_header_name(name) {
        return Err(Error::InvalidHeaderName(
            "field name contains whitespace, colon, or control characters",
        ));
    }
    Ok(())
}

/// Validates a raw (possibly folded) header field value.
///
/// The only line breaks allowed are folds: CRLF immediately followed by a
/// space or tab. Bare CR, bare LF, and CRLF followed by anything else are
/// rejected. Raw values must be 7-bit; non-ASCII text has to arrive as
/// encoded-words.
///
/// # Errors
///
/// Returns [`Error::InvalidHeaderValue`] on any violation.
pub fn validate_field_value(raw: &str) -> Result<()> {
    let bytes = raw.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\r' => {
                if bytes.get(i + 1) != Some(&b'\n') {
                    return Err(Error::InvalidHeaderValue("bare CR"));
                }
                if !matches!(bytes.get(i + 2), Some(b' ' | b'\t')) {
                    return Err(Error::InvalidHeaderValue(
                        "CRLF not followed by folding whitespace",
                    ));
                }
                i += 3;
                continue;
            }
            b'\n' => return Err(Error::InvalidHeaderValue("bare LF")),
            b'\t' | 0x20..=0x7E => {}
            0x80..=0xFF => return Err(Error::InvalidHeaderValue("non-ASCII character")),
            _ => return Err(Error::InvalidHeaderValue("control character")),
        }
        i += 1;
    }

    Ok(())
}

/// Returns true if `value` contains a CR or LF anywhere.
#[must_use]
pub fn contains_line_break(value: &str) -> bool {
    value.bytes().any(|b| b == b'\r' || b == b'\n')
}

/// Returns true if `b` may appear in an RFC 2045 token.
#[must_use]
pub const fn is_token_char(b: u8) -> bool {
    if b < 0x21 || b > 0x7E {
        return false;
    }
    let mut i = 0;
    while i < TSPECIALS.len() {
        if TSPECIALS[i] == b {
            return false;
        }
        i += 1;
    }
    true
}

/// Returns true if `s` is a non-empty RFC 2045 token.
#[must_use]
pub fn is_token(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(is_token_char)
}

/// Validates a parameter name.
///
/// # Errors
///
/// Returns [`Error::InvalidParameterName`] if the name is empty, contains
/// CR/LF, or is not a token.
pub fn validate_parameter_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidParameterName("empty parameter name"));
    }
    if contains_line_break(name) {
        return Err(Error::InvalidParameterName("contains CR or LF"));
    }
    if !is_token(name) {
        return Err(Error::InvalidParameterName("not a token"));
    }
    Ok(())
}

/// Validates a parameter value.
///
/// Values are emitted as quoted-strings, so anything printable is fine,
/// including `;` and `=`. Line breaks and other control characters are not.
///
/// # Errors
///
/// Returns [`Error::InvalidParameterValue`] on CR/LF or non-printable input.
pub fn validate_parameter_value(value: &str) -> Result<()> {
    if contains_line_break(value) {
        return Err(Error::InvalidParameterValue("contains CR or LF"));
    }
    if !value
        .bytes()
        .all(|b| b == b'\t' || (0x20..=0x7E).contains(&b))
    {
        return Err(Error::InvalidParameterValue(
            "contains non-printable or non-ASCII characters",
        ));
    }
    Ok(())
}

/// Validates a `type/subtype` media type.
///
/// # Errors
///
/// Returns [`Error::InvalidHeaderValue`] if the value is empty, contains
/// whitespace or CR/LF, or is not two tokens joined by `/`.
pub fn validate_media_type(media_type: &str) -> Result<()> {
    if media_type.is_empty() {
        return Err(Error::InvalidHeaderValue("empty media type"));
    }
    if media_type.bytes().any(|b| b.is_ascii_whitespace()) {
        return Err(Error::InvalidHeaderValue("media type contains whitespace"));
    }
    match media_type.split_once('/') {
        Some((main, sub)) if is_token(main) && is_token(sub) => Ok(()),
        _ => Err(Error::InvalidHeaderValue(
            "media type must be type/subtype",
        )),
    }
}

/// Wraps `s` in double quotes, escaping `"` and `\` (RFC 5322 quoted-string).
#[must_use]
pub fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

/// Strips the quotes from a quoted-string and resolves quoted-pairs.
///
/// Returns `None` if `s` is not exactly one well-formed quoted-string.
#[must_use]
pub fn unquote_string(s: &str) -> Option<String> {
    let inner = s.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => out.push(chars.next()?),
            '"' => return None,
            _ => out.push(ch),
        }
    }

    Some(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_header_names() {
        assert!(validate_header_name("Content-Type").is_ok());
        assert!(validate_header_name("X-Custom_1").is_ok());

        for bad in ["", "Content-Type ", "Content Type", "Sender\r\n", "Sen:der", "\tSubject"] {
            let err = validate_header_name(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::HeaderName, "{bad:?}");
        }
    }

    #[test]
    fn test_field_value_folds() {
        assert!(validate_field_value("text/html").is_ok());
        assert!(validate_field_value("text/html;\r\n level=1").is_ok());
        assert!(validate_field_value("text/html;\r\n\tlevel=1").is_ok());
        assert!(validate_field_value("a\r\n b\r\n c").is_ok());
    }

    #[test]
    fn test_field_value_rejects_injection() {
        for bad in [
            "text/html;\nlevel=1",
            "text/html\r\n;level=1",
            "text/html;\r\nlevel=1\r\nq=0.1",
            "<foo@bar>\n",
            "<foo@bar>\r\n",
            "<foo@bar>\r\n\r\n",
            "<foo\r\n@\r\nbar>",
            "foo\rbar",
        ] {
            let err = validate_field_value(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::HeaderValue, "{bad:?}");
        }
    }

    #[test]
    fn test_field_value_rejects_non_ascii() {
        assert!(validate_field_value("ázÁZ09 <foo@bar>").is_err());
        assert!(validate_field_value("a\0b").is_err());
    }

    #[test]
    fn test_tokens() {
        assert!(is_token("charset"));
        assert!(is_token("x-unit-test"));
        assert!(!is_token(""));
        assert!(!is_token("a b"));
        assert!(!is_token("a=b"));
        assert!(!is_token("a;b"));
    }

    #[test]
    fn test_parameter_name() {
        assert!(validate_parameter_name("boundary").is_ok());
        let err = validate_parameter_name("b\r\na\rr\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParameterName);
        assert!(validate_parameter_name("").is_err());
        assert!(validate_parameter_name("a=b").is_err());
    }

    #[test]
    fn test_parameter_value() {
        assert!(validate_parameter_value("Apple-Mail=_1B852F10; x").is_ok());
        let err = validate_parameter_value("\nbar\r\nbaz\r").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParameterValue);
        assert!(validate_parameter_value("caf\u{e9}").is_err());
    }

    #[test]
    fn test_media_type() {
        assert!(validate_media_type("application/rss+xml").is_ok());
        assert!(validate_media_type("application/vnd.ms-excel").is_ok());
        assert!(validate_media_type("text").is_err());
        assert!(validate_media_type("text/ html").is_err());
        assert!(validate_media_type("text/html\r\n").is_err());
        assert!(validate_media_type("/html").is_err());
    }

    #[test]
    fn test_quoted_strings() {
        assert_eq!(quote_string("a \"b\" \\c"), r#""a \"b\" \\c""#);
        assert_eq!(unquote_string(r#""a \"b\" \\c""#).unwrap(), "a \"b\" \\c");
        assert_eq!(unquote_string(r#""""#).unwrap(), "");
        assert!(unquote_string("\"").is_none());
        assert!(unquote_string(r#""a"b""#).is_none());
        assert!(unquote_string(r#""a\""#).is_none());
        assert!(unquote_string("plain").is_none());
    }
}
