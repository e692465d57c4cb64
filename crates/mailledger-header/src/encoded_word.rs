//! RFC 2047 encoded-words.
//!
//! Format: `=?charset?encoding?encoded-text?=`
//!
//! Encoding always produces `UTF-8` with the `Q` encoding. Decoding accepts
//! both `Q` and `B`, and the `UTF-8`, `US-ASCII` and `ISO-8859-1` charsets.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::borrow::Cow;
use std::fmt;
use std::fmt::Write as _;

/// Maximum length of a single encoded-word (RFC 2047 §2).
pub const MAX_ENCODED_WORD_LENGTH: usize = 75;

const UTF8_Q_PREFIX: &str = "=?UTF-8?Q?";
const SUFFIX: &str = "?=";

/// Character set a display string needed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Encoding {
    /// Pure 7-bit ASCII, emitted as-is.
    #[default]
    Ascii,
    /// Non-ASCII text, emitted as `=?UTF-8?Q?...?=`.
    Utf8,
}

impl Encoding {
    /// Detects which encoding `text` needs.
    #[must_use]
    pub fn detect(text: &str) -> Self {
        if text.is_ascii() { Self::Ascii } else { Self::Utf8 }
    }

    /// Returns the encoding label (`"ASCII"` or `"UTF-8"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ascii => "ASCII",
            Self::Utf8 => "UTF-8",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encodes a display string for use in a header.
///
/// ASCII text comes back unchanged with [`Encoding::Ascii`]. Anything else
/// is Q-encoded as UTF-8 octets and returned with [`Encoding::Utf8`]. Long
/// text is split over several encoded-words separated by a single space;
/// a multi-byte character is never split across two words.
///
/// The output never contains CR or LF: input line breaks are rejected by
/// the callers before encoding.
#[must_use]
pub fn encode(text: &str) -> (Cow<'_, str>, Encoding) {
    let encoding = Encoding::detect(text);
    if encoding == Encoding::Ascii {
        return (Cow::Borrowed(text), encoding);
    }
    (Cow::Owned(encode_words(text)), encoding)
}

/// Q-encodes `text` as `UTF-8` encoded-words even if it is pure ASCII.
///
/// Used when ASCII text would not survive a decode unchanged, e.g. text
/// that already looks like an encoded-word or has edge whitespace.
#[must_use]
pub fn encode_words(text: &str) -> String {
    let max_payload = MAX_ENCODED_WORD_LENGTH - UTF8_Q_PREFIX.len() - SUFFIX.len();
    let mut words: Vec<String> = Vec::new();
    let mut payload = String::new();
    let mut buf = [0u8; 4];

    for ch in text.chars() {
        let chunk = encode_q_char(ch, &mut buf);
        if !payload.is_empty() && payload.len() + chunk.len() > max_payload {
            words.push(wrap_q(&payload));
            payload.clear();
        }
        payload.push_str(&chunk);
    }
    if !payload.is_empty() {
        words.push(wrap_q(&payload));
    }

    words.join(" ")
}

fn wrap_q(payload: &str) -> String {
    format!("{UTF8_Q_PREFIX}{payload}{SUFFIX}")
}

/// Q-encodes a single character.
fn encode_q_char(ch: char, buf: &mut [u8; 4]) -> String {
    let mut out = String::new();
    for &byte in ch.encode_utf8(buf).as_bytes() {
        match byte {
            b' ' => out.push('_'),
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'!' | b'*' | b'+' | b'-' | b'/' => {
                out.push(char::from(byte));
            }
            _ => {
                let _ = write!(out, "={byte:02X}");
            }
        }
    }
    out
}

/// Splits an encoded-word into `(charset, encoding, payload)`.
fn split_encoded_word(token: &str) -> Option<(&str, &str, &str)> {
    let inner = token.strip_prefix("=?")?.strip_suffix(SUFFIX)?;
    let mut parts = inner.split('?');
    let charset = parts.next()?;
    let encoding = parts.next()?;
    let payload = parts.next()?;
    if parts.next().is_some() || charset.is_empty() || encoding.is_empty() {
        return None;
    }
    Some((charset, encoding, payload))
}

/// Returns true if `token` has the shape of an encoded-word.
#[must_use]
pub fn is_encoded_word(token: &str) -> bool {
    split_encoded_word(token).is_some()
}

/// Decodes a single token.
///
/// Tokens that are not encoded-words pass through unchanged.
///
/// # Errors
///
/// Returns an error if the token is an encoded-word with an unknown
/// encoding or charset, or a malformed payload.
pub fn decode(token: &str) -> Result<Cow<'_, str>> {
    let Some((charset, encoding, payload)) = split_encoded_word(token) else {
        return Ok(Cow::Borrowed(token));
    };

    let bytes = if encoding.eq_ignore_ascii_case("Q") {
        decode_q(payload)?
    } else if encoding.eq_ignore_ascii_case("B") {
        STANDARD.decode(payload)?
    } else {
        return Err(Error::InvalidEncoding("unknown encoding"));
    };

    decode_charset(charset, bytes).map(Cow::Owned)
}

/// Decodes every encoded-word in a header value.
///
/// Whitespace between two adjacent encoded-words is dropped (RFC 2047
/// §6.2); all other text and whitespace is kept.
///
/// # Errors
///
/// Returns an error if any encoded-word fails to decode.
pub fn decode_value(text: &str) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut prev_encoded = false;

    loop {
        let ws_end = rest
            .find(|c: char| !c.is_ascii_whitespace())
            .unwrap_or(rest.len());
        let (ws, tail) = rest.split_at(ws_end);
        if tail.is_empty() {
            out.push_str(ws);
            break;
        }

        let word_end = tail
            .find(|c: char| c.is_ascii_whitespace())
            .unwrap_or(tail.len());
        let (word, tail) = tail.split_at(word_end);
        rest = tail;

        if is_encoded_word(word) {
            if !prev_encoded {
                out.push_str(ws);
            }
            out.push_str(&decode(word)?);
            prev_encoded = true;
        } else {
            out.push_str(ws);
            out.push_str(word);
            prev_encoded = false;
        }
    }

    Ok(out)
}

fn decode_q(payload: &str) -> Result<Vec<u8>> {
    let bytes = payload.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'_' => out.push(b' '),
            b'=' => {
                let (Some(&hi), Some(&lo)) = (bytes.get(i + 1), bytes.get(i + 2)) else {
                    return Err(Error::InvalidEncoding("incomplete escape sequence"));
                };
                let (Some(hi), Some(lo)) = (hex_value(hi), hex_value(lo)) else {
                    return Err(Error::InvalidEncoding("invalid hex escape"));
                };
                out.push((hi << 4) | lo);
                i += 2;
            }
            b @ 0x21..=0x7E => out.push(b),
            _ => return Err(Error::InvalidEncoding("invalid character in Q payload")),
        }
        i += 1;
    }

    Ok(out)
}

const fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

fn decode_charset(charset: &str, bytes: Vec<u8>) -> Result<String> {
    // RFC 2231 language suffix: `UTF-8*en`
    let charset = charset.split_once('*').map_or(charset, |(cs, _)| cs);

    if charset.eq_ignore_ascii_case("utf-8") || charset.eq_ignore_ascii_case("utf8") {
        Ok(String::from_utf8(bytes)?)
    } else if charset.eq_ignore_ascii_case("us-ascii") || charset.eq_ignore_ascii_case("ascii") {
        if !bytes.is_ascii() {
            return Err(Error::InvalidEncoding("non-ASCII byte in US-ASCII word"));
        }
        Ok(String::from_utf8(bytes)?)
    } else if charset.eq_ignore_ascii_case("iso-8859-1") || charset.eq_ignore_ascii_case("latin1")
    {
        Ok(bytes.into_iter().map(char::from).collect())
    } else {
        Err(Error::InvalidEncoding("unsupported charset"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use proptest::prelude::*;

    #[test]
    fn test_encode_ascii_unchanged() {
        let (encoded, encoding) = encode("foo bar");
        assert_eq!(encoded, "foo bar");
        assert!(matches!(encoded, Cow::Borrowed(_)));
        assert_eq!(encoding, Encoding::Ascii);
        assert_eq!(encoding.as_str(), "ASCII");
    }

    #[test]
    fn test_encode_utf8() {
        let (encoded, encoding) = encode("ázÁZ09");
        assert_eq!(encoded, "=?UTF-8?Q?=C3=A1z=C3=81Z09?=");
        assert_eq!(encoding, Encoding::Utf8);
        assert_eq!(encoding.to_string(), "UTF-8");
    }

    #[test]
    fn test_encode_space_as_underscore() {
        let (encoded, _) = encode("Jürgen Müller");
        assert_eq!(encoded, "=?UTF-8?Q?J=C3=BCrgen_M=C3=BCller?=");
    }

    #[test]
    fn test_encode_escapes_specials() {
        let (encoded, _) = encode("é_=?");
        assert_eq!(encoded, "=?UTF-8?Q?=C3=A9=5F=3D=3F?=");
    }

    #[test]
    fn test_encode_words_forces_ascii() {
        assert_eq!(encode_words("=?UTF-8?Q?hi?="), "=?UTF-8?Q?=3D=3FUTF-8=3FQ=3Fhi=3F=3D?=");
        assert_eq!(decode_value(&encode_words("  padded  ")).unwrap(), "  padded  ");
        assert_eq!(encode_words(""), "");
    }

    #[test]
    fn test_encode_splits_long_text() {
        let name = "日本語".repeat(10);
        let (encoded, _) = encode(&name);
        let words: Vec<&str> = encoded.split(' ').collect();
        assert!(words.len() > 1);
        for word in &words {
            assert!(word.len() <= MAX_ENCODED_WORD_LENGTH);
            assert!(is_encoded_word(word));
        }
        assert_eq!(decode_value(&encoded).unwrap(), name);
    }

    #[test]
    fn test_decode_passthrough() {
        assert_eq!(decode("Hello").unwrap(), "Hello");
        assert_eq!(decode("=?broken").unwrap(), "=?broken");
    }

    #[test]
    fn test_decode_q() {
        assert_eq!(decode("=?UTF-8?Q?=C3=A1z=C3=81Z09?=").unwrap(), "ázÁZ09");
        assert_eq!(decode("=?utf-8?q?H=c3=a9llo_World?=").unwrap(), "Héllo World");
    }

    #[test]
    fn test_decode_b() {
        assert_eq!(decode("=?utf-8?B?SMOpbGxv?=").unwrap(), "Héllo");
    }

    #[test]
    fn test_decode_latin1() {
        assert_eq!(decode("=?ISO-8859-1?Q?Andr=E9?=").unwrap(), "André");
    }

    #[test]
    fn test_decode_errors() {
        for bad in [
            "=?UTF-8?Q?=C?=",
            "=?UTF-8?Q?=ZZ?=",
            "=?UTF-8?X?abc?=",
            "=?KOI8-R?Q?abc?=",
            "=?UTF-8?Q?=FF?=",
            "=?US-ASCII?Q?=E9?=",
        ] {
            let err = decode(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Encoding, "{bad:?}");
        }
    }

    #[test]
    fn test_decode_value_joins_adjacent_words() {
        let value = "=?UTF-8?Q?Andr=C3=A9?= =?UTF-8?Q?_Pirard?= <pirard@example.org>";
        assert_eq!(
            decode_value(value).unwrap(),
            "André Pirard <pirard@example.org>"
        );
    }

    #[test]
    fn test_decode_value_keeps_plain_text() {
        assert_eq!(decode_value("  plain  text ").unwrap(), "  plain  text ");
        assert_eq!(
            decode_value("Hi =?UTF-8?Q?J=C3=BCrgen?= there").unwrap(),
            "Hi Jürgen there"
        );
    }

    #[test]
    fn test_encoded_output_never_has_line_breaks() {
        let (encoded, _) = encode("ä\u{2028}ö");
        assert!(!encoded.contains('\r'));
        assert!(!encoded.contains('\n'));
    }

    proptest! {
        #[test]
        fn prop_encode_decode_round_trip(text in "[^\r\n]{0,120}") {
            let (encoded, encoding) = encode(&text);
            prop_assert_eq!(encoding, Encoding::detect(&text));
            if encoding == Encoding::Utf8 {
                prop_assert!(encoded.is_ascii());
                prop_assert_eq!(decode_value(&encoded).unwrap(), text);
            } else {
                prop_assert_eq!(&*encoded, text.as_str());
            }
        }
    }
}
