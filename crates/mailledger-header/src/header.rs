//! Header abstraction shared by every header variant.
//!
//! Parsing a header line always runs the same stages:
//!
//! ```text
//! split name/value -> validate name -> validate value -> unfold
//!     -> field-specific parse -> decode display names -> done
//! ```
//!
//! Any failing stage rejects the whole line. Nothing is retried and no
//! partially populated header is ever returned.

use crate::encoded_word::{self, Encoding};
use crate::error::{Error, Result};
use crate::folding::unfold;
use crate::grammar::{contains_line_break, validate_field_value, validate_header_name};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Contract implemented by every header variant.
///
/// `Display` renders the full wire line (`Name: value`, folded where the
/// variant folds), without a trailing CRLF.
pub trait Header: fmt::Display + Sized {
    /// Parses a complete raw header line such as `Sender: <foo@bar>`.
    ///
    /// # Errors
    ///
    /// Returns an error naming the violated category if the line is not
    /// a valid header of this kind.
    fn parse(raw: &str) -> Result<Self>;

    /// Returns the field name, e.g. `Content-Type`.
    fn field_name(&self) -> &str;

    /// Returns the logical (unfolded, decoded) field value.
    fn field_value(&self) -> String;

    /// Returns the wire form of this header.
    fn to_header_line(&self) -> String {
        self.to_string()
    }
}

/// Stage of the header-line parser, recorded when a line is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParseStage {
    SplitNameValue,
    ValidateName,
    ValidateValue,
    FieldSpecific,
    DecodeDisplayNames,
}

/// Logs a rejection and hands the error back. The raw input is not logged.
pub(crate) fn rejected(header: &str, stage: ParseStage, err: Error) -> Error {
    tracing::debug!(header, ?stage, kind = %err.kind(), "rejected header line");
    err
}

/// A header line split into its field name and unfolded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHeader<'a> {
    /// Field name as written.
    pub name: &'a str,
    /// Field value with folds collapsed and leading whitespace removed.
    pub value: Cow<'a, str>,
}

impl RawHeader<'_> {
    /// Checks the field name against `expected`, ignoring ASCII case.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHeaderName`] on mismatch.
    pub fn expect_name(&self, expected: &'static str) -> Result<()> {
        if self.name.eq_ignore_ascii_case(expected) {
            Ok(())
        } else {
            Err(rejected(
                expected,
                ParseStage::ValidateName,
                Error::InvalidHeaderName("unexpected field name"),
            ))
        }
    }
}

/// Splits a raw header line on the first colon, validates both halves,
/// and unfolds the value.
///
/// # Errors
///
/// Returns [`Error::InvalidHeaderName`] if there is no colon or the name is
/// invalid, and [`Error::InvalidHeaderValue`] if the value breaks the
/// folding grammar.
pub fn split_header_line(raw: &str) -> Result<RawHeader<'_>> {
    let Some((name, value)) = raw.split_once(':') else {
        return Err(rejected(
            "",
            ParseStage::SplitNameValue,
            Error::InvalidHeaderName("missing colon"),
        ));
    };

    validate_header_name(name).map_err(|e| rejected("", ParseStage::ValidateName, e))?;

    let value = value.trim_start_matches([' ', '\t']);
    validate_field_value(value).map_err(|e| rejected(name, ParseStage::ValidateValue, e))?;

    tracing::trace!(header = name, "split header line");
    Ok(RawHeader {
        name,
        value: unfold(value),
    })
}

/// Any header, stored as a name and a decoded, unfolded value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GenericHeader {
    name: String,
    value: String,
}

impl GenericHeader {
    /// Creates a header from a name and a logical value.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or the value contains CR/LF
    /// or other control characters.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let value = value.into();
        validate_header_name(&name)?;
        validate_logical_value(&value)?;
        Ok(Self { name, value })
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the decoded value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns whether the value needs encoding on the wire.
    #[must_use]
    pub fn encoding(&self) -> Encoding {
        Encoding::detect(&self.value)
    }
}

impl Header for GenericHeader {
    fn parse(raw: &str) -> Result<Self> {
        let raw = split_header_line(raw)?;
        let value = encoded_word::decode_value(raw.value.trim())
            .and_then(|value| validate_logical_value(&value).map(|()| value))
            .map_err(|e| rejected(raw.name, ParseStage::DecodeDisplayNames, e))?;

        Ok(Self {
            name: raw.name.to_string(),
            value,
        })
    }

    fn field_name(&self) -> &str {
        &self.name
    }

    fn field_value(&self) -> String {
        self.value.clone()
    }
}

/// Writes `Name: value`. Non-ASCII values are encoded. So are ASCII values
/// that parsing would change: text containing `=?` or with leading or
/// trailing whitespace.
impl fmt::Display for GenericHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = &self.value;
        if value.contains("=?")
            || value.starts_with(char::is_whitespace)
            || value.ends_with(char::is_whitespace)
        {
            write!(f, "{}: {}", self.name, encoded_word::encode_words(value))
        } else {
            let (encoded, _) = encoded_word::encode(value);
            write!(f, "{}: {encoded}", self.name)
        }
    }
}

impl FromStr for GenericHeader {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        <Self as Header>::parse(s)
    }
}

/// Validates a logical (unfolded, decoded) value.
fn validate_logical_value(value: &str) -> Result<()> {
    if contains_line_break(value) {
        return Err(Error::InvalidHeaderValue("value contains CR or LF"));
    }
    if value.chars().any(|c| c.is_control() && c != '\t') {
        return Err(Error::InvalidHeaderValue("control character"));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use proptest::prelude::*;

    #[test]
    fn test_split_header_line() {
        let raw = split_header_line("Content-Type: text/html;\r\n level=1").unwrap();
        assert_eq!(raw.name, "Content-Type");
        assert_eq!(raw.value, "text/html; level=1");

        let raw = split_header_line("Sender:<foo@bar>").unwrap();
        assert_eq!(raw.value, "<foo@bar>");
    }

    #[test]
    fn test_split_first_colon_only() {
        let raw = split_header_line("X-Time: 12:30").unwrap();
        assert_eq!(raw.name, "X-Time");
        assert_eq!(raw.value, "12:30");
    }

    #[test]
    fn test_split_rejects_bad_name() {
        for bad in ["Content-Type : text/html", "no colon here", ": value", "Bad\r\nName: x"] {
            let err = split_header_line(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::HeaderName, "{bad:?}");
            assert!(err.to_string().contains("header name"));
        }
    }

    #[test]
    fn test_split_rejects_bad_value() {
        let err = split_header_line("Subject: hi\r\nBcc: victim@example.com").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::HeaderValue);
        assert!(err.to_string().contains("header value"));
    }

    #[test]
    fn test_expect_name() {
        let raw = split_header_line("content-type: text/plain").unwrap();
        assert!(raw.expect_name("Content-Type").is_ok());
        assert_eq!(
            raw.expect_name("Sender").unwrap_err().kind(),
            ErrorKind::HeaderName
        );
    }

    #[test]
    fn test_generic_header_round_trip() {
        let header: GenericHeader = "Subject: =?UTF-8?Q?Gr=C3=BC=C3=9Fe?=".parse().unwrap();
        assert_eq!(header.field_name(), "Subject");
        assert_eq!(header.field_value(), "Grüße");
        assert_eq!(header.encoding(), Encoding::Utf8);
        assert_eq!(header.to_header_line(), "Subject: =?UTF-8?Q?Gr=C3=BC=C3=9Fe?=");
    }

    #[test]
    fn test_generic_header_unfolds() {
        let header = GenericHeader::parse("Subject: a long\r\n subject").unwrap();
        assert_eq!(header.value(), "a long subject");
        assert_eq!(header.to_string(), "Subject: a long subject");
    }

    #[test]
    fn test_generic_header_keeps_literal_encoded_word_syntax() {
        let header = GenericHeader::new("Subject", "=?UTF-8?Q?hi?=").unwrap();
        let line = header.to_string();
        assert_eq!(line, "Subject: =?UTF-8?Q?=3D=3FUTF-8=3FQ=3Fhi=3F=3D?=");
        assert_eq!(GenericHeader::parse(&line).unwrap(), header);
        assert_eq!(header.encoding(), Encoding::Ascii);
    }

    #[test]
    fn test_generic_header_keeps_edge_whitespace() {
        for value in ["  padded  ", " lead", "trail\t", " "] {
            let header = GenericHeader::new("Subject", value).unwrap();
            let parsed = GenericHeader::parse(&header.to_string()).unwrap();
            assert_eq!(parsed.value(), value);
        }
    }

    fn generic_value() -> impl Strategy<Value = String> {
        prop_oneof!["[\t -~]{0,60}", "[^\\p{Cc}]{0,40}"]
    }

    proptest! {
        #[test]
        fn prop_generic_header_round_trip(
            name in "X-[A-Za-z]{1,8}",
            value in generic_value(),
        ) {
            let header = GenericHeader::new(name.as_str(), value.as_str()).unwrap();
            let line = header.to_string();
            let parsed = GenericHeader::parse(&line).unwrap();
            prop_assert_eq!(parsed, header);
        }
    }

    #[test]
    fn test_generic_header_rejects_smuggled_crlf() {
        let err = GenericHeader::parse("Subject: =?UTF-8?Q?hi=0D=0ABcc:_x@y?=").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::HeaderValue);

        assert!(GenericHeader::new("Subject", "hi\r\nBcc: x@y").is_err());
        assert!(GenericHeader::new("Sub ject", "hi").is_err());
    }
}
