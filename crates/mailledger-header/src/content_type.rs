//! `Content-Type` header (RFC 2045 §5).

use crate::error::{Error, Result};
use crate::folding::{FoldPolicy, fold_parameters};
use crate::grammar::{
    quote_string, unquote_string, validate_media_type, validate_parameter_value,
};
use crate::header::{Header, ParseStage, rejected, split_header_line};
use crate::parameters::Parameters;
use std::fmt;
use std::str::FromStr;

/// MIME content type with ordered parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ContentType {
    /// Lowercased `type/subtype`; empty until set.
    media_type: String,
    parameters: Parameters,
}

impl ContentType {
    /// Field name of this header.
    pub const NAME: &'static str = "Content-Type";

    /// Creates an empty content type header.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a content type from a `type/subtype` string.
    ///
    /// # Errors
    ///
    /// Returns an error if the media type is invalid.
    pub fn from_media_type(media_type: &str) -> Result<Self> {
        let mut ct = Self::new();
        ct.set_type(media_type)?;
        Ok(ct)
    }

    fn known(media_type: &str, name: &str, value: String) -> Self {
        let mut ct = Self {
            media_type: media_type.to_string(),
            parameters: Parameters::new(),
        };
        ct.parameters.insert_unchecked(name.to_string(), value);
        ct
    }

    /// Creates a text/plain content type.
    #[must_use]
    pub fn text_plain() -> Self {
        Self::known("text/plain", "charset", "utf-8".to_string())
    }

    /// Creates a text/html content type.
    #[must_use]
    pub fn text_html() -> Self {
        Self::known("text/html", "charset", "utf-8".to_string())
    }

    /// Creates a multipart/mixed content type with boundary.
    ///
    /// # Errors
    ///
    /// Returns an error if the boundary is not a valid parameter value.
    pub fn multipart_mixed(boundary: impl Into<String>) -> Result<Self> {
        Self::multipart("multipart/mixed", boundary.into())
    }

    /// Creates a multipart/alternative content type with boundary.
    ///
    /// # Errors
    ///
    /// Returns an error if the boundary is not a valid parameter value.
    pub fn multipart_alternative(boundary: impl Into<String>) -> Result<Self> {
        Self::multipart("multipart/alternative", boundary.into())
    }

    /// Creates a multipart/related content type with boundary.
    ///
    /// # Errors
    ///
    /// Returns an error if the boundary is not a valid parameter value.
    pub fn multipart_related(boundary: impl Into<String>) -> Result<Self> {
        Self::multipart("multipart/related", boundary.into())
    }

    fn multipart(media_type: &str, boundary: String) -> Result<Self> {
        validate_parameter_value(&boundary)?;
        Ok(Self::known(media_type, "boundary", boundary))
    }

    /// Sets the media type, lowercased.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHeaderValue`] if the value is not a
    /// `type/subtype` pair of tokens, or contains whitespace or CR/LF.
    pub fn set_type(&mut self, media_type: &str) -> Result<()> {
        validate_media_type(media_type)?;
        self.media_type = media_type.to_ascii_lowercase();
        Ok(())
    }

    /// Returns the lowercased `type/subtype`.
    #[must_use]
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Returns the main type (e.g. `text`).
    #[must_use]
    pub fn main_type(&self) -> &str {
        self.media_type
            .split_once('/')
            .map_or(self.media_type.as_str(), |(main, _)| main)
    }

    /// Returns the subtype (e.g. `plain`).
    #[must_use]
    pub fn sub_type(&self) -> &str {
        self.media_type.split_once('/').map_or("", |(_, sub)| sub)
    }

    /// Adds a parameter. A parameter with the same name (ignoring case) is
    /// replaced in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameterName`] or
    /// [`Error::InvalidParameterValue`] if validation fails.
    pub fn add_parameter(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<()> {
        self.parameters.insert(name, value).map(|_| ())
    }

    /// Adds a parameter, builder style.
    ///
    /// # Errors
    ///
    /// See [`ContentType::add_parameter`].
    pub fn with_parameter(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self> {
        self.add_parameter(name, value)?;
        Ok(self)
    }

    /// Removes a parameter by name, ignoring case.
    pub fn remove_parameter(&mut self, name: &str) -> Option<String> {
        self.parameters.remove(name)
    }

    /// Returns all parameters in insertion order.
    #[must_use]
    pub const fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Returns a parameter value by name, ignoring case.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name)
    }

    /// Returns the charset parameter if present.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.parameter("charset")
    }

    /// Returns the boundary parameter if present.
    #[must_use]
    pub fn boundary(&self) -> Option<&str> {
        self.parameter("boundary")
    }

    /// Checks if this is a multipart content type.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.main_type() == "multipart"
    }

    /// Checks if this is a text content type.
    #[must_use]
    pub fn is_text(&self) -> bool {
        self.main_type() == "text"
    }

    /// Parses a content type field value (without the `Content-Type:`
    /// prefix), e.g. `text/plain; charset=utf-8`.
    ///
    /// The value may be folded.
    ///
    /// # Errors
    ///
    /// Returns an error if the value breaks the folding grammar, the media
    /// type is invalid, or any parameter is invalid.
    pub fn parse_value(value: &str) -> Result<Self> {
        Self::parse(&format!("{}: {value}", Self::NAME))
    }

    /// Parses an unfolded field value.
    fn parse_unfolded(value: &str) -> Result<Self> {
        let mut segments = split_segments(value)?.into_iter();

        let mut ct = Self::new();
        ct.set_type(segments.next().unwrap_or_default().trim())?;

        for segment in segments {
            let segment = segment.trim();
            // A trailing `;` leaves an empty segment.
            if segment.is_empty() {
                continue;
            }

            let (name, value) = segment
                .split_once('=')
                .ok_or(Error::InvalidParameterName("parameter without '='"))?;
            let value = value.trim();
            let value = if value.starts_with('"') {
                unquote_string(value)
                    .ok_or(Error::InvalidParameterValue("malformed quoted-string"))?
            } else {
                value.to_string()
            };
            ct.add_parameter(name.trim(), value)?;
        }

        Ok(ct)
    }

    /// Returns the logical, unfolded field value.
    #[must_use]
    pub fn field_value(&self) -> String {
        let mut value = self.media_type.clone();
        for part in self.parameter_parts() {
            value.push_str("; ");
            value.push_str(&part);
        }
        value
    }

    /// Renders the full header line using the given fold policy.
    ///
    /// The media type is written as stored. A header built with
    /// [`ContentType::new`] and no [`ContentType::set_type`] call renders an
    /// empty media type, which [`Header::parse`] rejects; set a type before
    /// serializing.
    #[must_use]
    pub fn to_string_with(&self, policy: FoldPolicy) -> String {
        let prefix = format!("{}: ", Self::NAME);
        let value = fold_parameters(
            prefix.len(),
            &self.media_type,
            self.parameter_parts(),
            policy,
        );
        prefix + &value
    }

    fn parameter_parts(&self) -> impl Iterator<Item = String> + '_ {
        self.parameters
            .iter()
            .map(|(name, value)| format!("{name}={}", quote_string(value)))
    }
}

/// Splits a field value on `;`, ignoring separators inside quoted-strings.
fn split_segments(value: &str) -> Result<Vec<&str>> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, b) in value.bytes().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' if in_quotes => escaped = true,
            b'"' => in_quotes = !in_quotes,
            b';' if !in_quotes => {
                segments.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    if in_quotes {
        return Err(Error::InvalidParameterValue("unterminated quoted-string"));
    }
    segments.push(&value[start..]);
    Ok(segments)
}

impl Header for ContentType {
    fn parse(raw: &str) -> Result<Self> {
        let raw = split_header_line(raw)?;
        raw.expect_name(Self::NAME)?;
        let ct = Self::parse_unfolded(&raw.value)
            .map_err(|e| rejected(Self::NAME, ParseStage::FieldSpecific, e))?;
        tracing::trace!(
            media_type = %ct.media_type,
            params = ct.parameters.len(),
            "parsed Content-Type"
        );
        Ok(ct)
    }

    fn field_name(&self) -> &str {
        Self::NAME
    }

    fn field_value(&self) -> String {
        Self::field_value(self)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with(FoldPolicy::default()))
    }
}

impl FromStr for ContentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        <Self as Header>::parse(s)
    }
}
