//! Email address with optional display name.

use crate::encoded_word::{self, Encoding};
use crate::error::{Error, Result};
use crate::grammar::{contains_line_break, quote_string, unquote_string};
use std::fmt;

/// RFC 5322 `specials`. ASCII display names containing any of these are
/// emitted as quoted-strings.
const NAME_SPECIALS: &str = "()<>[]:;@\\,.\"";

/// Specials that cannot appear in an unquoted display name without
/// changing how many addresses the value holds.
const PHRASE_BREAKERS: &str = "<>@,;:\"";

/// Email address with an optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Address {
    email: String,
    name: Option<String>,
}

impl Address {
    /// Creates an address without a display name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] if the email is empty, malformed,
    /// or contains CR/LF.
    pub fn new(email: impl Into<String>) -> Result<Self> {
        let email = email.into();
        validate_email(&email)?;
        Ok(Self { email, name: None })
    }

    /// Creates an address with a display name.
    ///
    /// An empty name is the same as no name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] if the email is invalid or the name
    /// contains CR/LF or other control characters.
    pub fn with_name(email: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let mut address = Self::new(email)?;
        if !name.is_empty() {
            validate_display_name(&name)?;
            address.name = Some(name);
        }
        Ok(address)
    }

    /// Creates an address from an email and an optional display name.
    ///
    /// # Errors
    ///
    /// See [`Address::with_name`].
    pub fn from_parts(email: impl Into<String>, name: Option<&str>) -> Result<Self> {
        match name {
            Some(name) => Self::with_name(email, name),
            None => Self::new(email),
        }
    }

    /// Parses `<email>`, `Name <email>`, `"Quoted Name" <email>`, or a bare
    /// `email`. Encoded-words in the name are decoded. An unquoted name may
    /// not contain `<`, `>`, `@`, `,`, `;`, `:` or `"`, so a value holding
    /// more than one address is rejected.
    ///
    /// The input must already be unfolded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] for malformed input, or an encoding
    /// error if an encoded-word in the name does not decode.
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.is_empty() {
            return Err(Error::InvalidAddress("empty address"));
        }

        let Some(rest) = value.strip_suffix('>') else {
            return Self::new(value);
        };
        let open = rest
            .rfind('<')
            .ok_or(Error::InvalidAddress("unbalanced angle brackets"))?;
        let email = &rest[open + 1..];
        let display = rest[..open].trim();

        let name = parse_display_name(display)?;
        Self::from_parts(email, name.as_deref())
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the display name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns whether the display name needs encoding on the wire.
    #[must_use]
    pub fn encoding(&self) -> Encoding {
        self.name
            .as_deref()
            .map_or(Encoding::Ascii, Encoding::detect)
    }

    /// Formats the address for the wire.
    ///
    /// `<email>` without a name, `Name <email>` otherwise. Non-ASCII names
    /// become encoded-words; ASCII names with specials become quoted-strings.
    #[must_use]
    pub fn format(&self) -> String {
        match &self.name {
            None => format!("<{}>", self.email),
            Some(name) => {
                let (encoded, encoding) = encoded_word::encode(name);
                if encoding == Encoding::Ascii && needs_quoting(name) {
                    format!("{} <{}>", quote_string(name), self.email)
                } else {
                    format!("{encoded} <{}>", self.email)
                }
            }
        }
    }
}

/// Human-readable form with the display name decoded.
impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            None => write!(f, "<{}>", self.email),
            Some(name) if needs_quoting(name) => {
                write!(f, "{} <{}>", quote_string(name), self.email)
            }
            Some(name) => write!(f, "{name} <{}>", self.email),
        }
    }
}

fn needs_quoting(name: &str) -> bool {
    name.contains(|c: char| NAME_SPECIALS.contains(c))
        || name.contains("=?")
        || name.starts_with(char::is_whitespace)
        || name.ends_with(char::is_whitespace)
}

fn parse_display_name(display: &str) -> Result<Option<String>> {
    if display.is_empty() {
        return Ok(None);
    }
    let name = if display.starts_with('"') {
        unquote_string(display)
            .ok_or(Error::InvalidAddress("malformed quoted display name"))?
    } else if display.contains(|c: char| PHRASE_BREAKERS.contains(c)) {
        return Err(Error::InvalidAddress("unquoted display name contains specials"));
    } else {
        encoded_word::decode_value(display)?
    };
    Ok(Some(name))
}

/// Validates an email against the `local@domain` grammar.
///
/// The local part is dot-separated atoms of letters, digits, `-`, `_` and
/// `+`. The domain is dot-separated labels of letters, digits and `-`.
fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() {
        return Err(Error::InvalidAddress("empty email"));
    }
    if contains_line_break(email) {
        return Err(Error::InvalidAddress("email contains CR or LF"));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(Error::InvalidAddress("email must contain @"));
    };
    if domain.contains('@') {
        return Err(Error::InvalidAddress("email must have exactly one @"));
    }

    let is_local_char = |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+');
    if local
        .split('.')
        .any(|atom| atom.is_empty() || !atom.chars().all(is_local_char))
    {
        return Err(Error::InvalidAddress("invalid local part"));
    }

    let is_domain_char = |c: char| c.is_ascii_alphanumeric() || c == '-';
    if domain
        .split('.')
        .any(|label| label.is_empty() || !label.chars().all(is_domain_char))
    {
        return Err(Error::InvalidAddress("invalid domain"));
    }

    Ok(())
}

fn validate_display_name(name: &str) -> Result<()> {
    if contains_line_break(name) {
        return Err(Error::InvalidAddress("display name contains CR or LF"));
    }
    if name.chars().any(|c| c.is_control() && c != '\t') {
        return Err(Error::InvalidAddress(
            "display name contains control characters",
        ));
    }
    Ok(())
}
