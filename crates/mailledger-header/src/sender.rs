//! `Sender` header (RFC 5322 §3.6.2).

use crate::address::Address;
use crate::encoded_word::Encoding;
use crate::error::{Error, Result};
use crate::header::{Header, ParseStage, rejected, split_header_line};
use std::fmt;
use std::str::FromStr;

/// `Sender` header holding a single mailbox.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Sender {
    address: Option<Address>,
}

impl Sender {
    /// Field name of this header.
    pub const NAME: &'static str = "Sender";

    /// Creates an empty sender header.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the address. The header owns its copy; clone first to keep one.
    pub fn set_address(&mut self, address: Address) {
        self.address = Some(address);
    }

    /// Builds and sets an address from an email and optional display name.
    ///
    /// The previous address is kept if validation fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] if the email or name is invalid.
    pub fn set_email(&mut self, email: &str, name: Option<&str>) -> Result<()> {
        self.address = Some(Address::from_parts(email, name)?);
        Ok(())
    }

    /// Returns the address, if set.
    #[must_use]
    pub const fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    /// Returns whether the display name needs encoding on the wire.
    #[must_use]
    pub fn encoding(&self) -> Encoding {
        self.address
            .as_ref()
            .map_or(Encoding::Ascii, Address::encoding)
    }
}

impl From<Address> for Sender {
    fn from(address: Address) -> Self {
        Self {
            address: Some(address),
        }
    }
}

impl Header for Sender {
    fn parse(raw: &str) -> Result<Self> {
        let raw = split_header_line(raw)?;
        raw.expect_name(Self::NAME)?;

        let address = Address::parse(&raw.value)
            .map_err(|e| rejected(Self::NAME, ParseStage::DecodeDisplayNames, e))?;
        tracing::trace!(encoding = %address.encoding(), "parsed Sender");

        Ok(Self::from(address))
    }

    fn field_name(&self) -> &str {
        Self::NAME
    }

    /// Returns `Name <email>` with the name decoded, or an empty string
    /// when no address is set.
    fn field_value(&self) -> String {
        self.address
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.address.as_ref().map(Address::format).unwrap_or_default();
        write!(f, "{}: {value}", Self::NAME)
    }
}

impl FromStr for Sender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        <Self as Header>::parse(s)
    }
}
