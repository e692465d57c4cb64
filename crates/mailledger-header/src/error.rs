//! Error types for header operations.

use std::fmt;
use std::string::FromUtf8Error;

/// Result type alias for header operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Header error types.
///
/// Every variant carries a static reason. The offending input is never
/// copied into the error, so a hostile header cannot leak through logs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Field name is absent, empty, or contains whitespace/CR/LF.
    #[error("invalid header name: {0}")]
    InvalidHeaderName(&'static str),

    /// Field value violates the folding grammar or character set.
    #[error("invalid header value: {0}")]
    InvalidHeaderValue(&'static str),

    /// Parameter name is not a token.
    #[error("invalid parameter name: {0}")]
    InvalidParameterName(&'static str),

    /// Parameter value contains CR/LF or other forbidden characters.
    #[error("invalid parameter value: {0}")]
    InvalidParameterValue(&'static str),

    /// Email address or display name is malformed.
    #[error("invalid address: {0}")]
    InvalidAddress(&'static str),

    /// Encoded-word is malformed.
    #[error("invalid encoded-word: {0}")]
    InvalidEncoding(&'static str),

    /// Base64 decode error inside a `B` encoded-word.
    #[error("invalid encoded-word: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// Decoded encoded-word payload is not valid UTF-8.
    #[error("invalid encoded-word: {0}")]
    Utf8Decode(#[from] FromUtf8Error),
}

/// Validation category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid header name.
    HeaderName,
    /// Invalid header value or folding violation.
    HeaderValue,
    /// Invalid parameter name.
    ParameterName,
    /// Invalid parameter value.
    ParameterValue,
    /// Invalid address.
    Address,
    /// Malformed encoded-word.
    Encoding,
}

impl ErrorKind {
    /// Returns the category phrase used in error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HeaderName => "header name",
            Self::HeaderValue => "header value",
            Self::ParameterName => "parameter name",
            Self::ParameterValue => "parameter value",
            Self::Address => "address",
            Self::Encoding => "encoded-word",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Returns the validation category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidHeaderName(_) => ErrorKind::HeaderName,
            Self::InvalidHeaderValue(_) => ErrorKind::HeaderValue,
            Self::InvalidParameterName(_) => ErrorKind::ParameterName,
            Self::InvalidParameterValue(_) => ErrorKind::ParameterValue,
            Self::InvalidAddress(_) => ErrorKind::Address,
            Self::InvalidEncoding(_) | Self::Base64Decode(_) | Self::Utf8Decode(_) => {
                ErrorKind::Encoding
            }
        }
    }

    /// Returns true if the error was raised by header-level parsing rather
    /// than by the address model.
    #[must_use]
    pub const fn is_header_error(&self) -> bool {
        !matches!(self, Self::InvalidAddress(_))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_message_names_category() {
        let err = Error::InvalidHeaderValue("bare LF");
        assert_eq!(err.to_string(), "invalid header value: bare LF");
        assert!(err.to_string().contains(err.kind().as_str()));

        let err = Error::InvalidParameterName("not a token");
        assert!(err.to_string().contains("parameter name"));
    }

    #[test]
    fn test_kind() {
        assert_eq!(Error::InvalidHeaderName("empty").kind(), ErrorKind::HeaderName);
        assert_eq!(Error::InvalidAddress("empty").kind(), ErrorKind::Address);
        assert_eq!(
            Error::InvalidEncoding("bad hex").kind(),
            ErrorKind::Encoding
        );
    }

    #[test]
    fn test_header_namespace() {
        assert!(Error::InvalidHeaderValue("bare CR").is_header_error());
        assert!(!Error::InvalidAddress("missing @").is_header_error());
    }
}
