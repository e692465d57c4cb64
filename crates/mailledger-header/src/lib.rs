//! # mailledger-header
//!
//! Structured email header fields (RFC 5322, RFC 2045, RFC 2047).
//!
//! ## Features
//!
//! - **Header parsing**: Split, validate, unfold, and parse raw header lines
//! - **Injection safety**: Bare CR/LF and broken folds are rejected, never stripped
//! - **Folding**: Deterministic one-parameter-per-line output, or fold by line length
//! - **Encoded-words**: RFC 2047 `Q`/`B` decoding, `UTF-8` `Q` encoding
//! - **Headers**: `Content-Type`, `Sender`, and a generic header
//!
//! ## Quick Start
//!
//! ### Parsing Headers
//!
//! ```
//! use mailledger_header::{ContentType, Header, Sender};
//!
//! let ct = ContentType::parse("Content-Type: text/html;\r\n level=1")?;
//! assert_eq!(ct.media_type(), "text/html");
//! assert_eq!(ct.parameter("level"), Some("1"));
//!
//! let sender = Sender::parse("Sender: =?UTF-8?Q?J=C3=BCrgen?= <juergen@example.com>")?;
//! assert_eq!(sender.field_value(), "Jürgen <juergen@example.com>");
//! # Ok::<(), mailledger_header::Error>(())
//! ```
//!
//! ### Building Headers
//!
//! ```
//! use mailledger_header::{Address, ContentType, Sender};
//!
//! let mut ct = ContentType::new();
//! ct.set_type("application/x-unit-test")?;
//! ct.add_parameter("charset", "us-ascii")?;
//! assert_eq!(
//!     ct.to_string(),
//!     "Content-Type: application/x-unit-test;\r\n charset=\"us-ascii\""
//! );
//!
//! let sender = Sender::from(Address::with_name("juergen@example.com", "Jürgen")?);
//! assert_eq!(
//!     sender.to_string(),
//!     "Sender: =?UTF-8?Q?J=C3=BCrgen?= <juergen@example.com>"
//! );
//! # Ok::<(), mailledger_header::Error>(())
//! ```
//!
//! ### Rejecting Injection
//!
//! ```
//! use mailledger_header::{ContentType, ErrorKind, Header};
//!
//! let err = ContentType::parse("Content-Type: text/html;\nlevel=1").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::HeaderValue);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod address;
mod content_type;
mod error;
mod header;
mod parameters;
mod sender;

pub mod encoded_word;
pub mod folding;
pub mod grammar;

pub use address::Address;
pub use content_type::ContentType;
pub use encoded_word::Encoding;
pub use error::{Error, ErrorKind, Result};
pub use folding::FoldPolicy;
pub use header::{GenericHeader, Header, RawHeader, split_header_line};
pub use parameters::Parameters;
pub use sender::Sender;
