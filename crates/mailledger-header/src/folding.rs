//! Header folding and unfolding (RFC 5322 §2.2.3).
//!
//! Unfolding collapses every CRLF + WSP continuation into a single space.
//! Folding is only ever applied to parameter lists; the fold point is
//! always directly after a `;` separator, so unfolding a folded list gives
//! back the `; `-joined logical value.

use std::borrow::Cow;

/// Line terminator used on the wire.
pub const CRLF: &str = "\r\n";

/// Fold marker emitted by this crate: CRLF followed by exactly one space.
pub const FOLD: &str = "\r\n ";

/// Recommended maximum physical line length, excluding CRLF.
pub const MAX_LINE_LENGTH: usize = 78;

/// When to fold between parameters of a multi-parameter header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum FoldPolicy {
    /// Put every parameter on its own continuation line.
    #[default]
    EveryParameter,
    /// Fold only when the next parameter would push the physical line past
    /// the given length.
    LineLength(usize),
}

impl FoldPolicy {
    /// Folds at the recommended RFC 5322 line length.
    #[must_use]
    pub const fn recommended() -> Self {
        Self::LineLength(MAX_LINE_LENGTH)
    }
}

/// Unfolds a raw header value into its logical, single-line form.
///
/// Each CRLF followed by a space or tab becomes exactly one space. Any
/// other whitespace is left as it is. A value without folds is returned
/// borrowed.
///
/// Callers are expected to run [`crate::grammar::validate_field_value`]
/// first; a CRLF that is not a fold is copied through untouched so the
/// caller's validation remains the single source of rejection.
#[must_use]
pub fn unfold(raw: &str) -> Cow<'_, str> {
    if !raw.contains(CRLF) {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find(CRLF) {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + CRLF.len()..];
        if let Some(b' ' | b'\t') = after.as_bytes().first() {
            out.push(' ');
            rest = &after[1..];
        } else {
            out.push_str(CRLF);
            rest = after;
        }
    }
    out.push_str(rest);

    Cow::Owned(out)
}

/// Joins `primary` and `parts` with `;` separators, folding per `policy`.
///
/// `prefix_len` is the length of whatever precedes `primary` on the first
/// physical line (for example `"Content-Type: "`). Unfolding the result
/// always yields `primary; part1; part2...`.
#[must_use]
pub fn fold_parameters<I, S>(
    prefix_len: usize,
    primary: &str,
    parts: I,
    policy: FoldPolicy,
) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::from(primary);
    let mut line_len = prefix_len + primary.len();

    for part in parts {
        let part = part.as_ref();
        out.push(';');
        line_len += 1;

        let fold = match policy {
            FoldPolicy::EveryParameter => true,
            FoldPolicy::LineLength(max) => line_len + 1 + part.len() > max,
        };

        if fold {
            out.push_str(FOLD);
            line_len = 1;
        } else {
            out.push(' ');
            line_len += 1;
        }
        out.push_str(part);
        line_len += part.len();
    }

    out
}
