//! Conservative address syntax check and local-part/domain split.

use once_cell::sync::Lazy;
use regex::Regex;

pub const DEFAULT_EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

pub(crate) static DEFAULT_EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(DEFAULT_EMAIL_PATTERN)
        .expect("Default email regex pattern failed to compile. This is a bug.")
});

/// An address that passed the syntax stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAddress<'a> {
    /// The trimmed address as supplied.
    pub address: &'a str,
    /// Lowercased local part.
    pub local_part: String,
    /// Lowercased domain.
    pub domain: String,
}

/// Matches `address` (already trimmed) against `pattern` and splits it.
///
/// Returns `None` when the address does not match or does not contain exactly
/// one `@`, which a custom pattern could otherwise allow.
pub fn parse_address<'a>(pattern: &Regex, address: &'a str) -> Option<ParsedAddress<'a>> {
    if !pattern.is_match(address) {
        return None;
    }
    let (local, domain) = address.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return None;
    }
    Some(ParsedAddress {
        address,
        local_part: local.to_lowercase(),
        domain: domain.to_lowercase(),
    })
}
