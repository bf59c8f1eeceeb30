//! Fact hashing
//!
//! Provides [`FactHash`], a Blake3 digest over the identifying fields of a
//! materialized fact. Used to keep attribute ids distinct per value.

use std::fmt::{self, Display, Formatter};

/// Field separator, written after each field's presence tag and bytes
const FIELD_SEPARATOR: u8 = 0x1f;

/// A 32-byte Blake3 hash over fact fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FactHash([u8; 32]);

impl FactHash {
    /// Create from raw bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Underlying bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hash arbitrary data
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self::new(*blake3::hash(data).as_bytes())
    }

    /// Hash an ordered list of optional fields
    ///
    /// `None` and `Some("")` hash differently, so a missing unit never
    /// collides with an empty one.
    #[must_use]
    pub fn compute_fields(fields: &[Option<&str>]) -> Self {
        let mut hasher = blake3::Hasher::new();
        for field in fields {
            match field {
                Some(text) => {
                    hasher.update(&[1]);
                    hasher.update(text.as_bytes());
                }
                None => {
                    hasher.update(&[0]);
                }
            }
            hasher.update(&[FIELD_SEPARATOR]);
        }
        Self::new(*hasher.finalize().as_bytes())
    }

    /// Short string representation (first 16 hex chars)
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Display for FactHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_is_deterministic() {
        assert_eq!(FactHash::compute(b"water"), FactHash::compute(b"water"));
        assert_ne!(FactHash::compute(b"water"), FactHash::compute(b"ice"));
    }

    #[test]
    fn fields_are_position_sensitive() {
        let a = FactHash::compute_fields(&[Some("ab"), Some("c")]);
        let b = FactHash::compute_fields(&[Some("a"), Some("bc")]);
        assert_ne!(a, b);
    }

    #[test]
    fn none_differs_from_empty() {
        let a = FactHash::compute_fields(&[Some("x"), None]);
        let b = FactHash::compute_fields(&[Some("x"), Some("")]);
        assert_ne!(a, b);
    }

    #[test]
    fn short_is_16_hex_chars() {
        let short = FactHash::compute(b"x").short();
        assert_eq!(short.len(), 16);
        assert!(short.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
