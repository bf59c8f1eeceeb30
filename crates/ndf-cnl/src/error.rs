//! Error types for CNL processing
//!
//! Most parse problems are soft: they become diagnostic strings and the
//! offending line is skipped. [`CnlError`] covers the cases a caller has to
//! branch on.

/// Errors raised while composing identifiers from parsed markup
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CnlError {
    /// The mandatory base name was empty after stripping markup
    #[error("missing base name in '{text}'")]
    MissingBase {
        /// Text the identifier was composed from
        text: String,
    },
}

impl CnlError {
    /// Create missing base error for source text
    #[inline]
    pub fn missing_base(text: impl Into<String>) -> Self {
        Self::MissingBase { text: text.into() }
    }
}

/// Result type alias for CNL operations
pub type CnlResult<T> = Result<T, CnlError>;
