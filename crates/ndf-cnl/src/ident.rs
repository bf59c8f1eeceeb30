//! Node identifier composition
//!
//! A node id is derived from quantifier + qualifier + base, so the same
//! phrase always lands on the same node within a user's namespace.

use crate::error::{CnlError, CnlResult};
use crate::markup::{Markup, MarkupExtractor};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Normalize free text into an id: trim, lower-case, whitespace → `_`
#[must_use]
pub fn normalize_id(text: &str) -> String {
    WHITESPACE
        .replace_all(text.trim(), "_")
        .to_lowercase()
}

/// Compose a stable node id
///
/// # Errors
/// Returns [`CnlError::MissingBase`] if `base` is empty after trimming.
///
/// # Example
/// ```
/// use ndf_cnl::compose_id;
///
/// assert_eq!(compose_id("some", "big", "apple").unwrap(), "some_big_apple");
/// assert!(compose_id("", "", "").is_err());
/// ```
pub fn compose_id(quantifier: &str, qualifier: &str, base: &str) -> CnlResult<String> {
    let parts = non_empty_parts(quantifier, qualifier, base)?;
    let joined = parts.join("_");
    let id = WHITESPACE.replace_all(&joined, "_").to_lowercase();
    Ok(normalize_id(&id))
}

/// Compose a display name: parts joined by spaces, first character capitalized
///
/// # Errors
/// Returns [`CnlError::MissingBase`] if `base` is empty after trimming.
pub fn compose_name(quantifier: &str, qualifier: &str, base: &str) -> CnlResult<String> {
    let parts = non_empty_parts(quantifier, qualifier, base)?;
    Ok(capitalize_first(&parts.join(" ")))
}

fn non_empty_parts<'a>(
    quantifier: &'a str,
    qualifier: &'a str,
    base: &'a str,
) -> CnlResult<Vec<&'a str>> {
    let base = base.trim();
    if base.is_empty() {
        let text = format!("{quantifier} {qualifier}");
        return Err(CnlError::missing_base(text.trim()));
    }
    Ok([quantifier.trim(), qualifier.trim(), base]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect())
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Composed identity of a node phrase
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeIdentity {
    /// Stable id
    pub id: String,
    /// Display name
    pub name: String,
    /// Base name
    pub base: String,
    /// Quantifier, if any
    pub quantifier: Option<String>,
    /// Qualifier, if any
    pub qualifier: Option<String>,
}

impl NodeIdentity {
    /// Build identity from extracted markup
    ///
    /// # Errors
    /// Returns [`CnlError::MissingBase`] if the markup has no base.
    pub fn from_markup(markup: &Markup) -> CnlResult<Self> {
        let quantifier = markup.quantifier.as_deref().unwrap_or_default();
        let qualifier = markup.qualifier.as_deref().unwrap_or_default();

        Ok(Self {
            id: compose_id(quantifier, qualifier, &markup.base)?,
            name: compose_name(quantifier, qualifier, &markup.base)?,
            base: markup.base.clone(),
            quantifier: markup.quantifier.clone(),
            qualifier: markup.qualifier.clone(),
        })
    }

    /// Extract markup from `text` and build identity
    ///
    /// # Errors
    /// Returns [`CnlError::MissingBase`] if nothing but markup or punctuation
    /// is left.
    pub fn from_text(text: &str) -> CnlResult<Self> {
        Self::from_markup(&MarkupExtractor::extract(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn compose_id_joins_parts() {
        assert_eq!(compose_id("some", "big", "apple").unwrap(), "some_big_apple");
        assert_eq!(compose_id("", "big", "apple").unwrap(), "big_apple");
        assert_eq!(compose_id("", "", "Red Apple").unwrap(), "red_apple");
    }

    #[test]
    fn compose_id_requires_base() {
        assert!(matches!(
            compose_id("", "", ""),
            Err(CnlError::MissingBase { .. })
        ));
        assert!(compose_id("all", "big", "   ").is_err());
    }

    #[test]
    fn compose_name_capitalizes_first_only() {
        assert_eq!(
            compose_name("all", "female", "mathematicians").unwrap(),
            "All female mathematicians"
        );
        assert_eq!(compose_name("", "", "new York").unwrap(), "New York");
    }

    #[test]
    fn normalize_id_collapses_whitespace() {
        assert_eq!(normalize_id("  Part   Of "), "part_of");
    }

    #[test]
    fn identity_from_text() {
        let identity = NodeIdentity::from_text("*some* **male** mathematicians").unwrap();
        assert_eq!(identity.id, "some_male_mathematicians");
        assert_eq!(identity.name, "Some male mathematicians");
        assert_eq!(identity.base, "mathematicians");
        assert_eq!(identity.quantifier.as_deref(), Some("some"));
        assert_eq!(identity.qualifier.as_deref(), Some("male"));
    }

    #[test]
    fn identity_from_markup_only_fails() {
        assert!(NodeIdentity::from_text("**big**").is_err());
    }

    proptest! {
        #[test]
        fn prop_compose_id_idempotent(
            quantifier in "[a-zA-Z ]{0,8}",
            qualifier in "[a-zA-Z ]{0,8}",
            base in "[a-zA-Z][a-zA-Z ]{0,12}",
        ) {
            let id = compose_id(&quantifier, &qualifier, &base).unwrap();
            prop_assert_eq!(compose_id("", "", &id).unwrap(), id);
        }
    }
}
