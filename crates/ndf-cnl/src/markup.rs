//! Inline markup extraction
//!
//! Markup conventions:
//!
//! | Markup    | Meaning    |
//! |-----------|------------|
//! | `**x**`   | qualifier  |
//! | `*x*`     | quantifier (node spans) or unit (value spans) |
//! | `++x++`   | adverb     |
//! | `[x]`     | modality   |
//!
//! Node-span extraction is left-anchored: markers are only recognized at the
//! start of the remaining span. Nesting is not supported.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static LEADING_ADVERB: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+\+([^+]+?)\+\+\s*").expect("valid regex"));

static LEADING_QUALIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\*\*([^*]+?)\*\*\s*").expect("valid regex"));

// Content may not contain '*', so a doubled marker never matches here.
static LEADING_QUANTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\*([^*]+?)\*\s*").expect("valid regex"));

static ANY_ADVERB: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+\+([^+]+?)\+\+").expect("valid regex"));

static ANY_MODALITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\[\]]+)\]").expect("valid regex"));

static ANY_UNIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*]+)\*").expect("valid regex"));

/// Markup pulled out of a node span
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Markup {
    /// Qualifier (`**x**`)
    pub qualifier: Option<String>,
    /// Quantifier (`*x*`)
    pub quantifier: Option<String>,
    /// Adverb (`++x++`)
    pub adverb: Option<String>,
    /// Remaining text with markup and punctuation stripped
    pub base: String,
}

impl Markup {
    /// True when no qualifier, quantifier or adverb was found
    #[inline]
    #[must_use]
    pub fn is_bare(&self) -> bool {
        self.qualifier.is_none() && self.quantifier.is_none() && self.adverb.is_none()
    }
}

/// Markup pulled out of an attribute value span
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueMarkup {
    /// Bare value
    pub value: String,
    /// Unit (`*x*`)
    pub unit: Option<String>,
    /// Adverb (`++x++`)
    pub adverb: Option<String>,
    /// Modality (`[x]`)
    pub modality: Option<String>,
}

/// Stateless markup extractor
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupExtractor;

impl MarkupExtractor {
    /// Create new extractor
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Extract adverb, qualifier, quantifier and base from a node span
    ///
    /// Order: adverb, then qualifier/quantifier (either order, at most one
    /// of each), then base.
    #[must_use]
    pub fn extract(span: &str) -> Markup {
        let (adverb, mut rest) = Self::extract_adverb(span);
        let mut qualifier = None;
        let mut quantifier = None;

        loop {
            if qualifier.is_none() {
                if let (Some(found), after) = Self::extract_qualifier(rest) {
                    qualifier = Some(found);
                    rest = after;
                    continue;
                }
            }
            if quantifier.is_none() {
                if let (Some(found), after) = Self::extract_quantifier(rest) {
                    quantifier = Some(found);
                    rest = after;
                    continue;
                }
            }
            break;
        }

        Markup {
            qualifier,
            quantifier,
            adverb,
            base: Self::strip_base(rest),
        }
    }

    /// Leading `++adverb++`; span returned unchanged (minus leading space) when absent
    #[must_use]
    pub fn extract_adverb(span: &str) -> (Option<String>, &str) {
        Self::leading(&LEADING_ADVERB, span)
    }

    /// Leading `**qualifier**`
    #[must_use]
    pub fn extract_qualifier(span: &str) -> (Option<String>, &str) {
        Self::leading(&LEADING_QUALIFIER, span)
    }

    /// Leading `*quantifier*`
    #[must_use]
    pub fn extract_quantifier(span: &str) -> (Option<String>, &str) {
        Self::leading(&LEADING_QUANTIFIER, span)
    }

    /// Strip everything except word characters and single spaces
    #[must_use]
    pub fn strip_base(span: &str) -> String {
        let kept: String = span
            .chars()
            .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_')
            .collect();
        kept.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Split an attribute value span into value, unit, adverb and modality
    ///
    /// Markup is removed wherever it appears, in the order adverb, modality,
    /// unit.
    #[must_use]
    pub fn split_value(span: &str) -> ValueMarkup {
        let (adverb, rest) = Self::take_first(&ANY_ADVERB, span);
        let (modality, rest) = Self::take_first(&ANY_MODALITY, &rest);
        let (unit, rest) = Self::take_first(&ANY_UNIT, &rest);

        ValueMarkup {
            value: rest.split_whitespace().collect::<Vec<_>>().join(" "),
            unit,
            adverb,
            modality,
        }
    }

    fn leading<'a>(pattern: &Regex, span: &'a str) -> (Option<String>, &'a str) {
        let span = span.trim_start();
        match pattern.captures(span) {
            Some(caps) => {
                let whole = caps.get(0).map_or(0, |m| m.end());
                let inner = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
                let found = (!inner.is_empty()).then(|| inner.to_string());
                (found, &span[whole..])
            }
            None => (None, span),
        }
    }

    fn take_first(pattern: &Regex, span: &str) -> (Option<String>, String) {
        match pattern.captures(span) {
            Some(caps) => {
                let Some(whole) = caps.get(0) else {
                    return (None, span.to_string());
                };
                let inner = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
                let mut rest = String::with_capacity(span.len());
                rest.push_str(&span[..whole.start()]);
                rest.push(' ');
                rest.push_str(&span[whole.end()..]);
                ((!inner.is_empty()).then(|| inner.to_string()), rest)
            }
            None => (None, span.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn extracts_quantifier_then_qualifier() {
        let markup = MarkupExtractor::extract("*all* **female** mathematicians");
        assert_eq!(markup.quantifier.as_deref(), Some("all"));
        assert_eq!(markup.qualifier.as_deref(), Some("female"));
        assert_eq!(markup.base, "mathematicians");
        assert!(markup.adverb.is_none());
    }

    #[test]
    fn extracts_qualifier_then_quantifier() {
        let markup = MarkupExtractor::extract("**male** *some* mathematicians");
        assert_eq!(markup.quantifier.as_deref(), Some("some"));
        assert_eq!(markup.qualifier.as_deref(), Some("male"));
        assert_eq!(markup.base, "mathematicians");
    }

    #[test]
    fn extracts_leading_adverb() {
        let markup = MarkupExtractor::extract("++rarely++ *few* cats");
        assert_eq!(markup.adverb.as_deref(), Some("rarely"));
        assert_eq!(markup.quantifier.as_deref(), Some("few"));
        assert_eq!(markup.base, "cats");
    }

    #[test]
    fn markers_after_base_are_not_extracted() {
        let markup = MarkupExtractor::extract("cats *all*");
        assert!(markup.quantifier.is_none());
        assert_eq!(markup.base, "cats all");
    }

    #[test]
    fn doubled_marker_is_not_a_quantifier() {
        let (quantifier, rest) = MarkupExtractor::extract_quantifier("**big** apple");
        assert!(quantifier.is_none());
        assert_eq!(rest, "**big** apple");
    }

    #[test]
    fn strip_base_removes_punctuation() {
        assert_eq!(MarkupExtractor::strip_base("  Hello,   world!  "), "Hello world");
        assert_eq!(MarkupExtractor::strip_base("snake_case-name"), "snake_casename");
    }

    #[test]
    fn split_value_with_all_markup() {
        let value = MarkupExtractor::split_value("++approximately++ 1.8 *m* [probably]");
        assert_eq!(value.value, "1.8");
        assert_eq!(value.unit.as_deref(), Some("m"));
        assert_eq!(value.adverb.as_deref(), Some("approximately"));
        assert_eq!(value.modality.as_deref(), Some("probably"));
    }

    #[test]
    fn split_value_plain() {
        let value = MarkupExtractor::split_value(" mathematics ");
        assert_eq!(value.value, "mathematics");
        assert!(value.unit.is_none());
    }

    proptest! {
        #[test]
        fn prop_base_is_a_fixpoint(text in ".{0,40}") {
            let first = MarkupExtractor::extract(&text);
            let second = MarkupExtractor::extract(&first.base);
            prop_assert!(second.is_bare());
            prop_assert_eq!(second.base, first.base);
        }
    }
}
