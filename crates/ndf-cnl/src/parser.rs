//! Line-level fact parser
//!
//! Statement shapes live in an ordered table of `(pattern, constructor)`
//! pairs. The first shape whose pattern matches owns the line; lines no
//! shape matches are skipped with a diagnostic.

use crate::fact::{AttributeFact, DefineFact, Definition, Fact, NodeFact, RelationFact};
use crate::ident::{normalize_id, NodeIdentity};
use crate::markup::MarkupExtractor;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Constructor invoked with the captures of a matched shape
///
/// `Err` carries a diagnostic; the line produces no fact.
type Build = fn(&Captures<'_>, &LineContext<'_>) -> Result<Fact, String>;

/// One recognized statement shape
pub struct Shape {
    name: &'static str,
    pattern: Regex,
    build: Build,
}

impl Shape {
    fn new(name: &'static str, pattern: &str, build: Build) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("valid shape regex"),
            build,
        }
    }

    /// Shape name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether this shape's pattern matches the line
    #[inline]
    #[must_use]
    pub fn matches(&self, line: &str) -> bool {
        self.pattern.is_match(line)
    }
}

impl std::fmt::Debug for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shape")
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

static SHAPES: Lazy<Vec<Shape>> = Lazy::new(|| {
    vec![
        Shape::new(
            "define_attribute",
            r"(?i)^define\s+attribute\s+'(?P<name>[^']+)'\s+as\s+an?\s+(?P<type>[\w-]+)(?:\s+with\s+unit\s+'(?P<unit>[^']*)')?(?:\s+applicable\s+to\s+(?P<classes>.+?))?\s*\.?$",
            build_define_attribute,
        ),
        Shape::new(
            "define_relation",
            r"(?i)^define\s+relation\s+'(?P<name>[^']+)'\s+with\s+inverse\s+'(?P<inverse>[^']+)'(?:\s+between\s+'(?P<domain>[^']+)'\s+and\s+'(?P<range>[^']+)')?\s*\.?$",
            build_define_relation,
        ),
        // Must precede `is_a`: "X is part of Y" also matches the generic form.
        Shape::new(
            "structural_relation",
            r"(?i)^(?P<subject>[^:<>\[\]]+?)\s+(?:is\s+)?(?:an?\s+)?(?P<relation>part\s+of|member\s+of)\s+(?P<object>[^:<>\[\]]+?)\s*\.?$",
            build_structural_relation,
        ),
        Shape::new(
            "is_a",
            r"(?i)^(?P<subject>[^:<>\[\]]+?)\s+is\s+(?:an?\s+)?(?P<object>[^:<>\[\]]+?)\s*\.?$",
            build_is_a,
        ),
        Shape::new(
            "assign_attribute",
            r"(?i)^assign\s+attribute\s+'(?P<name>[^']+)'\s+to\s+'(?P<subject>[^']+)'\s+with\s+value\s+(?P<value>.+?)(?:\s+and\s+unit\s+'(?P<unit>[^']*)')?\s*\.?$",
            build_assign_attribute,
        ),
        Shape::new(
            "markup_relation",
            r"^(?:\+\+(?P<adverb>[^+]+?)\+\+\s*)?<(?P<relation>[^<>]+)>\s*(?P<target>.+?)(?:\s*\[(?P<modality>[^\[\]]+)\])?\s*$",
            build_markup_relation,
        ),
        Shape::new(
            "markup_attribute",
            r"(?i)^(?:has\s+)?(?P<name>[^:]+?)\s*:\s*(?P<value>.+)$",
            build_markup_attribute,
        ),
    ]
});

/// Ambient context for one line
#[derive(Debug, Clone, Copy, Default)]
pub struct LineContext<'a> {
    /// 1-based line number, used in diagnostics
    pub line_no: usize,
    /// Node id the enclosing block is scoped to
    pub subject: Option<&'a str>,
    /// Morph name the enclosing block targets
    pub morph: Option<&'a str>,
}

impl<'a> LineContext<'a> {
    /// Context for a line outside any node section
    #[inline]
    #[must_use]
    pub fn new(line_no: usize) -> Self {
        Self {
            line_no,
            subject: None,
            morph: None,
        }
    }

    /// With ambient subject
    #[inline]
    #[must_use]
    pub fn with_subject(mut self, subject: &'a str) -> Self {
        self.subject = Some(subject);
        self
    }

    /// With target morph
    #[inline]
    #[must_use]
    pub fn with_morph(mut self, morph: &'a str) -> Self {
        self.morph = Some(morph);
        self
    }
}

/// Table-driven parser over [`Shape`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct FactParser;

impl FactParser {
    /// Create parser
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Shapes in priority order
    #[must_use]
    pub fn shapes(&self) -> &'static [Shape] {
        &SHAPES
    }

    /// Name of the first shape matching `line`, if any
    #[must_use]
    pub fn classify(&self, line: &str) -> Option<&'static str> {
        let line = strip_declare(line.trim());
        SHAPES
            .iter()
            .find(|shape| shape.matches(line))
            .map(Shape::name)
    }

    /// Parse one line into at most one fact
    ///
    /// Unrecognized or incomplete lines append a diagnostic to `log` and
    /// yield `None`.
    pub fn parse_line(
        &self,
        line: &str,
        ctx: &LineContext<'_>,
        log: &mut Vec<String>,
    ) -> Option<Fact> {
        let line = strip_declare(line.trim());
        if line.is_empty() {
            return None;
        }

        for shape in SHAPES.iter() {
            let Some(caps) = shape.pattern.captures(line) else {
                continue;
            };
            return match (shape.build)(&caps, ctx) {
                Ok(fact) => {
                    tracing::debug!(line = ctx.line_no, shape = shape.name, kind = fact.kind(), "parsed fact");
                    Some(fact)
                }
                Err(diagnostic) => {
                    tracing::warn!(line = ctx.line_no, shape = shape.name, "{diagnostic}");
                    log.push(diagnostic);
                    None
                }
            };
        }

        tracing::warn!(line = ctx.line_no, "unrecognized line");
        log.push(format!("Unrecognized line {}: {}", ctx.line_no, line));
        None
    }
}

fn strip_declare(line: &str) -> &str {
    const PREFIX: &str = "declare:";
    match line.get(..PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(PREFIX) => line[PREFIX.len()..].trim_start(),
        _ => line,
    }
}

fn capture(caps: &Captures<'_>, name: &str) -> Option<String> {
    caps.name(name)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn whole<'h>(caps: &Captures<'h>) -> &'h str {
    caps.get(0).map_or("", |m| m.as_str())
}

fn identity(text: &str, caps: &Captures<'_>, ctx: &LineContext<'_>) -> Result<NodeIdentity, String> {
    NodeIdentity::from_text(text)
        .map_err(|_| format!("Missing base name on line {}: {}", ctx.line_no, whole(caps)))
}

fn ambient_subject(caps: &Captures<'_>, ctx: &LineContext<'_>) -> Result<String, String> {
    ctx.subject
        .map(str::to_string)
        .ok_or_else(|| format!("No subject in scope for line {}: {}", ctx.line_no, whole(caps)))
}

/// Quotes are dropped so the name fits inside a quoted `define relation` statement
fn relation_name(text: &str) -> String {
    normalize_id(&text.replace(['\'', '"'], ""))
}

fn unquote(text: &str) -> &str {
    text.trim()
        .trim_matches(|c| c == '\'' || c == '"')
        .trim()
}

fn build_define_attribute(caps: &Captures<'_>, _ctx: &LineContext<'_>) -> Result<Fact, String> {
    let name = normalize_id(&capture(caps, "name").unwrap_or_default());
    let data_type = capture(caps, "type").unwrap_or_default().to_lowercase();
    let applicable_to = capture(caps, "classes")
        .map(|classes| {
            classes
                .split(',')
                .map(unquote)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(Fact::Define(DefineFact {
        name,
        definition: Definition::Attribute {
            data_type,
            unit: capture(caps, "unit"),
            applicable_to,
        },
    }))
}

fn build_define_relation(caps: &Captures<'_>, _ctx: &LineContext<'_>) -> Result<Fact, String> {
    Ok(Fact::Define(DefineFact {
        name: normalize_id(&capture(caps, "name").unwrap_or_default()),
        definition: Definition::Relation {
            inverse: normalize_id(&capture(caps, "inverse").unwrap_or_default()),
            domain: capture(caps, "domain"),
            range: capture(caps, "range"),
        },
    }))
}

fn build_structural_relation(caps: &Captures<'_>, ctx: &LineContext<'_>) -> Result<Fact, String> {
    let subject = identity(&capture(caps, "subject").unwrap_or_default(), caps, ctx)?;
    let object = identity(&capture(caps, "object").unwrap_or_default(), caps, ctx)?;

    Ok(Fact::Relation(RelationFact {
        subject: subject.id,
        name: relation_name(&capture(caps, "relation").unwrap_or_default()),
        object,
        adverb: None,
        modality: None,
        morph: None,
    }))
}

fn build_is_a(caps: &Captures<'_>, ctx: &LineContext<'_>) -> Result<Fact, String> {
    let subject_text = capture(caps, "subject").unwrap_or_default();
    let subject = identity(&subject_text, caps, ctx)?;

    let mut fact = NodeFact::from_identity(subject);
    fact.name = subject_text;
    fact.is_a = capture(caps, "object");
    Ok(Fact::Node(fact))
}

fn build_assign_attribute(caps: &Captures<'_>, ctx: &LineContext<'_>) -> Result<Fact, String> {
    let target = identity(&capture(caps, "subject").unwrap_or_default(), caps, ctx)?;
    let value = unquote(&capture(caps, "value").unwrap_or_default()).to_string();
    if value.is_empty() {
        return Err(format!("Missing value on line {}: {}", ctx.line_no, whole(caps)));
    }

    Ok(Fact::Attribute(AttributeFact {
        target: target.id,
        name: normalize_id(&capture(caps, "name").unwrap_or_default()),
        value,
        unit: capture(caps, "unit"),
        adverb: None,
        modality: None,
        morph: ctx.morph.map(str::to_string),
    }))
}

fn build_markup_relation(caps: &Captures<'_>, ctx: &LineContext<'_>) -> Result<Fact, String> {
    let subject = ambient_subject(caps, ctx)?;
    let markup = MarkupExtractor::extract(&capture(caps, "target").unwrap_or_default());
    let object = NodeIdentity::from_markup(&markup)
        .map_err(|_| format!("Missing base name on line {}: {}", ctx.line_no, whole(caps)))?;

    Ok(Fact::Relation(RelationFact {
        subject,
        name: relation_name(&capture(caps, "relation").unwrap_or_default()),
        object,
        adverb: capture(caps, "adverb").or(markup.adverb),
        modality: capture(caps, "modality"),
        morph: ctx.morph.map(str::to_string),
    }))
}

fn build_markup_attribute(caps: &Captures<'_>, ctx: &LineContext<'_>) -> Result<Fact, String> {
    let target = ambient_subject(caps, ctx)?;
    let name = normalize_id(&MarkupExtractor::strip_base(
        &capture(caps, "name").unwrap_or_default(),
    ));
    if name.is_empty() {
        return Err(format!("Missing attribute name on line {}: {}", ctx.line_no, whole(caps)));
    }

    let parts = MarkupExtractor::split_value(&capture(caps, "value").unwrap_or_default());
    if parts.value.is_empty() {
        return Err(format!("Missing value on line {}: {}", ctx.line_no, whole(caps)));
    }

    Ok(Fact::Attribute(AttributeFact {
        target,
        name,
        value: parts.value,
        unit: parts.unit,
        adverb: parts.adverb,
        modality: parts.modality,
        morph: ctx.morph.map(str::to_string),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fact::DefineKind;
    use pretty_assertions::assert_eq;

    fn parse(line: &str, subject: Option<&str>) -> (Option<Fact>, Vec<String>) {
        let mut log = Vec::new();
        let mut ctx = LineContext::new(1);
        ctx.subject = subject;
        let fact = FactParser::new().parse_line(line, &ctx, &mut log);
        (fact, log)
    }

    #[test]
    fn shape_priority_order() {
        let names: Vec<_> = FactParser::new().shapes().iter().map(Shape::name).collect();
        assert_eq!(
            names,
            vec![
                "define_attribute",
                "define_relation",
                "structural_relation",
                "is_a",
                "assign_attribute",
                "markup_relation",
                "markup_attribute",
            ]
        );
    }

    #[test]
    fn part_of_wins_over_is_a() {
        let parser = FactParser::new();
        assert_eq!(parser.classify("Paris is part of France."), Some("structural_relation"));
        assert_eq!(parser.classify("Paris is a city."), Some("is_a"));
        assert_eq!(parser.classify("Alice member of chess club."), Some("structural_relation"));
    }

    #[test]
    fn parses_define_attribute() {
        let (fact, log) = parse(
            "define attribute 'Height' as a float with unit 'm' applicable to person, building.",
            None,
        );
        assert!(log.is_empty());
        let Some(Fact::Define(define)) = fact else {
            panic!("expected define fact");
        };
        assert_eq!(define.name, "height");
        assert_eq!(define.kind(), DefineKind::Attribute);
        assert_eq!(
            define.definition,
            Definition::Attribute {
                data_type: "float".to_string(),
                unit: Some("m".to_string()),
                applicable_to: vec!["person".to_string(), "building".to_string()],
            }
        );
    }

    #[test]
    fn parses_define_relation() {
        let (fact, _) = parse(
            "define relation 'teaches' with inverse 'taught by' between 'person' and 'person'.",
            None,
        );
        let Some(Fact::Define(define)) = fact else {
            panic!("expected define fact");
        };
        assert_eq!(define.name, "teaches");
        assert_eq!(
            define.definition,
            Definition::Relation {
                inverse: "taught_by".to_string(),
                domain: Some("person".to_string()),
                range: Some("person".to_string()),
            }
        );
    }

    #[test]
    fn parses_structural_relation() {
        let (fact, _) = parse("Paris is part of France.", None);
        let Some(Fact::Relation(rel)) = fact else {
            panic!("expected relation fact");
        };
        assert_eq!(rel.subject, "paris");
        assert_eq!(rel.name, "part_of");
        assert_eq!(rel.object.id, "france");
    }

    #[test]
    fn parses_is_a() {
        let (fact, _) = parse("Emmy Noether is a mathematician.", None);
        let Some(Fact::Node(node)) = fact else {
            panic!("expected node fact");
        };
        assert_eq!(node.id, "emmy_noether");
        assert_eq!(node.name, "Emmy Noether");
        assert_eq!(node.is_a.as_deref(), Some("mathematician"));
    }

    #[test]
    fn parses_assign_attribute() {
        let (fact, _) = parse(
            "assign attribute 'mass' to 'Earth' with value 5.97e24 and unit 'kg'",
            None,
        );
        let Some(Fact::Attribute(attr)) = fact else {
            panic!("expected attribute fact");
        };
        assert_eq!(attr.target, "earth");
        assert_eq!(attr.name, "mass");
        assert_eq!(attr.value, "5.97e24");
        assert_eq!(attr.unit.as_deref(), Some("kg"));
    }

    #[test]
    fn parses_markup_relation() {
        let (fact, log) = parse(
            "++frequently++ <collaborates with> *some* **male** mathematicians [often]",
            Some("all_female_mathematicians"),
        );
        assert!(log.is_empty(), "{log:?}");
        let Some(Fact::Relation(rel)) = fact else {
            panic!("expected relation fact");
        };
        assert_eq!(rel.subject, "all_female_mathematicians");
        assert_eq!(rel.name, "collaborates_with");
        assert_eq!(rel.object.id, "some_male_mathematicians");
        assert_eq!(rel.adverb.as_deref(), Some("frequently"));
        assert_eq!(rel.modality.as_deref(), Some("often"));
    }

    #[test]
    fn parses_markup_attribute() {
        let (fact, _) = parse("has height: ++roughly++ 1.8 *m* [likely]", Some("alice"));
        let Some(Fact::Attribute(attr)) = fact else {
            panic!("expected attribute fact");
        };
        assert_eq!(attr.target, "alice");
        assert_eq!(attr.name, "height");
        assert_eq!(attr.value, "1.8");
        assert_eq!(attr.unit.as_deref(), Some("m"));
        assert_eq!(attr.adverb.as_deref(), Some("roughly"));
        assert_eq!(attr.modality.as_deref(), Some("likely"));
    }

    #[test]
    fn declare_prefix_is_stripped() {
        let (fact, _) = parse("declare: Oslo is a city", None);
        assert!(matches!(fact, Some(Fact::Node(n)) if n.id == "oslo"));
    }

    #[test]
    fn unrecognized_line_is_logged() {
        let (fact, log) = parse("just some words", None);
        assert!(fact.is_none());
        assert_eq!(log, vec!["Unrecognized line 1: just some words".to_string()]);
    }

    #[test]
    fn markup_statement_without_subject_is_logged() {
        let (fact, log) = parse("<likes> pizza", None);
        assert!(fact.is_none());
        assert!(log[0].starts_with("No subject in scope for line 1"));
    }

    #[test]
    fn markup_relation_without_base_is_dropped() {
        let (fact, log) = parse("<likes> **spicy**", Some("bob"));
        assert!(fact.is_none());
        assert!(log[0].starts_with("Missing base name on line 1"));
    }

    #[test]
    fn relation_name_drops_quotes() {
        let (fact, _) = parse("<don't> Bob", Some("alice"));
        let Some(Fact::Relation(rel)) = fact else {
            panic!("expected relation fact");
        };
        assert_eq!(rel.name, "dont");
    }

    #[test]
    fn attribute_with_is_in_value_is_not_is_a() {
        let (fact, _) = parse("has motto: this is fine", Some("bob"));
        assert!(matches!(fact, Some(Fact::Attribute(a)) if a.value == "this is fine"));
    }
}
