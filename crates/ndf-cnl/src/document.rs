//! Document reader
//!
//! Splits a markdown-like document into node sections. A heading declares a
//! node; plain lines under it become the node's description; `:::cnl` blocks
//! hold statements scoped to that node.
//!
//! ```text
//! # *all* **female** mathematicians      ← node declaration
//! Mathematicians who are women.          ← description
//! :::cnl                                 ← block, default morph
//! <collaborates_with> *some* **male** mathematicians [often]
//! has field: mathematics
//! :::
//! :::cnl retired                         ← block targeting morph "retired"
//! has status: emeritus
//! :::
//! ```

use crate::fact::{Fact, NodeFact};
use crate::ident::NodeIdentity;
use crate::parser::{FactParser, LineContext};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#{1,6}\s+(.+?)\s*#*\s*$").expect("valid regex"));

static BLOCK_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^:::\s*cnl(?:\s+(.+?))?\s*$").expect("valid regex"));

static BLOCK_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^:::\s*$").expect("valid regex"));

/// Result of reading a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDocument {
    /// Facts in document order
    pub facts: Vec<Fact>,
    /// Human-readable diagnostics for skipped lines
    pub diagnostics: Vec<String>,
}

impl ParsedDocument {
    /// True when every line was understood
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Ids of nodes declared by the document
    #[must_use]
    pub fn declared_node_ids(&self) -> Vec<&str> {
        self.facts
            .iter()
            .filter_map(|fact| match fact {
                Fact::Node(node) => Some(node.id.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Default)]
struct Section {
    subject: Option<String>,
    fact_index: Option<usize>,
    description: Vec<String>,
}

#[derive(Debug)]
struct Block {
    morph: Option<String>,
    opened_at: usize,
}

/// Reads whole documents line by line
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentReader {
    parser: FactParser,
}

impl DocumentReader {
    /// Create reader
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            parser: FactParser::new(),
        }
    }

    /// Read a document into facts and diagnostics
    #[must_use]
    pub fn read(&self, text: &str) -> ParsedDocument {
        let mut doc = ParsedDocument::default();
        let mut section: Option<Section> = None;
        let mut block: Option<Block> = None;

        for (index, raw) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim();

            if block.is_some() {
                if BLOCK_CLOSE.is_match(line) {
                    block = None;
                    continue;
                }
                if line.is_empty() {
                    continue;
                }
                let ctx = LineContext {
                    line_no,
                    subject: section.as_ref().and_then(|s| s.subject.as_deref()),
                    morph: block.as_ref().and_then(|b| b.morph.as_deref()),
                };
                if let Some(fact) = self.parser.parse_line(line, &ctx, &mut doc.diagnostics) {
                    doc.facts.push(fact);
                }
                continue;
            }

            if let Some(caps) = BLOCK_OPEN.captures(line) {
                block = Some(Block {
                    morph: caps.get(1).map(|m| m.as_str().trim().to_string()),
                    opened_at: line_no,
                });
                continue;
            }

            if let Some(caps) = HEADING.captures(line) {
                Self::close_section(&mut doc, section.take());
                let heading = caps.get(1).map_or("", |m| m.as_str());
                section = Some(Self::open_section(&mut doc, heading, line_no));
                continue;
            }

            match section.as_mut() {
                Some(open) => {
                    if !line.is_empty() {
                        open.description.push(line.to_string());
                    }
                }
                None => {
                    let ctx = LineContext::new(line_no);
                    if let Some(fact) = self.parser.parse_line(line, &ctx, &mut doc.diagnostics) {
                        doc.facts.push(fact);
                    }
                }
            }
        }

        if let Some(open) = block {
            tracing::warn!(line = open.opened_at, "unterminated cnl block");
            doc.diagnostics.push(format!(
                "Unterminated CNL block opened on line {}",
                open.opened_at
            ));
        }
        Self::close_section(&mut doc, section);

        tracing::debug!(
            facts = doc.facts.len(),
            diagnostics = doc.diagnostics.len(),
            "read document"
        );
        doc
    }

    fn open_section(doc: &mut ParsedDocument, heading: &str, line_no: usize) -> Section {
        match NodeIdentity::from_text(heading) {
            Ok(identity) => {
                let subject = identity.id.clone();
                doc.facts.push(Fact::Node(NodeFact::from_identity(identity)));
                Section {
                    subject: Some(subject),
                    fact_index: Some(doc.facts.len() - 1),
                    description: Vec::new(),
                }
            }
            Err(_) => {
                tracing::warn!(line = line_no, "heading without base name");
                doc.diagnostics
                    .push(format!("Missing base name on line {line_no}: {heading}"));
                Section::default()
            }
        }
    }

    fn close_section(doc: &mut ParsedDocument, section: Option<Section>) {
        let Some(section) = section else {
            return;
        };
        if section.description.is_empty() {
            return;
        }
        if let Some(Fact::Node(node)) = section.fact_index.and_then(|i| doc.facts.get_mut(i)) {
            node.description = Some(section.description.join("\n"));
        }
    }
}

/// Read a document with the default reader
#[must_use]
pub fn read_document(text: &str) -> ParsedDocument {
    DocumentReader::new().read(text)
}
