//! NDF Controlled Natural Language
//!
//! Turns lightweight inline markup into typed facts.
//!
//! # Core Concepts
//!
//! - [`MarkupExtractor`]: pulls qualifier (`**x**`), quantifier (`*x*`),
//!   adverb (`++x++`) and modality (`[x]`) markup out of a text span
//! - [`compose_id`] / [`compose_name`]: stable node identifiers and display names
//! - [`FactParser`]: ordered table of statement shapes, first match wins
//! - [`DocumentReader`]: splits a document into node sections and `:::cnl` blocks
//!
//! # Pipeline
//!
//! ```text
//! text → DocumentReader → FactParser (per line) → MarkupExtractor → compose_id → Fact
//! ```
//!
//! # Example
//!
//! ```rust
//! use ndf_cnl::{read_document, Fact};
//!
//! let doc = read_document("# *all* **female** mathematicians\n:::cnl\nhas field: mathematics\n:::");
//! assert!(doc.diagnostics.is_empty());
//! assert!(matches!(&doc.facts[0], Fact::Node(n) if n.id == "all_female_mathematicians"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod document;
pub mod error;
pub mod fact;
pub mod ident;
pub mod markup;
pub mod parser;

// Re-exports
pub use document::{read_document, DocumentReader, ParsedDocument};
pub use error::CnlError;
pub use fact::{AttributeFact, DefineFact, DefineKind, Definition, Fact, NodeFact, RelationFact};
pub use ident::{compose_id, compose_name, normalize_id, NodeIdentity};
pub use markup::{Markup, MarkupExtractor, ValueMarkup};
pub use parser::{FactParser, LineContext, Shape};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with CNL text
    pub use crate::{
        compose_id, compose_name, normalize_id, read_document, CnlError, DocumentReader, Fact,
        FactParser, LineContext, MarkupExtractor, NodeIdentity, ParsedDocument,
    };
}
