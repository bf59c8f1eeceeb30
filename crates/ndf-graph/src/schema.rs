//! Relation and attribute type schema
//!
//! Types are registered by `define ...` statements. Using an undefined type
//! is allowed; the assembler reports a [`SchemaSuggestion`] instead.

use indexmap::IndexMap;
use ndf_cnl::{DefineFact, DefineKind, Definition};
use serde::{Deserialize, Serialize};

/// Relation type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationType {
    /// Type name
    pub name: String,
    /// Inverse relation name
    pub inverse: String,
    /// Domain class
    #[serde(default)]
    pub domain: Option<String>,
    /// Range class
    #[serde(default)]
    pub range: Option<String>,
}

/// Attribute type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeType {
    /// Type name
    pub name: String,
    /// Value data type
    pub data_type: String,
    /// Default unit
    #[serde(default)]
    pub unit: Option<String>,
    /// Classes this attribute applies to; empty means any
    #[serde(default)]
    pub applicable_to: Vec<String>,
}

/// Suggestion to define a type that was used but never declared
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaSuggestion {
    /// Relation or attribute
    pub kind: DefineKind,
    /// Undefined type name
    pub name: String,
    /// Statement that would define it
    pub example: String,
}

impl SchemaSuggestion {
    /// Suggest defining a relation type
    #[must_use]
    pub fn relation(name: &str) -> Self {
        Self {
            kind: DefineKind::Relation,
            name: name.to_string(),
            example: format!("define relation '{name}' with inverse 'inverse_of_{name}'."),
        }
    }

    /// Suggest defining an attribute type, guessing the data type from a sample value
    #[must_use]
    pub fn attribute(name: &str, sample_value: &str, unit: Option<&str>) -> Self {
        let data_type = if sample_value.parse::<f64>().is_ok() {
            "number"
        } else {
            "string"
        };
        let example = match unit {
            Some(unit) => {
                format!("define attribute '{name}' as a {data_type} with unit '{unit}'.")
            }
            None => format!("define attribute '{name}' as a {data_type}."),
        };
        Self {
            kind: DefineKind::Attribute,
            name: name.to_string(),
            example,
        }
    }
}

/// Registered types for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Relation types by name
    #[serde(default)]
    pub relation_types: IndexMap<String, RelationType>,
    /// Attribute types by name
    #[serde(default)]
    pub attribute_types: IndexMap<String, AttributeType>,
}

impl Default for Schema {
    fn default() -> Self {
        let mut schema = Self::empty();
        for (name, inverse) in [
            ("is_a", "has_instance"),
            ("part_of", "has_part"),
            ("member_of", "has_member"),
        ] {
            schema.relation_types.insert(
                name.to_string(),
                RelationType {
                    name: name.to_string(),
                    inverse: inverse.to_string(),
                    domain: None,
                    range: None,
                },
            );
        }
        schema
    }
}

impl Schema {
    /// Schema without built-in relation types
    #[must_use]
    pub fn empty() -> Self {
        Self {
            relation_types: IndexMap::new(),
            attribute_types: IndexMap::new(),
        }
    }

    /// Register a definition, replacing any earlier one of the same name
    pub fn define(&mut self, fact: &DefineFact) {
        tracing::debug!(kind = %fact.kind(), name = %fact.name, "registering type");
        match &fact.definition {
            Definition::Attribute {
                data_type,
                unit,
                applicable_to,
            } => {
                self.attribute_types.insert(
                    fact.name.clone(),
                    AttributeType {
                        name: fact.name.clone(),
                        data_type: data_type.clone(),
                        unit: unit.clone(),
                        applicable_to: applicable_to.clone(),
                    },
                );
            }
            Definition::Relation {
                inverse,
                domain,
                range,
            } => {
                self.relation_types.insert(
                    fact.name.clone(),
                    RelationType {
                        name: fact.name.clone(),
                        inverse: inverse.clone(),
                        domain: domain.clone(),
                        range: range.clone(),
                    },
                );
            }
        }
    }

    /// True if `name` is a relation type or the inverse of one
    #[must_use]
    pub fn has_relation(&self, name: &str) -> bool {
        self.relation_types.contains_key(name)
            || self.relation_types.values().any(|t| t.inverse == name)
    }

    /// True if `name` is an attribute type
    #[inline]
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute_types.contains_key(name)
    }
}
