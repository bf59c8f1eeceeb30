//! Testing utilities for NDF Studio workspace
//!
//! Shared documents, assembled registries and temporary stores.

#![allow(missing_docs)]

use ndf_cnl::read_document;
use ndf_graph::{Assembler, AssemblyReport, Registry, Schema};
use ndf_store::FsStore;
use std::sync::Arc;
use tempfile::TempDir;

pub const MATHEMATICIANS: &str = "# *all* **female** mathematicians
:::cnl
<collaborates_with> *some* **male** mathematicians [often]
has field: mathematics
:::";

pub const WATER: &str = "define attribute 'temperature' as a number with unit 'celsius'.
define relation 'found_in' with inverse 'contains'.

# Water
The most common liquid on Earth.

:::cnl
<found_in> Oceans
has state: liquid
has temperature: 20 *celsius*
:::

:::cnl ice
has state: solid
has temperature: ++usually++ -5 *celsius*
:::

# Oceans
:::cnl
Oceans part of Earth.
:::";

pub struct Assembled {
    pub registry: Registry,
    pub schema: Schema,
    pub report: AssemblyReport,
}

pub fn assemble(text: &str) -> Assembled {
    let doc = read_document(text);
    assert!(doc.diagnostics.is_empty(), "fixture did not parse: {:?}", doc.diagnostics);
    let mut registry = Registry::new();
    let mut schema = Schema::default();
    let report = Assembler::new(&mut registry, &mut schema)
        .apply_all(&doc.facts)
        .finish();
    Assembled {
        registry,
        schema,
        report,
    }
}

/// Filesystem store in a fresh temporary directory; keep the `TempDir` alive
pub fn temp_fs_store() -> (TempDir, Arc<FsStore>) {
    let dir = TempDir::new().expect("create temp dir");
    let store = Arc::new(FsStore::new(dir.path()));
    (dir, store)
}
