use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{Sequence, StoredProcedure, Table};

/// The name of the bookkeeping table the Applier owns (spec §4.6/§6). It
/// must never appear in an introspected `Schema` — callers filter it out at
/// the introspection boundary before handing a `Schema` to this crate.
pub const MIGRATIONS_TABLE_NAME: &str = "__MinfoldMigrations";

/// The full in-memory schema snapshot this engine diffs and plans over:
/// tables, sequences, and stored procedures, all keyed (for lookup) by
/// lowercased name while preserving the original casing on each value for
/// emitted SQL (spec §4.1).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Schema {
    pub tables: IndexMap<String, Table>,
    pub sequences: IndexMap<String, Sequence>,
    pub procedures: IndexMap<String, StoredProcedure>,
}

impl Schema {
    pub fn new() -> Self {
        Schema::default()
    }

    pub fn add_table(&mut self, table: Table) {
        self.tables.insert(table.name.to_lowercase(), table);
    }

    pub fn add_sequence(&mut self, sequence: Sequence) {
        self.sequences.insert(sequence.name.to_lowercase(), sequence);
    }

    pub fn add_procedure(&mut self, procedure: StoredProcedure) {
        self.procedures.insert(procedure.name.to_lowercase(), procedure);
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(&name.to_lowercase())
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.table(name).is_some()
    }

    pub fn sequence(&self, name: &str) -> Option<&Sequence> {
        self.sequences.get(&name.to_lowercase())
    }

    pub fn procedure(&self, name: &str) -> Option<&StoredProcedure> {
        self.procedures.get(&name.to_lowercase())
    }

    /// All foreign keys in the schema, flattened across every table. Used by
    /// the differ's cross-table type propagation pass (§4.3).
    pub fn all_foreign_keys(&self) -> impl Iterator<Item = &crate::ForeignKey> {
        self.tables.values().flat_map(|t| t.columns.values().flat_map(|c| c.foreign_keys.iter()))
    }
}
