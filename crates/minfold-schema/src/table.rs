use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{Column, Index};

/// Ordered mapping from lowercased column name to [`Column`]. Insertion
/// order is preserved by `IndexMap`, which is how the table's physical
/// column order is tracked alongside `Column::ordinal_position`.
pub type ColumnMap = IndexMap<String, Column>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Table {
    pub name: String,
    pub schema: String,
    pub columns: ColumnMap,
    pub indexes: Vec<Index>,
}

impl Table {
    pub fn new(name: impl Into<String>, schema: impl Into<String>) -> Self {
        Table {
            name: name.into(),
            schema: schema.into(),
            columns: ColumnMap::new(),
            indexes: Vec::new(),
        }
    }

    pub fn add_column(&mut self, column: Column) {
        self.columns.insert(column.name.to_lowercase(), column);
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(&name.to_lowercase())
    }

    /// Columns in physical (ordinal) order, irrespective of `IndexMap`
    /// insertion order — the two can diverge transiently while the
    /// in-memory model is being rebuilt by the differ/planner.
    pub fn columns_by_ordinal(&self) -> Vec<&Column> {
        let mut cols: Vec<&Column> = self.columns.values().collect();
        cols.sort_by_key(|c| c.ordinal_position);
        cols
    }

    pub fn index(&self, name: &str) -> Option<&Index> {
        self.indexes.iter().find(|i| i.name.eq_ignore_ascii_case(name))
    }

    /// The table's primary-key column names, in ordinal order.
    pub fn primary_key_columns(&self) -> Vec<&Column> {
        self.columns_by_ordinal()
            .into_iter()
            .filter(|c| c.is_primary_key)
            .collect()
    }

    /// Spec §3 invariant: ordinal positions are unique and form a
    /// contiguous 1-based sequence.
    pub fn ordinals_are_contiguous(&self) -> bool {
        let mut ordinals: Vec<i32> = self.columns.values().map(|c| c.ordinal_position).collect();
        ordinals.sort_unstable();
        ordinals.iter().enumerate().all(|(i, &pos)| pos == (i as i32) + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql_type::SqlType;
    use pretty_assertions::assert_eq;

    fn col(name: &str, ordinal: i32) -> Column {
        Column {
            name: name.into(),
            sql_type: SqlType::Int,
            length: None,
            precision: None,
            scale: None,
            is_nullable: false,
            is_identity: false,
            identity_seed: None,
            identity_increment: None,
            is_computed: false,
            computed_sql: None,
            is_primary_key: ordinal == 1,
            default_value: None,
            default_constraint_name: None,
            ordinal_position: ordinal,
            foreign_keys: vec![],
        }
    }

    #[test]
    fn columns_by_ordinal_ignores_insertion_order() {
        let mut t = Table::new("T", "dbo");
        t.add_column(col("b", 2));
        t.add_column(col("a", 1));
        let ordered: Vec<&str> = t.columns_by_ordinal().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(ordered, vec!["a", "b"]);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut t = Table::new("T", "dbo");
        t.add_column(col("Id", 1));
        assert!(t.column("ID").is_some());
        assert!(t.column("id").is_some());
    }

    #[test]
    fn contiguity_detects_gaps() {
        let mut t = Table::new("T", "dbo");
        t.add_column(col("a", 1));
        t.add_column(col("b", 3));
        assert!(!t.ordinals_are_contiguous());
    }
}
