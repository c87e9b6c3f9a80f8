use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferentialAction {
    NoAction,
    Cascade,
    SetNull,
    SetDefault,
}

/// One row of a (possibly multi-column) foreign key. Rows sharing the same
/// `(schema, table, name)` make up one logical constraint (spec §3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ForeignKey {
    pub name: String,
    pub schema: String,
    pub table: String,
    pub column: String,
    pub ref_schema: String,
    pub ref_table: String,
    pub ref_column: String,
    pub not_enforced: bool,
    pub not_for_replication: bool,
    pub delete_action: ReferentialAction,
    pub update_action: ReferentialAction,
}

impl ForeignKey {
    /// §4.1: equal when name, both endpoints, `not_enforced`,
    /// `not_for_replication`, and both referential actions match.
    pub fn semantically_equal(&self, other: &ForeignKey) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
            && self.schema.eq_ignore_ascii_case(&other.schema)
            && self.table.eq_ignore_ascii_case(&other.table)
            && self.column.eq_ignore_ascii_case(&other.column)
            && self.ref_schema.eq_ignore_ascii_case(&other.ref_schema)
            && self.ref_table.eq_ignore_ascii_case(&other.ref_table)
            && self.ref_column.eq_ignore_ascii_case(&other.ref_column)
            && self.not_enforced == other.not_enforced
            && self.not_for_replication == other.not_for_replication
            && self.delete_action == other.delete_action
            && self.update_action == other.update_action
    }
}
