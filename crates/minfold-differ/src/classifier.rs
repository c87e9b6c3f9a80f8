//! Change Classifier (component C4, spec §4.4): decides, per column change
//! on the same table, whether an in-place `ALTER COLUMN` is legal (`Modify`)
//! or the column must be dropped and re-added (`Rebuild`).

use minfold_schema::{Column, Table};

use crate::change::ColumnChange;

/// Classify an `(old, new)` column pair that the differ has already
/// determined are the same logical column with unequal metadata. Returns
/// the tagged `ColumnChange` variant directly, so callers cannot construct
/// an inconsistent Modify/Rebuild (spec §9 "Variants over flags").
pub fn classify(old: &Column, new: &Column, old_table: &Table) -> ColumnChange {
    if needs_rebuild(old, new, old_table) {
        ColumnChange::Rebuild(old.clone(), new.clone())
    } else {
        ColumnChange::Modify(old.clone(), new.clone())
    }
}

fn needs_rebuild(old: &Column, new: &Column, old_table: &Table) -> bool {
    legacy_lob_boundary_crossed(old, new)
        || timestamp_involved(old, new)
        || identity_changed(old, new)
        || computed_toggled_or_changed(old, new)
        || ordinal_change_with_dependency(old, new, old_table)
}

/// Rule 1: any transition into or out of TEXT/NTEXT/IMAGE.
fn legacy_lob_boundary_crossed(old: &Column, new: &Column) -> bool {
    old.sql_type.is_legacy_lob() != new.sql_type.is_legacy_lob()
}

/// Rule 2: either side is TIMESTAMP/ROWVERSION.
fn timestamp_involved(old: &Column, new: &Column) -> bool {
    old.sql_type.is_timestamp() || new.sql_type.is_timestamp()
}

/// Rule 3: identity toggle, or both identity with differing seed/increment.
fn identity_changed(old: &Column, new: &Column) -> bool {
    if old.is_identity != new.is_identity {
        return true;
    }
    if old.is_identity && new.is_identity {
        return old.identity_seed != new.identity_seed || old.identity_increment != new.identity_increment;
    }
    false
}

/// Rule 4: computed toggle, or both computed with differing normalized SQL.
fn computed_toggled_or_changed(old: &Column, new: &Column) -> bool {
    if old.is_computed != new.is_computed {
        return true;
    }
    if old.is_computed && new.is_computed {
        return match (&old.computed_sql, &new.computed_sql) {
            (Some(a), Some(b)) => minfold_schema::normalize::normalize_whitespace(a)
                != minfold_schema::normalize::normalize_whitespace(b),
            (None, None) => false,
            _ => true,
        };
    }
    false
}

/// Rule 5: ordinal position change combined with a dependency — the column
/// is itself computed, is referenced by another computed column's
/// expression, or participates in any index.
fn ordinal_change_with_dependency(old: &Column, new: &Column, old_table: &Table) -> bool {
    if old.ordinal_position == new.ordinal_position {
        return false;
    }

    if old.is_computed {
        return true;
    }

    let referenced_by_computed_sibling = old_table.columns.values().any(|sibling| {
        sibling.is_computed
            && sibling
                .computed_sql
                .as_deref()
                .map(|expr| Column::referenced_by_expression(&old.name, expr))
                .unwrap_or(false)
    });
    if referenced_by_computed_sibling {
        return true;
    }

    old_table.indexes.iter().any(|idx| idx.covers_column(&old.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use minfold_schema::{Index, SqlType};

    fn plain_column(name: &str, ordinal: i32) -> Column {
        Column {
            name: name.into(),
            sql_type: SqlType::Int,
            length: None,
            precision: None,
            scale: None,
            is_nullable: true,
            is_identity: false,
            identity_seed: None,
            identity_increment: None,
            is_computed: false,
            computed_sql: None,
            is_primary_key: false,
            default_value: None,
            default_constraint_name: None,
            ordinal_position: ordinal,
            foreign_keys: vec![],
        }
    }

    fn table_with(columns: Vec<Column>, indexes: Vec<Index>) -> Table {
        let mut t = Table::new("T", "dbo");
        for c in columns {
            t.add_column(c);
        }
        t.indexes = indexes;
        t
    }

    #[test]
    fn varchar_max_widen_is_modify() {
        let old = plain_column("note", 1);
        let mut new = old.clone();
        new.sql_type = SqlType::VarChar;
        let mut old = old;
        old.sql_type = SqlType::VarChar;
        old.length = Some(20);
        new.length = Some(-1);
        let table = table_with(vec![old.clone()], vec![]);
        assert!(matches!(classify(&old, &new, &table), ColumnChange::Modify(_, _)));
    }

    #[test]
    fn text_to_varchar_max_is_rebuild() {
        let mut old = plain_column("body", 1);
        old.sql_type = SqlType::Text;
        let mut new = old.clone();
        new.sql_type = SqlType::NVarChar;
        new.length = Some(-1);
        let table = table_with(vec![old.clone()], vec![]);
        assert!(matches!(classify(&old, &new, &table), ColumnChange::Rebuild(_, _)));
    }

    #[test]
    fn timestamp_either_side_is_rebuild() {
        let mut old = plain_column("rv", 1);
        old.sql_type = SqlType::Timestamp;
        let mut new = old.clone();
        new.sql_type = SqlType::Binary;
        new.length = Some(8);
        let table = table_with(vec![old.clone()], vec![]);
        assert!(matches!(classify(&old, &new, &table), ColumnChange::Rebuild(_, _)));
    }

    #[test]
    fn identity_toggle_is_rebuild() {
        let old = plain_column("id", 1);
        let mut new = old.clone();
        new.is_identity = true;
        new.identity_seed = Some(1);
        new.identity_increment = Some(1);
        let table = table_with(vec![old.clone()], vec![]);
        assert!(matches!(classify(&old, &new, &table), ColumnChange::Rebuild(_, _)));
    }

    #[test]
    fn identity_seed_change_is_rebuild() {
        let mut old = plain_column("id", 1);
        old.is_identity = true;
        old.identity_seed = Some(1);
        old.identity_increment = Some(1);
        let mut new = old.clone();
        new.identity_seed = Some(100);
        let table = table_with(vec![old.clone()], vec![]);
        assert!(matches!(classify(&old, &new, &table), ColumnChange::Rebuild(_, _)));
    }

    #[test]
    fn computed_expression_change_is_rebuild() {
        let mut old = plain_column("total", 1);
        old.is_computed = true;
        old.computed_sql = Some("[a] + [b]".into());
        let mut new = old.clone();
        new.computed_sql = Some("[a] - [b]".into());
        let table = table_with(vec![old.clone()], vec![]);
        assert!(matches!(classify(&old, &new, &table), ColumnChange::Rebuild(_, _)));
    }

    #[test]
    fn computed_reformatted_same_expression_is_modify() {
        let mut old = plain_column("total", 1);
        old.is_computed = true;
        old.computed_sql = Some("[a]+[b]".into());
        let mut new = old.clone();
        new.computed_sql = Some("[a]  +  [b]".into());
        let table = table_with(vec![old.clone()], vec![]);
        assert!(matches!(classify(&old, &new, &table), ColumnChange::Modify(_, _)));
    }

    #[test]
    fn reorder_of_plain_unindexed_column_is_modify() {
        let old = plain_column("note", 3);
        let mut new = old.clone();
        new.ordinal_position = 5;
        let table = table_with(vec![old.clone()], vec![]);
        assert!(matches!(classify(&old, &new, &table), ColumnChange::Modify(_, _)));
    }

    #[test]
    fn reorder_of_indexed_column_is_rebuild() {
        let old = plain_column("email", 3);
        let mut new = old.clone();
        new.ordinal_position = 5;
        let index = Index {
            name: "IX_T_email".into(),
            schema: "dbo".into(),
            table: "T".into(),
            columns: vec!["email".into()],
            is_unique: true,
        };
        let table = table_with(vec![old.clone()], vec![index]);
        assert!(matches!(classify(&old, &new, &table), ColumnChange::Rebuild(_, _)));
    }

    #[test]
    fn reorder_of_column_referenced_by_computed_sibling_is_rebuild() {
        let price = plain_column("price", 2);
        let mut new_price = price.clone();
        new_price.ordinal_position = 4;

        let mut total = plain_column("total", 3);
        total.is_computed = true;
        total.computed_sql = Some("[price] * 2".into());

        let table = table_with(vec![price.clone(), total], vec![]);
        assert!(matches!(classify(&price, &new_price, &table), ColumnChange::Rebuild(_, _)));
    }

    #[test]
    fn reorder_without_ordinal_change_is_never_triggered_by_rule_5() {
        let old = plain_column("email", 3);
        let new = old.clone();
        let index = Index {
            name: "IX_T_email".into(),
            schema: "dbo".into(),
            table: "T".into(),
            columns: vec!["email".into()],
            is_unique: true,
        };
        let table = table_with(vec![old.clone()], vec![index]);
        assert!(matches!(classify(&old, &new, &table), ColumnChange::Modify(_, _)));
    }
}
