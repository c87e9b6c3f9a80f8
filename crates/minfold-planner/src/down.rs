//! Down-script planning (spec §4.5.2): the inverse diff run through the same
//! phase skeleton as the up script, with the ordering inversions the spec
//! calls out. Rather than re-diffing the two schemas in the opposite
//! direction, the up [`SchemaDiff`] is inverted in place — every `Add`
//! becomes a `Drop` and vice versa, every `Modify`/`Rebuild` swaps its old
//! and new side — which keeps the down script symmetric with the exact up
//! script that produced it instead of risking a second, possibly divergent,
//! comparison.

use minfold_connector::PlanningObserver;
use minfold_differ::{ColumnChange, ForeignKeyChange, IndexChange, ProcedureChange, SchemaDiff, SequenceChange, TableDiff};
use minfold_schema::Schema;

use crate::script::ScriptBuilder;
use crate::up;

/// Invert every change in `diff` so it reads as "undo the up script".
pub fn invert_diff(diff: &SchemaDiff) -> SchemaDiff {
    let mut inverted = SchemaDiff::new();
    inverted.new_tables = diff.dropped_tables.clone();
    inverted.dropped_tables = diff.new_tables.clone();

    for table_diff in &diff.modified_tables {
        let mut inv = TableDiff::new(table_diff.table_name.clone());
        inv.column_order_changed = table_diff.column_order_changed;

        for change in &table_diff.column_changes {
            inv.column_changes.push(match change {
                ColumnChange::Add(c) => ColumnChange::Drop(c.clone()),
                ColumnChange::Drop(c) => ColumnChange::Add(c.clone()),
                ColumnChange::Modify(old, new) => ColumnChange::Modify(new.clone(), old.clone()),
                ColumnChange::Rebuild(old, new) => ColumnChange::Rebuild(new.clone(), old.clone()),
            });
        }
        for change in &table_diff.foreign_key_changes {
            inv.foreign_key_changes.push(match change {
                ForeignKeyChange::Add(rows) => ForeignKeyChange::Drop(rows.clone()),
                ForeignKeyChange::Drop(rows) => ForeignKeyChange::Add(rows.clone()),
                ForeignKeyChange::Modify(old, new) => ForeignKeyChange::Modify(new.clone(), old.clone()),
            });
        }
        for change in &table_diff.index_changes {
            inv.index_changes.push(match change {
                IndexChange::Add(i) => IndexChange::Drop(i.clone()),
                IndexChange::Drop(i) => IndexChange::Add(i.clone()),
                IndexChange::Modify(old, new) => IndexChange::Modify(new.clone(), old.clone()),
            });
        }

        inverted.modified_tables.push(inv);
    }

    for change in &diff.sequence_changes {
        inverted.sequence_changes.push(match change {
            SequenceChange::Add(s) => SequenceChange::Drop(s.clone()),
            SequenceChange::Drop(s) => SequenceChange::Add(s.clone()),
            SequenceChange::Modify(old, new) => SequenceChange::Modify(new.clone(), old.clone()),
        });
    }
    for change in &diff.procedure_changes {
        inverted.procedure_changes.push(match change {
            ProcedureChange::Add(p) => ProcedureChange::Drop(p.clone()),
            ProcedureChange::Drop(p) => ProcedureChange::Add(p.clone()),
            ProcedureChange::Modify(old, new) => ProcedureChange::Modify(new.clone(), old.clone()),
        });
    }

    inverted
}

/// Plan the down script. `current`/`target` are the same two schemas passed
/// to [`minfold_differ::diff`] for the up direction — by the time the down
/// script runs, the live database is in the `target` shape, and `current` is
/// what it restores to, so phase helpers that need "the live schema" are
/// given `target` and phase helpers that need "the desired final shape" are
/// given `current`.
#[tracing::instrument(skip_all)]
pub fn plan_down(diff: &SchemaDiff, current: &Schema, target: &Schema, observer: &dyn PlanningObserver) -> String {
    let inverted = invert_diff(diff);

    let mut sb = ScriptBuilder::new(observer);
    sb.phase("D1: Drop Stored Procedures", up::drop_procedures(&inverted));
    sb.phase("D2: Drop Sequences", up::drop_sequences(&inverted));
    sb.phase("D3: Drop Foreign Keys", up::drop_foreign_keys(&inverted, target, observer));
    sb.phase("D4: Drop Primary Keys", up::drop_primary_keys(&inverted, target, observer));
    sb.phase("D5: Drop Tables", up::drop_tables(&inverted));
    sb.phase("D6: Create Sequences", up::create_sequences(&inverted));
    sb.phase("D7: Create Tables", up::create_tables(&inverted));
    sb.phase("D8: Restore Columns", up::modify_columns(&inverted, target, observer));
    // PK restoration lives inside `constraints`, which — as in the up
    // script — runs after column restoration, satisfying the "PK restore
    // deferred until columns exist" ordering without a separate buffer.
    sb.phase("D9: Constraints", up::constraints(&inverted, target, observer));
    sb.phase("D10: Column Reorder", up::column_reorder(&inverted, target, current, observer));
    sb.phase("D11: Create Stored Procedures", up::create_procedures(&inverted));
    sb.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use minfold_connector::NullObserver;
    use minfold_schema::{Column, SqlType, Table};
    use pretty_assertions::assert_eq;

    fn int_column(name: &str, ordinal: i32, pk: bool) -> Column {
        Column {
            name: name.into(),
            sql_type: SqlType::Int,
            length: None,
            precision: None,
            scale: None,
            is_nullable: !pk,
            is_identity: false,
            identity_seed: None,
            identity_increment: None,
            is_computed: false,
            computed_sql: None,
            is_primary_key: pk,
            default_value: None,
            default_constraint_name: None,
            ordinal_position: ordinal,
            foreign_keys: vec![],
        }
    }

    #[test]
    fn inverting_an_added_table_makes_it_a_dropped_table() {
        let mut target = Schema::new();
        let mut t = Table::new("Orders", "dbo");
        t.add_column(int_column("id", 1, true));
        target.add_table(t);

        let diff = minfold_differ::diff(&Schema::new(), &target);
        let inverted = invert_diff(&diff);

        assert_eq!(inverted.new_tables.len(), 0);
        assert_eq!(inverted.dropped_tables.len(), 1);
        assert_eq!(inverted.dropped_tables[0].name, "Orders");
    }

    #[test]
    fn down_script_recreates_table_the_up_script_dropped() {
        let mut current = Schema::new();
        let mut t = Table::new("Legacy", "dbo");
        t.add_column(int_column("id", 1, true));
        current.add_table(t);
        let target = Schema::new();

        let diff = minfold_differ::diff(&current, &target);
        let script = plan_down(&diff, &current, &target, &NullObserver);
        assert!(script.contains("CREATE TABLE [dbo].[Legacy]"));
    }
}
