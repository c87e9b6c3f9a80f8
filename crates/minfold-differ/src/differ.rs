//! Schema Differ (component C3, spec §4.3): produces a [`SchemaDiff`]
//! between a current and a target [`Schema`], including cross-table
//! propagation of referenced-column type changes.

use std::collections::BTreeMap;

use minfold_schema::{ForeignKey, Index, Schema, Table};

use crate::change::{
    ForeignKeyChange, IndexChange, ProcedureChange, SchemaDiff, SequenceChange, TableDiff,
};
use crate::classifier::classify;

/// Diff `current` against `target`. Pure and infallible — malformed inputs
/// are the caller's invariant (spec §4.3 "Failure").
pub fn diff(current: &Schema, target: &Schema) -> SchemaDiff {
    let mut result = SchemaDiff::new();

    for (key, table) in &target.tables {
        if !current.tables.contains_key(key) {
            result.new_tables.push(table.clone());
        }
    }
    for (key, table) in &current.tables {
        if !target.tables.contains_key(key) {
            result.dropped_tables.push(table.clone());
        }
    }

    for (key, current_table) in &current.tables {
        if let Some(target_table) = target.tables.get(key) {
            let table_diff = compare_tables(current_table, target_table);
            if !table_diff.is_empty() {
                result.modified_tables.push(table_diff);
            }
        }
    }

    result.sequence_changes = diff_sequences(current, target);
    result.procedure_changes = diff_procedures(current, target);

    propagate_cross_table_type_changes(current, target, &mut result);

    result
}

/// CompareTables (spec §4.3): column/FK/index set-diff for one table present
/// on both sides, plus the column-order-only detection.
fn compare_tables(current: &Table, target: &Table) -> TableDiff {
    let mut diff = TableDiff::new(target.name.clone());

    for target_col in target.columns_by_ordinal() {
        match current.column(&target_col.name) {
            None => diff.column_changes.push(crate::change::ColumnChange::Add(target_col.clone())),
            Some(current_col) => {
                if !current_col.semantically_equal(target_col) {
                    diff.column_changes.push(classify(current_col, target_col, current));
                }
            }
        }
    }
    for current_col in current.columns_by_ordinal() {
        if target.column(&current_col.name).is_none() {
            diff.column_changes.push(crate::change::ColumnChange::Drop(current_col.clone()));
        }
    }

    diff.foreign_key_changes = diff_foreign_keys(current, target);
    diff.index_changes = diff_indexes(current, target);

    if diff.column_changes.is_empty()
        && diff.foreign_key_changes.is_empty()
        && diff.index_changes.is_empty()
        && column_order_differs(current, target)
    {
        diff.column_order_changed = true;
    }

    diff
}

/// Column-order-only difference (spec §4.3): same column names, same
/// metadata, different physical order.
fn column_order_differs(current: &Table, target: &Table) -> bool {
    let current_order: Vec<String> = current
        .columns_by_ordinal()
        .iter()
        .map(|c| c.name.to_lowercase())
        .collect();
    let target_order: Vec<String> = target
        .columns_by_ordinal()
        .iter()
        .map(|c| c.name.to_lowercase())
        .collect();
    current_order != target_order
}

fn foreign_keys_by_name(table: &Table) -> BTreeMap<String, Vec<ForeignKey>> {
    let mut map: BTreeMap<String, Vec<ForeignKey>> = BTreeMap::new();
    for column in table.columns.values() {
        for fk in &column.foreign_keys {
            map.entry(fk.name.to_lowercase()).or_default().push(fk.clone());
        }
    }
    map
}

fn fk_groups_equal(a: &[ForeignKey], b: &[ForeignKey]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a_sorted = a.to_vec();
    let mut b_sorted = b.to_vec();
    a_sorted.sort_by(|x, y| x.column.to_lowercase().cmp(&y.column.to_lowercase()));
    b_sorted.sort_by(|x, y| x.column.to_lowercase().cmp(&y.column.to_lowercase()));
    a_sorted
        .iter()
        .zip(b_sorted.iter())
        .all(|(x, y)| x.semantically_equal(y))
}

fn diff_foreign_keys(current: &Table, target: &Table) -> Vec<ForeignKeyChange> {
    let current_fks = foreign_keys_by_name(current);
    let target_fks = foreign_keys_by_name(target);
    let mut changes = Vec::new();

    for (name, target_rows) in &target_fks {
        match current_fks.get(name) {
            None => changes.push(ForeignKeyChange::Add(target_rows.clone())),
            Some(current_rows) => {
                if !fk_groups_equal(current_rows, target_rows) {
                    changes.push(ForeignKeyChange::Modify(current_rows.clone(), target_rows.clone()));
                }
            }
        }
    }
    for (name, current_rows) in &current_fks {
        if !target_fks.contains_key(name) {
            changes.push(ForeignKeyChange::Drop(current_rows.clone()));
        }
    }

    changes
}

fn indexes_by_name(table: &Table) -> BTreeMap<String, &Index> {
    table.indexes.iter().map(|i| (i.name.to_lowercase(), i)).collect()
}

fn diff_indexes(current: &Table, target: &Table) -> Vec<IndexChange> {
    let current_idx = indexes_by_name(current);
    let target_idx = indexes_by_name(target);
    let mut changes = Vec::new();

    for (name, target_index) in &target_idx {
        match current_idx.get(name) {
            None => changes.push(IndexChange::Add((*target_index).clone())),
            Some(current_index) => {
                if !current_index.semantically_equal(target_index) {
                    changes.push(IndexChange::Modify((*current_index).clone(), (*target_index).clone()));
                }
            }
        }
    }
    for (name, current_index) in &current_idx {
        if !target_idx.contains_key(name) {
            changes.push(IndexChange::Drop((*current_index).clone()));
        }
    }

    changes
}

fn diff_sequences(current: &Schema, target: &Schema) -> Vec<SequenceChange> {
    let mut changes = Vec::new();
    for (key, target_seq) in &target.sequences {
        match current.sequences.get(key) {
            None => changes.push(SequenceChange::Add(target_seq.clone())),
            Some(current_seq) => {
                if !current_seq.semantically_equal(target_seq) {
                    changes.push(SequenceChange::Modify(current_seq.clone(), target_seq.clone()));
                }
            }
        }
    }
    for (key, current_seq) in &current.sequences {
        if !target.sequences.contains_key(key) {
            changes.push(SequenceChange::Drop(current_seq.clone()));
        }
    }
    changes
}

fn diff_procedures(current: &Schema, target: &Schema) -> Vec<ProcedureChange> {
    let mut changes = Vec::new();
    for (key, target_proc) in &target.procedures {
        match current.procedures.get(key) {
            None => changes.push(ProcedureChange::Add(target_proc.clone())),
            Some(current_proc) => {
                if !current_proc.semantically_equal(target_proc) {
                    changes.push(ProcedureChange::Modify(current_proc.clone(), target_proc.clone()));
                }
            }
        }
    }
    for (key, current_proc) in &current.procedures {
        if !target.procedures.contains_key(key) {
            changes.push(ProcedureChange::Drop(current_proc.clone()));
        }
    }
    changes
}

/// Cross-table type propagation (spec §4.3): after per-table diffs are
/// built, walk every `Rebuild`/`Modify` whose `sql_type` changed, find FKs
/// in the *current* schema referencing that `(table, column)`, and
/// synthesize or upgrade a `ColumnChange` on the referencing table so its
/// type stays aligned. Runs to a fixed point: each pass only adds changes
/// that align types, so a change cannot re-trigger itself (idempotent).
fn propagate_cross_table_type_changes(current: &Schema, target: &Schema, result: &mut SchemaDiff) {
    loop {
        let mut retyped: Vec<(String, String, minfold_schema::Column)> = Vec::new();
        for table_diff in &result.modified_tables {
            for change in &table_diff.column_changes {
                if let (Some(old), Some(new)) = (change.old(), change.new_column()) {
                    if old.type_differs(new) {
                        retyped.push((table_diff.table_name.clone(), old.name.clone(), new.clone()));
                    }
                }
            }
        }

        if retyped.is_empty() {
            break;
        }

        let mut progressed = false;

        for (ref_table_name, ref_column_name, new_column) in &retyped {
            for (table_key, table) in &current.tables {
                let Some(target_table) = target.tables.get(table_key) else {
                    continue;
                };

                for column in table.columns.values() {
                    let references_changed_column = column.foreign_keys.iter().any(|fk| {
                        fk.ref_table.eq_ignore_ascii_case(ref_table_name)
                            && fk.ref_column.eq_ignore_ascii_case(ref_column_name)
                    });
                    if !references_changed_column {
                        continue;
                    }
                    if column.sql_type == new_column.sql_type
                        && column.length == new_column.length
                        && column.precision == new_column.precision
                        && column.scale == new_column.scale
                    {
                        continue;
                    }

                    let Some(target_column) = target_table.column(&column.name) else {
                        continue;
                    };

                    if already_has_change_for(result, &table.name, &column.name) {
                        continue;
                    }

                    let mut realigned = target_column.clone();
                    realigned.sql_type = new_column.sql_type;
                    realigned.length = new_column.length;
                    realigned.precision = new_column.precision;
                    realigned.scale = new_column.scale;

                    let synthesized = classify(column, &realigned, table);
                    upsert_table_diff(result, &table.name).column_changes.push(synthesized);
                    progressed = true;
                }
            }
        }

        if !progressed {
            break;
        }
    }
}

fn already_has_change_for(diff: &SchemaDiff, table_name: &str, column_name: &str) -> bool {
    diff.modified_tables
        .iter()
        .filter(|t| t.table_name.eq_ignore_ascii_case(table_name))
        .any(|t| t.column_changes.iter().any(|c| c.column_name().eq_ignore_ascii_case(column_name)))
}

fn upsert_table_diff<'a>(diff: &'a mut SchemaDiff, table_name: &str) -> &'a mut TableDiff {
    if let Some(idx) = diff
        .modified_tables
        .iter()
        .position(|t| t.table_name.eq_ignore_ascii_case(table_name))
    {
        &mut diff.modified_tables[idx]
    } else {
        diff.modified_tables.push(TableDiff::new(table_name));
        diff.modified_tables.last_mut().unwrap()
    }
}
