//! Up-script phases U1–U11 (spec §4.5.1).

use indoc::formatdoc;
use minfold_connector::{PlanningEvent, PlanningObserver};
use minfold_differ::{ColumnChange, ForeignKeyChange, IndexChange, SchemaDiff, SequenceChange, TableDiff};
use minfold_schema::{Column, ForeignKey, Index, ReferentialAction, Schema, Sequence, Table};

use crate::{naming, safety, type_render};

/// U1. Existence-guarded `DROP PROCEDURE`, each wrapped in its own batch.
pub fn drop_procedures(diff: &SchemaDiff) -> String {
    let mut out = String::new();
    for change in &diff.procedure_changes {
        let dropped = match change {
            minfold_differ::ProcedureChange::Drop(p) | minfold_differ::ProcedureChange::Modify(p, _) => Some(p),
            minfold_differ::ProcedureChange::Add(_) => None,
        };
        if let Some(proc) = dropped {
            out.push_str(&guarded_drop_procedure(&proc.schema, &proc.name));
        }
    }
    out
}

fn guarded_drop_procedure(schema: &str, name: &str) -> String {
    formatdoc! {"
        GO
        IF OBJECT_ID(N'[{schema}].[{name}]', N'P') IS NOT NULL
            DROP PROCEDURE [{schema}].[{name}];
        GO
    "}
}

/// U2. Existence-guarded `DROP SEQUENCE` for dropped or modified sequences.
pub fn drop_sequences(diff: &SchemaDiff) -> String {
    let mut out = String::new();
    for change in &diff.sequence_changes {
        let dropped = match change {
            SequenceChange::Drop(s) | SequenceChange::Modify(s, _) => Some(s),
            SequenceChange::Add(_) => None,
        };
        if let Some(seq) = dropped {
            out.push_str(&guarded_drop_sequence(&seq.schema, &seq.name));
        }
    }
    out
}

fn guarded_drop_sequence(schema: &str, name: &str) -> String {
    formatdoc! {"
        IF EXISTS (SELECT 1 FROM sys.sequences WHERE name = N'{name}' AND schema_id = SCHEMA_ID(N'{schema}'))
            DROP SEQUENCE [{schema}].[{name}];
    "}
}

/// U3. FKs owned by tables being dropped, plus FKs referencing a PK column
/// that is about to be dropped in U4.
pub fn drop_foreign_keys(diff: &SchemaDiff, current: &Schema, observer: &dyn PlanningObserver) -> String {
    observer.on_event(PlanningEvent::PhaseEntered { phase: "U3" });
    let mut out = String::new();

    let dropped_table_names: Vec<String> = diff.dropped_tables.iter().map(|t| t.name.to_lowercase()).collect();
    for fk in current.all_foreign_keys() {
        if dropped_table_names.contains(&fk.table.to_lowercase()) {
            out.push_str(&drop_fk_statement(fk));
        }
    }

    for table_diff in &diff.modified_tables {
        let Some(table) = current.table(&table_diff.table_name) else {
            continue;
        };
        let pk_columns = table.primary_key_columns();
        if table_diff.change_touching_pk_column(&pk_columns).is_none() {
            continue;
        }
        for fk in current.all_foreign_keys() {
            if fk.ref_table.eq_ignore_ascii_case(&table.name)
                && pk_columns.iter().any(|pk| pk.name.eq_ignore_ascii_case(&fk.ref_column))
            {
                out.push_str(&drop_fk_statement(fk));
            }
        }
    }

    out
}

fn drop_fk_statement(fk: &ForeignKey) -> String {
    formatdoc! {"
        IF EXISTS (SELECT 1 FROM sys.foreign_keys WHERE name = N'{name}')
            ALTER TABLE [{schema}].[{table}] DROP CONSTRAINT [{name}];
    ", name = fk.name, schema = fk.schema, table = fk.table}
}

/// U4. Guarded drop of `PK_<table>` for any table whose column changes touch
/// a current-PK column.
pub fn drop_primary_keys(diff: &SchemaDiff, current: &Schema, observer: &dyn PlanningObserver) -> String {
    observer.on_event(PlanningEvent::PhaseEntered { phase: "U4" });
    let mut out = String::new();
    for table_diff in &diff.modified_tables {
        let Some(table) = current.table(&table_diff.table_name) else {
            continue;
        };
        let pk_columns = table.primary_key_columns();
        if table_diff.change_touching_pk_column(&pk_columns).is_some() {
            out.push_str(&drop_pk_statement(&table.schema, &table.name));
        }
    }
    out
}

fn drop_pk_statement(schema: &str, table: &str) -> String {
    formatdoc! {"
        IF EXISTS (SELECT 1 FROM sys.key_constraints WHERE name = N'PK_{table}')
            ALTER TABLE [{schema}].[{table}] DROP CONSTRAINT [PK_{table}];
    "}
}

/// U5. `DROP TABLE IF EXISTS` for each dropped table.
pub fn drop_tables(diff: &SchemaDiff) -> String {
    diff.dropped_tables
        .iter()
        .map(|t| format!("DROP TABLE IF EXISTS [{}].[{}];\n", t.schema, t.name))
        .collect()
}

/// U6. New sequences first, then drop-and-recreate for modified ones.
pub fn create_sequences(diff: &SchemaDiff) -> String {
    let mut out = String::new();
    for change in &diff.sequence_changes {
        if let SequenceChange::Add(seq) = change {
            out.push_str(&create_sequence_statement(seq));
        }
    }
    for change in &diff.sequence_changes {
        if let SequenceChange::Modify(_, seq) = change {
            out.push_str(&create_sequence_statement(seq));
        }
    }
    out
}

fn create_sequence_statement(seq: &Sequence) -> String {
    let mut stmt = format!("CREATE SEQUENCE [{}].[{}] AS {}", seq.schema, seq.name, seq.data_type);
    if let Some(start) = seq.start_value {
        stmt += &format!(" START WITH {start}");
    }
    if let Some(increment) = seq.increment {
        stmt += &format!(" INCREMENT BY {increment}");
    }
    if let Some(min) = seq.min_value {
        stmt += &format!(" MINVALUE {min}");
    }
    if let Some(max) = seq.max_value {
        stmt += &format!(" MAXVALUE {max}");
    }
    stmt += if seq.cycle { " CYCLE" } else { " NO CYCLE" };
    match seq.cache_size {
        Some(cache) => stmt += &format!(" CACHE {cache}"),
        None => stmt += " NO CACHE",
    }
    stmt.push_str(";\n");
    stmt
}

/// U7. New tables, inline columns/PK/identity/defaults. FKs are not inlined.
pub fn create_tables(diff: &SchemaDiff) -> String {
    diff.new_tables.iter().map(create_table_statement).collect()
}

fn create_table_statement(table: &Table) -> String {
    let mut lines = Vec::new();
    for column in table.columns_by_ordinal() {
        let mut line = type_render::render_column_definition(column);
        if !column.is_computed {
            if let Some(default) = &column.default_value {
                let name = column
                    .default_constraint_name
                    .clone()
                    .unwrap_or_else(|| naming::default_constraint_name(table.name.as_str(), column.name.as_str(), default.as_str(), "add"));
                line += &format!(" CONSTRAINT [{name}] DEFAULT {default}");
            }
        }
        lines.push(format!("    {line}"));
    }

    let pk_columns = table.primary_key_columns();
    if !pk_columns.is_empty() {
        let cols = pk_columns.iter().map(|c| format!("[{}]", c.name)).collect::<Vec<_>>().join(", ");
        lines.push(format!("    CONSTRAINT [PK_{}] PRIMARY KEY ({cols})", table.name));
    }

    formatdoc! {"
        CREATE TABLE [{schema}].[{name}] (
        {cols}
        );
    ", schema = table.schema, name = table.name, cols = lines.join(",\n")}
}

/// U8. Per-table column modifications: index drops for touched columns,
/// pre-adds, drops, modify/rebuild, pure modify, then remaining adds.
pub fn modify_columns(diff: &SchemaDiff, current: &Schema, observer: &dyn PlanningObserver) -> String {
    observer.on_event(PlanningEvent::PhaseEntered { phase: "U8" });
    let mut out = String::new();
    for table_diff in &diff.modified_tables {
        if let Some(current_table) = current.table(&table_diff.table_name) {
            out.push_str(&modify_table_columns(table_diff, current_table, observer));
        }
    }
    out
}

fn modify_table_columns(table_diff: &TableDiff, current_table: &Table, observer: &dyn PlanningObserver) -> String {
    let mut out = String::new();
    let schema = current_table.schema.clone();
    let name = current_table.name.clone();

    let dropped_names: Vec<String> = table_diff.dropped_columns().map(|c| c.name.to_lowercase()).collect();
    for index in &current_table.indexes {
        if index.columns.iter().any(|c| dropped_names.contains(&c.to_lowercase())) {
            out.push_str(&format!("DROP INDEX IF EXISTS [{}] ON [{schema}].[{name}];\n", index.name));
        }
    }

    let pre_add = should_pre_add(table_diff, current_table);
    if pre_add {
        for add in table_diff.added_columns() {
            out.push_str(&add_column_statement(&schema, &name, add, current_table));
        }
    }

    for drop in table_diff.dropped_columns() {
        out.push_str(&drop_default_constraint_dynamic(&schema, &name, &drop.name));
        out.push_str(&format!("ALTER TABLE [{schema}].[{name}] DROP COLUMN [{}];\n", drop.name));
    }

    for change in &table_diff.column_changes {
        match change {
            ColumnChange::Rebuild(old, new) => {
                observer.on_event(PlanningEvent::ColumnClassified {
                    table: name.clone(),
                    column: new.name.clone(),
                    rebuild: true,
                });
                out.push_str(&rebuild_column(&schema, &name, old, new, table_diff, current_table));
            }
            ColumnChange::Modify(old, new) => {
                observer.on_event(PlanningEvent::ColumnClassified {
                    table: name.clone(),
                    column: new.name.clone(),
                    rebuild: false,
                });
                out.push_str(&alter_column_in_place(&schema, &name, old, new));
            }
            ColumnChange::Add(_) | ColumnChange::Drop(_) => {}
        }
    }

    if !pre_add {
        for add in table_diff.added_columns() {
            out.push_str(&add_column_statement(&schema, &name, add, current_table));
        }
    }

    out
}

fn should_pre_add(table_diff: &TableDiff, current_table: &Table) -> bool {
    let drop_count = table_diff.column_changes.iter().filter(|c| c.is_drop()).count();
    let projected = current_table.columns.len().saturating_sub(drop_count);
    let has_add = table_diff.added_columns().next().is_some();
    let rebuild_on_sole_column = table_diff.column_changes.iter().any(|c| c.is_rebuild()) && current_table.columns.len() <= 1;

    (projected == 0 && has_add) || (rebuild_on_sole_column && has_add)
}

fn rebuild_column(schema: &str, table: &str, old: &Column, new: &Column, table_diff: &TableDiff, current_table: &Table) -> String {
    match safety::classify_rebuild_strategy(old, table_diff, current_table) {
        safety::RebuildStrategy::SafeDropThenAdd => {
            let mut s = drop_default_constraint_dynamic(schema, table, &old.name);
            s += &format!("ALTER TABLE [{schema}].[{table}] DROP COLUMN [{}];\n", old.name);
            s += &add_column_statement(schema, table, new, current_table);
            s
        }
        safety::RebuildStrategy::AddNewThenDropOld => {
            let temp_name = naming::deterministic_name(&format!("{}_tmp", new.name), &[schema, table, new.name.as_str(), "rebuild"]);
            let mut temp_col = new.clone();
            temp_col.name = temp_name.clone();
            let mut s = add_column_statement(schema, table, &temp_col, current_table);
            s += &drop_default_constraint_dynamic(schema, table, &old.name);
            s += &format!("ALTER TABLE [{schema}].[{table}] DROP COLUMN [{}];\n", old.name);
            s += &rename_column_statement(schema, table, &temp_name, &new.name);
            s
        }
        safety::RebuildStrategy::AddThenDropThenRenameSameName => {
            let temp_name = naming::deterministic_name(&format!("{}_tmp", new.name), &[schema, table, new.name.as_str(), "safe"]);
            let mut temp_col = new.clone();
            temp_col.name = temp_name.clone();
            let mut s = add_column_statement(schema, table, &temp_col, current_table);
            s += &drop_default_constraint_dynamic(schema, table, &old.name);
            s += &format!("ALTER TABLE [{schema}].[{table}] DROP COLUMN [{}];\n", old.name);
            s += &rename_column_statement(schema, table, &temp_name, &new.name);
            if new.default_value.is_none() {
                s += &drop_default_constraint_dynamic(schema, table, &new.name);
            }
            s
        }
    }
}

fn rename_column_statement(schema: &str, table: &str, from: &str, to: &str) -> String {
    format!("EXEC sp_rename N'[{schema}].[{table}].[{from}]', N'{to}', N'COLUMN';\n")
}

fn alter_column_in_place(schema: &str, table: &str, old: &Column, new: &Column) -> String {
    let mut s = String::new();
    let def = type_render::render_column_definition(new);
    s += &format!("ALTER TABLE [{schema}].[{table}] ALTER COLUMN {def};\n");

    if !default_values_match(old, new) {
        s += &drop_default_constraint_dynamic(schema, table, &new.name);
        if let Some(default) = &new.default_value {
            let name = new
                .default_constraint_name
                .clone()
                .unwrap_or_else(|| naming::default_constraint_name(table, new.name.as_str(), default.as_str(), "modify"));
            s += &format!("ALTER TABLE [{schema}].[{table}] ADD CONSTRAINT [{name}] DEFAULT {default} FOR [{}];\n", new.name);
        }
    }
    s
}

fn default_values_match(old: &Column, new: &Column) -> bool {
    match (&old.default_value, &new.default_value) {
        (Some(a), Some(b)) => minfold_schema::normalize::normalize_default_value(a) == minfold_schema::normalize::normalize_default_value(b),
        (None, None) => true,
        _ => false,
    }
}

fn add_column_statement(schema: &str, table: &str, column: &Column, current_table: &Table) -> String {
    let mut def = type_render::render_column_definition(column);
    let needs_sentinel_default = !column.is_nullable && !column.is_identity && !column.is_computed && !current_table.columns.is_empty();

    if !column.is_computed {
        if let Some(default) = &column.default_value {
            let name = column
                .default_constraint_name
                .clone()
                .unwrap_or_else(|| naming::default_constraint_name(table, column.name.as_str(), default.as_str(), "add"));
            def += &format!(" CONSTRAINT [{name}] DEFAULT {default}");
        } else if needs_sentinel_default {
            let sentinel = type_render::zero_value_sentinel(column);
            let name = naming::default_constraint_name(table, column.name.as_str(), &sentinel, "add");
            def += &format!(" CONSTRAINT [{name}] DEFAULT {sentinel}");
        }
    }

    format!("ALTER TABLE [{schema}].[{table}] ADD {def};\n")
}

fn drop_default_constraint_dynamic(schema: &str, table: &str, column: &str) -> String {
    formatdoc! {"
        DECLARE @df_name sysname;
        SELECT @df_name = dc.name
        FROM sys.default_constraints dc
        JOIN sys.columns c ON c.default_object_id = dc.object_id AND c.object_id = dc.parent_object_id
        WHERE dc.parent_object_id = OBJECT_ID(N'[{schema}].[{table}]')
          AND c.name = N'{column}';
        IF @df_name IS NOT NULL
            EXEC('ALTER TABLE [{schema}].[{table}] DROP CONSTRAINT [' + @df_name + ']');
    "}
}

/// U9. Drop FKs slated for drop/modify, add new/modified FKs (two-phase
/// validation), add new PKs, then index drops/creates.
pub fn constraints(diff: &SchemaDiff, current: &Schema, observer: &dyn PlanningObserver) -> String {
    observer.on_event(PlanningEvent::PhaseEntered { phase: "U9" });
    let mut out = String::new();

    for table_diff in &diff.modified_tables {
        for change in &table_diff.foreign_key_changes {
            match change {
                ForeignKeyChange::Drop(rows) | ForeignKeyChange::Modify(rows, _) => {
                    if let Some(first) = rows.first() {
                        out.push_str(&drop_fk_statement(first));
                    }
                }
                ForeignKeyChange::Add(_) => {}
            }
        }
    }

    for table_diff in &diff.modified_tables {
        for change in &table_diff.foreign_key_changes {
            match change {
                ForeignKeyChange::Add(rows) | ForeignKeyChange::Modify(_, rows) => {
                    out.push_str(&create_fk_two_phase(rows));
                }
                ForeignKeyChange::Drop(_) => {}
            }
        }
    }

    for table_diff in &diff.modified_tables {
        let Some(table) = current.table(&table_diff.table_name) else {
            continue;
        };
        let gained_pk = gained_primary_key_columns(table_diff);
        if !gained_pk.is_empty() {
            let cols = gained_pk.iter().map(|c| format!("[{}]", c.name)).collect::<Vec<_>>().join(", ");
            out.push_str(&format!(
                "ALTER TABLE [{}].[{}] ADD CONSTRAINT [PK_{}] PRIMARY KEY ({cols});\n",
                table.schema, table.name, table.name
            ));
        }
    }

    for table_diff in &diff.modified_tables {
        for change in &table_diff.index_changes {
            match change {
                IndexChange::Drop(idx) | IndexChange::Modify(idx, _) => out.push_str(&drop_index_statement(idx)),
                IndexChange::Add(_) => {}
            }
        }
    }
    for table_diff in &diff.modified_tables {
        for change in &table_diff.index_changes {
            match change {
                IndexChange::Add(idx) | IndexChange::Modify(_, idx) => out.push_str(&create_index_statement(idx)),
                IndexChange::Drop(_) => {}
            }
        }
    }

    out
}

fn gained_primary_key_columns(table_diff: &TableDiff) -> Vec<&Column> {
    table_diff
        .column_changes
        .iter()
        .filter_map(|c| match c {
            ColumnChange::Add(new) if new.is_primary_key => Some(new),
            ColumnChange::Modify(old, new) | ColumnChange::Rebuild(old, new) if new.is_primary_key && !old.is_primary_key => Some(new),
            _ => None,
        })
        .collect()
}

fn create_fk_two_phase(rows: &[ForeignKey]) -> String {
    let Some(first) = rows.first() else {
        return String::new();
    };
    let cols = column_list(rows, |r| &r.column);
    let ref_cols = column_list(rows, |r| &r.ref_column);
    let delete_action = render_action(first.delete_action);
    let update_action = render_action(first.update_action);
    let not_for_repl = if first.not_for_replication { " NOT FOR REPLICATION" } else { "" };

    let mut s = format!(
        "ALTER TABLE [{}].[{}] WITH NOCHECK ADD CONSTRAINT [{}] FOREIGN KEY ({cols}) REFERENCES [{}].[{}] ({ref_cols}) ON DELETE {delete_action} ON UPDATE {update_action}{not_for_repl};\n",
        first.schema, first.table, first.name, first.ref_schema, first.ref_table
    );

    if !first.not_enforced {
        s += &format!("ALTER TABLE [{}].[{}] DROP CONSTRAINT [{}];\n", first.schema, first.table, first.name);
        s += &format!(
            "ALTER TABLE [{}].[{}] WITH CHECK ADD CONSTRAINT [{}] FOREIGN KEY ({cols}) REFERENCES [{}].[{}] ({ref_cols}) ON DELETE {delete_action} ON UPDATE {update_action}{not_for_repl};\n",
            first.schema, first.table, first.name, first.ref_schema, first.ref_table
        );
    }

    s
}

fn render_action(action: ReferentialAction) -> &'static str {
    match action {
        ReferentialAction::NoAction => "NO ACTION",
        ReferentialAction::Cascade => "CASCADE",
        ReferentialAction::SetNull => "SET NULL",
        ReferentialAction::SetDefault => "SET DEFAULT",
    }
}

fn column_list<'a>(rows: &'a [ForeignKey], f: impl Fn(&'a ForeignKey) -> &'a str) -> String {
    rows.iter().map(|r| format!("[{}]", f(r))).collect::<Vec<_>>().join(", ")
}

fn drop_index_statement(index: &Index) -> String {
    format!("DROP INDEX IF EXISTS [{}] ON [{}].[{}];\n", index.name, index.schema, index.table)
}

fn create_index_statement(index: &Index) -> String {
    let unique = if index.is_unique { "UNIQUE " } else { "" };
    let cols = index.columns.iter().map(|c| format!("[{c}]")).collect::<Vec<_>>().join(", ");
    formatdoc! {"
        IF NOT EXISTS (SELECT 1 FROM sys.indexes WHERE name = N'{name}' AND object_id = OBJECT_ID(N'[{schema}].[{table}]'))
            CREATE {unique}INDEX [{name}] ON [{schema}].[{table}] ({cols});
    ", name = index.name, schema = index.schema, table = index.table}
}

/// U10. Rebuild a table in place when its physical column order diverges
/// from the desired order after U7–U9.
pub fn column_reorder(diff: &SchemaDiff, current: &Schema, target: &Schema, observer: &dyn PlanningObserver) -> String {
    observer.on_event(PlanningEvent::PhaseEntered { phase: "U10" });
    let mut out = String::new();

    for table_diff in &diff.modified_tables {
        if !table_diff.column_order_changed {
            continue;
        }
        let Some(desired) = target.table(&table_diff.table_name) else {
            continue;
        };
        if current.table(&table_diff.table_name).is_none() {
            continue;
        }
        observer.on_event(PlanningEvent::ReorderTriggered { table: desired.name.clone() });
        out.push_str(&rebuild_table_in_place(desired, current));
    }

    out
}

/// Every foreign key row touching `table_name`, either as the owning table
/// or as the referenced table, grouped by `(table, name)` so a multi-column
/// constraint's rows stay together (spec §3: rows sharing `(schema, table,
/// name)` are one logical constraint).
fn fks_touching_table(current: &Schema, table_name: &str) -> Vec<Vec<ForeignKey>> {
    let mut groups: Vec<(String, String, Vec<ForeignKey>)> = Vec::new();
    for fk in current.all_foreign_keys() {
        if !fk.table.eq_ignore_ascii_case(table_name) && !fk.ref_table.eq_ignore_ascii_case(table_name) {
            continue;
        }
        let table_key = fk.table.to_lowercase();
        let name_key = fk.name.to_lowercase();
        match groups.iter_mut().find(|(t, n, _)| *t == table_key && *n == name_key) {
            Some(group) => group.2.push(fk.clone()),
            None => groups.push((table_key, name_key, vec![fk.clone()])),
        }
    }
    groups.into_iter().map(|(_, _, rows)| rows).collect()
}

fn rebuild_table_in_place(desired: &Table, current: &Schema) -> String {
    let suffix = naming::deterministic_suffix(&[desired.schema.as_str(), desired.name.as_str(), "reorder"]);
    let temp_name = format!("{}_reorder_{suffix}", desired.name);

    let mut out = String::new();

    let touching = fks_touching_table(current, &desired.name);
    for group in &touching {
        if let Some(first) = group.first() {
            out.push_str(&drop_fk_statement(first));
        }
    }

    out.push_str(&create_table_statement(&Table {
        name: temp_name.clone(),
        schema: desired.schema.clone(),
        columns: desired.columns.clone(),
        indexes: Vec::new(),
    }));

    let has_identity = desired.columns.values().any(|c| c.is_identity);
    let qualified_temp = format!("[{}].[{}]", desired.schema, temp_name);
    let qualified_desired = format!("[{}].[{}]", desired.schema, desired.name);

    if has_identity {
        out.push_str(&format!("SET IDENTITY_INSERT {qualified_temp} ON;\n"));
    }

    let insert_cols = desired
        .columns_by_ordinal()
        .iter()
        .filter(|c| !c.is_computed)
        .map(|c| format!("[{}]", c.name))
        .collect::<Vec<_>>()
        .join(", ");
    let select_cols = desired
        .columns_by_ordinal()
        .iter()
        .filter(|c| !c.is_computed)
        .map(|c| format!("[{}]", c.name))
        .collect::<Vec<_>>()
        .join(", ");

    let column_exists_checks = desired
        .columns_by_ordinal()
        .iter()
        .filter(|c| !c.is_computed)
        .map(|c| {
            format!(
                "AND EXISTS (SELECT 1 FROM sys.columns WHERE object_id = OBJECT_ID(N'{qualified_desired}') AND name = N'{}')",
                c.name
            )
        })
        .collect::<Vec<_>>()
        .join(" ");

    out.push_str(&formatdoc! {"
        IF OBJECT_ID(N'{qualified_desired}') IS NOT NULL {column_exists_checks}
        BEGIN
            EXEC sp_executesql N'INSERT INTO {qualified_temp} ({insert_cols}) SELECT {select_cols} FROM {qualified_desired}';
        END
    "});

    if has_identity {
        out.push_str(&format!("SET IDENTITY_INSERT {qualified_temp} OFF;\n"));
    }

    out.push_str(&format!("DROP TABLE {qualified_desired};\n"));
    out.push_str(&format!("EXEC sp_rename N'{qualified_temp}', N'{}';\n", desired.name));

    let pk_columns = desired.primary_key_columns();
    if !pk_columns.is_empty() {
        let cols = pk_columns.iter().map(|c| format!("[{}]", c.name)).collect::<Vec<_>>().join(", ");
        out.push_str(&format!(
            "ALTER TABLE {qualified_desired} ADD CONSTRAINT [PK_{}] PRIMARY KEY ({cols});\n",
            desired.name
        ));
    }
    for index in &desired.indexes {
        out.push_str(&create_index_statement(index));
    }
    for group in &touching {
        out.push_str(&create_fk_two_phase(group));
    }

    out
}

/// U11. New and modified procedures: `GO` / existence-guarded drop / `GO` /
/// body / `GO`.
pub fn create_procedures(diff: &SchemaDiff) -> String {
    let mut out = String::new();
    for change in &diff.procedure_changes {
        let created = match change {
            minfold_differ::ProcedureChange::Add(p) | minfold_differ::ProcedureChange::Modify(_, p) => Some(p),
            minfold_differ::ProcedureChange::Drop(_) => None,
        };
        if let Some(proc) = created {
            out.push_str(&formatdoc! {"
                GO
                IF OBJECT_ID(N'[{schema}].[{name}]', N'P') IS NOT NULL
                    DROP PROCEDURE [{schema}].[{name}];
                GO
                {body}
                GO
            ", schema = proc.schema, name = proc.name, body = proc.definition});
        }
    }
    out
}
