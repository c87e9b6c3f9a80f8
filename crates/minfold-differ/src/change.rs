use minfold_schema::{Column, ForeignKey, Index, Sequence, StoredProcedure};

/// One column's fate between `current` and `target` (spec §3). A tagged
/// union, not a struct with a flag and optional fields — so the planner can
/// match exhaustively and the "change type says Add but old is non-null"
/// bug class the teacher's source has is not representable here (spec §9).
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnChange {
    Add(Column),
    Drop(Column),
    /// Same logical column, in-place `ALTER COLUMN` is legal.
    Modify(Column, Column),
    /// Same logical column, incompatible metadata requires `DROP`+`ADD`.
    Rebuild(Column, Column),
}

impl ColumnChange {
    pub fn column_name(&self) -> &str {
        match self {
            ColumnChange::Add(c) | ColumnChange::Drop(c) => &c.name,
            ColumnChange::Modify(_, c) | ColumnChange::Rebuild(_, c) => &c.name,
        }
    }

    pub fn old(&self) -> Option<&Column> {
        match self {
            ColumnChange::Add(_) => None,
            ColumnChange::Drop(c) => Some(c),
            ColumnChange::Modify(old, _) | ColumnChange::Rebuild(old, _) => Some(old),
        }
    }

    pub fn new_column(&self) -> Option<&Column> {
        match self {
            ColumnChange::Add(c) => Some(c),
            ColumnChange::Drop(_) => None,
            ColumnChange::Modify(_, new) | ColumnChange::Rebuild(_, new) => Some(new),
        }
    }

    pub fn is_rebuild(&self) -> bool {
        matches!(self, ColumnChange::Rebuild(_, _))
    }

    pub fn is_drop(&self) -> bool {
        matches!(self, ColumnChange::Drop(_))
    }

    pub fn is_add(&self) -> bool {
        matches!(self, ColumnChange::Add(_))
    }
}

/// A foreign key change. Each variant carries *all* rows sharing the
/// constraint's `(schema, table, name)` — a multi-column FK is one logical
/// constraint made of several `ForeignKey` rows (spec §3) — rather than a
/// single row, so multi-column constraints are never silently truncated to
/// their first column.
#[derive(Debug, Clone, PartialEq)]
pub enum ForeignKeyChange {
    Add(Vec<ForeignKey>),
    Drop(Vec<ForeignKey>),
    Modify(Vec<ForeignKey>, Vec<ForeignKey>),
}

impl ForeignKeyChange {
    pub fn constraint_name(&self) -> &str {
        let rows = match self {
            ForeignKeyChange::Add(rows) | ForeignKeyChange::Drop(rows) => rows,
            ForeignKeyChange::Modify(old, _) => old,
        };
        rows.first().map(|fk| fk.name.as_str()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndexChange {
    Add(Index),
    Drop(Index),
    Modify(Index, Index),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SequenceChange {
    Add(Sequence),
    Drop(Sequence),
    Modify(Sequence, Sequence),
}

#[derive(Debug, Clone)]
pub enum ProcedureChange {
    Add(StoredProcedure),
    Drop(StoredProcedure),
    Modify(StoredProcedure, StoredProcedure),
}

/// All changes scoped to one table. Retained even when every list is empty
/// if the column *order* alone differs (spec §4.3) — `column_order_changed`
/// signals that case to the planner.
#[derive(Debug, Clone, Default)]
pub struct TableDiff {
    pub table_name: String,
    pub column_changes: Vec<ColumnChange>,
    pub foreign_key_changes: Vec<ForeignKeyChange>,
    pub index_changes: Vec<IndexChange>,
    pub column_order_changed: bool,
}

impl TableDiff {
    pub fn new(table_name: impl Into<String>) -> Self {
        TableDiff {
            table_name: table_name.into(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.column_changes.is_empty()
            && self.foreign_key_changes.is_empty()
            && self.index_changes.is_empty()
            && !self.column_order_changed
    }

    pub fn dropped_columns(&self) -> impl Iterator<Item = &Column> {
        self.column_changes.iter().filter_map(|c| match c {
            ColumnChange::Drop(col) => Some(col),
            _ => None,
        })
    }

    pub fn added_columns(&self) -> impl Iterator<Item = &Column> {
        self.column_changes.iter().filter_map(|c| match c {
            ColumnChange::Add(col) => Some(col),
            _ => None,
        })
    }

    /// Column change touching the given (current-side) PK column, if any —
    /// used by U4/the down-path's symmetric PK-drop phase.
    pub fn change_touching_pk_column<'a>(&'a self, pk_columns: &[&Column]) -> Option<&'a ColumnChange> {
        self.column_changes.iter().find(|change| match change {
            ColumnChange::Drop(old) | ColumnChange::Modify(old, _) | ColumnChange::Rebuild(old, _) => {
                pk_columns.iter().any(|pk| pk.name.eq_ignore_ascii_case(&old.name))
            }
            ColumnChange::Add(_) => false,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct SchemaDiff {
    pub new_tables: Vec<minfold_schema::Table>,
    /// Full dropped `Table` (not just the name) so later consumers — the
    /// planner's U5/U3 phases — keep the table's schema without a second
    /// lookup against a schema that, by then, no longer has the table.
    pub dropped_tables: Vec<minfold_schema::Table>,
    pub modified_tables: Vec<TableDiff>,
    pub sequence_changes: Vec<SequenceChange>,
    pub procedure_changes: Vec<ProcedureChange>,
}

impl SchemaDiff {
    pub fn new() -> Self {
        SchemaDiff::default()
    }

    /// Spec §8 invariant 2: `diff(x, x)` contains only empty change lists
    /// and no `TableDiff` entries.
    pub fn is_empty(&self) -> bool {
        self.new_tables.is_empty()
            && self.dropped_tables.is_empty()
            && self.modified_tables.is_empty()
            && self.sequence_changes.is_empty()
            && self.procedure_changes.is_empty()
    }
}
