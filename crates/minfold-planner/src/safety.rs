use minfold_differ::TableDiff;
use minfold_schema::{Column, Table};

/// What a `Modify`/`Rebuild` must do to stay clear of SQL Server's "a table
/// cannot end up with zero data columns" rule (spec §4.5.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildStrategy {
    /// Plain `DROP COLUMN` then `ADD COLUMN` — safe because enough other
    /// columns remain.
    SafeDropThenAdd,
    /// Add the new shape under a temporary name, drop the old column, then
    /// `sp_rename` the temporary column back to the target name.
    AddThenDropThenRenameSameName,
    /// Add the new column (already under its target name because it is a
    /// genuinely new column elsewhere in the same diff), then drop the old
    /// one — used when an unrelated `Add` is what keeps the table non-empty.
    AddNewThenDropOld,
}

/// The single/zero-column safety detector (spec §4.5.3). Given the column
/// being rebuilt, the full diff for its table (so sibling drops/adds are
/// visible), and the table's live column count, decide which strategy keeps
/// the table from transiently losing all its data columns.
pub fn classify_rebuild_strategy(old: &Column, table_diff: &TableDiff, current_table: &Table) -> RebuildStrategy {
    let drop_count = table_diff.column_changes.iter().filter(|c| c.is_drop()).count();
    let projected_after_drops = current_table.columns.len().saturating_sub(drop_count);
    let has_sibling_add = table_diff
        .added_columns()
        .any(|added| !added.name.eq_ignore_ascii_case(&old.name));

    if projected_after_drops >= 2 {
        return RebuildStrategy::SafeDropThenAdd;
    }

    if has_sibling_add {
        RebuildStrategy::AddNewThenDropOld
    } else {
        RebuildStrategy::AddThenDropThenRenameSameName
    }
}
