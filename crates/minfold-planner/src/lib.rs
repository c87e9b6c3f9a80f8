//! Phased Script Planner (component C5) for the Minfold migration engine:
//! turns a [`minfold_differ::SchemaDiff`] into an up script and, from the
//! same diff, a symmetric down script.

pub mod down;
pub mod naming;
pub mod safety;
pub mod script;
pub mod type_render;
pub mod up;

use minfold_connector::PlanningObserver;
use minfold_differ::SchemaDiff;
use minfold_schema::Schema;
use script::ScriptBuilder;

pub use down::plan_down;
pub use safety::RebuildStrategy;

/// Plan the up script: `current` is the live (pre-migration) schema, `target`
/// is the desired (post-migration) schema — the same two schemas the diff
/// was computed from.
#[tracing::instrument(skip_all)]
pub fn plan_up(diff: &SchemaDiff, current: &Schema, target: &Schema, observer: &dyn PlanningObserver) -> String {
    let mut sb = ScriptBuilder::new(observer);
    sb.phase("U1: Drop Stored Procedures", up::drop_procedures(diff));
    sb.phase("U2: Drop Sequences", up::drop_sequences(diff));
    sb.phase("U3: Drop Foreign Keys", up::drop_foreign_keys(diff, current, observer));
    sb.phase("U4: Drop Primary Keys", up::drop_primary_keys(diff, current, observer));
    sb.phase("U5: Drop Tables", up::drop_tables(diff));
    sb.phase("U6: Create Sequences", up::create_sequences(diff));
    sb.phase("U7: Create Tables", up::create_tables(diff));
    sb.phase("U8: Modify Columns", up::modify_columns(diff, current, observer));
    sb.phase("U9: Constraints", up::constraints(diff, current, observer));
    sb.phase("U10: Column Reorder", up::column_reorder(diff, current, target, observer));
    sb.phase("U11: Create Stored Procedures", up::create_procedures(diff));
    sb.build()
}
