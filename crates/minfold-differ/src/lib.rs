//! Schema Differ and Change Classifier (components C3/C4) for the Minfold
//! migration engine: compares two in-memory [`minfold_schema::Schema`]
//! values and produces a structured, exhaustively-matchable diff.

pub mod change;
pub mod classifier;
pub mod differ;

pub use change::{
    ColumnChange, ForeignKeyChange, IndexChange, ProcedureChange, SchemaDiff, SequenceChange,
    TableDiff,
};
pub use classifier::classify;
pub use differ::diff;
