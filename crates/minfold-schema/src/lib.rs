//! In-memory schema model for the Minfold migration engine (component C1).
//!
//! This crate is deliberately inert: it exposes constructors, equality
//! predicates, and a handful of lookup helpers, and has no fallible
//! operations of its own. The schema differ (`minfold-differ`) and the
//! phased planner (`minfold-planner`) own all of the actual decision-making.

pub mod column;
pub mod foreign_key;
pub mod index;
pub mod normalize;
pub mod procedure;
pub mod schema;
pub mod sequence;
pub mod sql_type;
pub mod table;

pub use column::Column;
pub use foreign_key::{ForeignKey, ReferentialAction};
pub use index::Index;
pub use procedure::StoredProcedure;
pub use schema::{Schema, MIGRATIONS_TABLE_NAME};
pub use sequence::Sequence;
pub use sql_type::SqlType;
pub use table::{ColumnMap, Table};
