//! Connector contract traits and typed errors (component C7), the seam that
//! every other crate in this workspace is built against. No SQL Server
//! driver code lives here — only the trait objects the applier and CLI wire
//! up to a real connection.

pub mod error;
pub mod executor;
pub mod introspection;
pub mod migration;
pub mod observer;
pub mod tracker;

pub use error::{ConnectorError, ConnectorErrorKind, ConnectorResult};
pub use executor::{split_into_batches, ScriptExecutor};
pub use introspection::SchemaIntrospector;
pub use migration::{AppliedMigration, MigrationDirectory};
pub use observer::{NullObserver, PlanningEvent, PlanningObserver};
pub use tracker::MigrationTracker;
