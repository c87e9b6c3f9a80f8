use async_trait::async_trait;

use crate::{AppliedMigration, ConnectorResult};

/// The bookkeeping-table collaborator (spec §4.6: `__MinfoldMigrations(Id
/// identity PK, MigrationName unique, AppliedAt datetime2)` in schema
/// `dbo`). Kept separate from [`crate::ScriptExecutor`] because reading back
/// applied-migration rows is a query, not a script batch, and separate from
/// [`crate::SchemaIntrospector`] because the tracking table is deliberately
/// excluded from introspected schemas.
#[async_trait]
pub trait MigrationTracker: Send + Sync {
    /// Create the tracking table if it does not already exist.
    async fn ensure_table(&self) -> ConnectorResult<()>;

    /// Applied migrations in `AppliedAt` order.
    async fn list_applied(&self) -> ConnectorResult<Vec<AppliedMigration>>;

    /// Insert a row recording `name` as applied now. Idempotent: applying an
    /// already-recorded name is a no-op rather than a unique-constraint error.
    async fn record_applied(&self, name: &str) -> ConnectorResult<()>;

    /// Remove the row for `name`, if present.
    async fn remove_applied(&self, name: &str) -> ConnectorResult<()>;
}
