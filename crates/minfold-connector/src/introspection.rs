use async_trait::async_trait;
use minfold_schema::{ForeignKey, Sequence, StoredProcedure, Table};

use crate::ConnectorResult;

/// The live-database collaborator (spec §6 "Introspection contract
/// (external)"). Implementations talk to an actual SQL Server connection;
/// this crate only depends on the trait, so the differ/planner/applier can
/// all be tested against an in-memory fake.
#[async_trait]
pub trait SchemaIntrospector: Send + Sync {
    /// `get_schema(db, schema_filter, exclude_tables) -> {name -> Table}`.
    /// The returned tables must never include the migrations tracking table
    /// (filtered by name, see `minfold_schema::MIGRATIONS_TABLE_NAME`).
    async fn get_schema(
        &self,
        schema_filter: &str,
        exclude_tables: &[String],
    ) -> ConnectorResult<Vec<Table>>;

    async fn get_foreign_keys(&self, table_names: &[String]) -> ConnectorResult<Vec<ForeignKey>>;

    async fn get_sequences(&self) -> ConnectorResult<Vec<Sequence>>;

    async fn get_stored_procedures(&self) -> ConnectorResult<Vec<StoredProcedure>>;

    /// `script_table_create(qualified_name) -> string | NotFound`. Returns
    /// `Ok(None)` for the NotFound case, matching the contract in spec §6.
    async fn script_table_create(&self, qualified_name: &str) -> ConnectorResult<Option<String>>;
}
