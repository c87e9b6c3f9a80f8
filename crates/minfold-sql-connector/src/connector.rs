use std::fs;

use minfold_connector::{
    AppliedMigration, ConnectorError, ConnectorResult, MigrationDirectory, MigrationTracker,
    SchemaIntrospector, ScriptExecutor,
};
use minfold_schema::Schema;

use crate::assembly::introspect_schema;

/// The Migration Applier (component C6): owns the three connector
/// collaborators (introspection, tracking, script execution) plus the
/// on-disk migrations root, and drives `list_applied`/`apply_all`/
/// `rollback`/`goto`/`claim` against them (spec §4.6).
pub struct SqlMigrationConnector {
    introspector: Box<dyn SchemaIntrospector>,
    tracker: Box<dyn MigrationTracker>,
    executor: Box<dyn ScriptExecutor>,
    migrations_root: String,
    schema_filter: String,
}

/// What `goto` would do, without touching the database (spec §4.6
/// "Dry-run returns the planned rollbacks and applies without touching the
/// database").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GotoPlan {
    pub to_rollback: Vec<String>,
    pub to_apply: Vec<String>,
}

impl SqlMigrationConnector {
    pub fn new(
        introspector: Box<dyn SchemaIntrospector>,
        tracker: Box<dyn MigrationTracker>,
        executor: Box<dyn ScriptExecutor>,
        migrations_root: impl Into<String>,
        schema_filter: impl Into<String>,
    ) -> Self {
        SqlMigrationConnector {
            introspector,
            tracker,
            executor,
            migrations_root: migrations_root.into(),
            schema_filter: schema_filter.into(),
        }
    }

    pub async fn introspect(&self) -> ConnectorResult<Schema> {
        introspect_schema(self.introspector.as_ref(), &self.schema_filter).await
    }

    /// Migration folders on disk, oldest first. Directory names begin with
    /// a 14-digit UTC timestamp (spec §6), so lexicographic order is
    /// chronological order.
    pub fn migrations_on_disk(&self) -> ConnectorResult<Vec<MigrationDirectory>> {
        if !std::path::Path::new(&self.migrations_root).exists() {
            return Ok(Vec::new());
        }
        let mut names: Vec<String> = fs::read_dir(&self.migrations_root)
            .map_err(|e| ConnectorError::generic(anyhow::Error::new(e)))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        names.sort();
        Ok(names
            .into_iter()
            .map(|name| MigrationDirectory::new(&self.migrations_root, &name))
            .collect())
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_applied(&self) -> ConnectorResult<Vec<AppliedMigration>> {
        self.tracker.ensure_table().await?;
        self.tracker.list_applied().await
    }

    /// Apply every migration on disk not yet recorded as applied, oldest
    /// first, each as its own transaction.
    #[tracing::instrument(skip(self))]
    pub async fn apply_all(&self) -> ConnectorResult<Vec<String>> {
        self.tracker.ensure_table().await?;
        let applied = self.tracker.list_applied().await?;
        let applied_names: Vec<&str> = applied.iter().map(|a| a.name.as_str()).collect();

        let mut newly_applied = Vec::new();
        for directory in self.migrations_on_disk()? {
            if applied_names.contains(&directory.name.as_str()) {
                continue;
            }
            self.apply_one(&directory).await?;
            newly_applied.push(directory.name.clone());
        }
        Ok(newly_applied)
    }

    async fn apply_one(&self, directory: &MigrationDirectory) -> ConnectorResult<()> {
        let sql = fs::read_to_string(&directory.up_sql_path)
            .map_err(|e| ConnectorError::generic(anyhow::Error::new(e)))?;
        self.run_script(&directory.name, &sql).await?;
        self.tracker.record_applied(&directory.name).await
    }

    /// Execute `down.sql` for `name` and remove its tracking-table row.
    /// Fails with `DownScriptMissing` if the migration has no down script.
    #[tracing::instrument(skip(self))]
    pub async fn rollback(&self, name: &str) -> ConnectorResult<()> {
        let directory = self.find_directory(name)?;
        if !std::path::Path::new(&directory.down_sql_path).exists() {
            return Err(ConnectorError::down_script_missing(name));
        }
        let sql = fs::read_to_string(&directory.down_sql_path)
            .map_err(|e| ConnectorError::generic(anyhow::Error::new(e)))?;
        self.run_script(&directory.name, &sql).await?;
        self.tracker.remove_applied(name).await
    }

    /// Compute the symmetric difference between the applied set and the
    /// prefix of disk migrations ending at `name` (spec §4.6).
    pub async fn plan_goto(&self, name: &str) -> ConnectorResult<GotoPlan> {
        let disk = self.migrations_on_disk()?;
        let target_index = disk
            .iter()
            .position(|d| d.name == name)
            .ok_or_else(|| ConnectorError::migration_not_found(name))?;
        let prefix: Vec<&str> = disk[..=target_index].iter().map(|d| d.name.as_str()).collect();

        let applied = self.tracker.list_applied().await?;
        let applied_names: Vec<&str> = applied.iter().map(|a| a.name.as_str()).collect();

        let to_rollback: Vec<String> = applied_names
            .iter()
            .rev()
            .filter(|n| !prefix.contains(n))
            .map(|n| n.to_string())
            .collect();
        let to_apply: Vec<String> = prefix
            .iter()
            .filter(|n| !applied_names.contains(n))
            .map(|n| n.to_string())
            .collect();

        Ok(GotoPlan { to_rollback, to_apply })
    }

    /// Move the applied set to exactly the prefix ending at `name`:
    /// rollback the extras (newest first), then apply the missing ones
    /// (oldest first).
    #[tracing::instrument(skip(self))]
    pub async fn goto(&self, name: &str) -> ConnectorResult<GotoPlan> {
        self.tracker.ensure_table().await?;
        let plan = self.plan_goto(name).await?;
        for extra in &plan.to_rollback {
            self.rollback(extra).await?;
        }
        for missing in &plan.to_apply {
            let directory = self.find_directory(missing)?;
            self.apply_one(&directory).await?;
        }
        Ok(plan)
    }

    /// Diff the live database against the schema snapshot recorded for
    /// `name`, without touching tracking-table state. Shared by `claim` and
    /// by the CLI's `claim --dry-run`.
    pub async fn diff_against_snapshot(&self, name: &str) -> ConnectorResult<minfold_differ::SchemaDiff> {
        let directory = self.find_directory(name)?;
        let live = self.introspect().await?;
        let snapshot = minfold_snapshot::load(&directory.schema_snapshot_path)?;
        let target = snapshot.into_schema();
        Ok(minfold_differ::diff(&live, &target))
    }

    /// Adopt a pre-existing database: assert the live schema matches the
    /// snapshot of `name`, then mark `name` and every earlier migration
    /// applied while unmarking every later one.
    #[tracing::instrument(skip(self))]
    pub async fn claim(&self, name: &str, force: bool) -> ConnectorResult<()> {
        self.tracker.ensure_table().await?;
        let disk = self.migrations_on_disk()?;
        let target_index = disk
            .iter()
            .position(|d| d.name == name)
            .ok_or_else(|| ConnectorError::migration_not_found(name))?;

        let diff = self.diff_against_snapshot(name).await?;
        if !diff.is_empty() && !force {
            return Err(ConnectorError::schema_mismatch(name, summarize_diff(&diff)));
        }

        let applied = self.tracker.list_applied().await?;
        let applied_names: Vec<&str> = applied.iter().map(|a| a.name.as_str()).collect();
        for (i, directory) in disk.iter().enumerate() {
            if i <= target_index {
                if !applied_names.contains(&directory.name.as_str()) {
                    self.tracker.record_applied(&directory.name).await?;
                }
            } else if applied_names.contains(&directory.name.as_str()) {
                self.tracker.remove_applied(&directory.name).await?;
            }
        }
        Ok(())
    }

    fn find_directory(&self, name: &str) -> ConnectorResult<MigrationDirectory> {
        self.migrations_on_disk()?
            .into_iter()
            .find(|d| d.name == name)
            .ok_or_else(|| ConnectorError::migration_not_found(name))
    }

    /// Run `sql` as one transactional unit: split on stand-alone `GO`,
    /// execute each non-empty batch, commit on success, roll back on any
    /// failure (spec §4.6/§5).
    async fn run_script(&self, migration_name: &str, sql: &str) -> ConnectorResult<()> {
        self.executor.begin().await?;
        for batch in minfold_connector::split_into_batches(sql) {
            if let Err(e) = self.executor.execute_batch(&batch).await {
                self.executor.rollback().await?;
                return Err(ConnectorError::script_execution_failed(migration_name, e.to_string()));
            }
        }
        self.executor.commit().await
    }
}

fn summarize_diff(diff: &minfold_differ::SchemaDiff) -> String {
    format!(
        "{} new table(s), {} dropped table(s), {} modified table(s)",
        diff.new_tables.len(),
        diff.dropped_tables.len(),
        diff.modified_tables.len()
    )
}
