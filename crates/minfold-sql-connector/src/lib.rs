//! Migration Applier (component C6): the only crate in this workspace that
//! actually talks to a database, via the trait objects defined in
//! `minfold-connector`. Everything here is generic over those traits so it
//! can be exercised against in-memory fakes without a live SQL Server.

pub mod assembly;
pub mod connector;
pub mod ddl;

pub use assembly::introspect_schema;
pub use connector::{GotoPlan, SqlMigrationConnector};
pub use ddl::tracking_table_ddl;

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use minfold_connector::{AppliedMigration, ConnectorResult, MigrationTracker, ScriptExecutor};
    use minfold_schema::{ForeignKey, Sequence, StoredProcedure, Table};
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Default)]
    struct FakeIntrospector {
        tables: Vec<Table>,
    }

    #[async_trait]
    impl minfold_connector::SchemaIntrospector for FakeIntrospector {
        async fn get_schema(&self, _schema_filter: &str, _exclude_tables: &[String]) -> ConnectorResult<Vec<Table>> {
            Ok(self.tables.clone())
        }
        async fn get_foreign_keys(&self, _table_names: &[String]) -> ConnectorResult<Vec<ForeignKey>> {
            Ok(Vec::new())
        }
        async fn get_sequences(&self) -> ConnectorResult<Vec<Sequence>> {
            Ok(Vec::new())
        }
        async fn get_stored_procedures(&self) -> ConnectorResult<Vec<StoredProcedure>> {
            Ok(Vec::new())
        }
        async fn script_table_create(&self, _qualified_name: &str) -> ConnectorResult<Option<String>> {
            Ok(None)
        }
    }

    #[derive(Default)]
    struct FakeTracker {
        applied: Mutex<Vec<AppliedMigration>>,
    }

    #[async_trait]
    impl MigrationTracker for FakeTracker {
        async fn ensure_table(&self) -> ConnectorResult<()> {
            Ok(())
        }
        async fn list_applied(&self) -> ConnectorResult<Vec<AppliedMigration>> {
            Ok(self.applied.lock().unwrap().clone())
        }
        async fn record_applied(&self, name: &str) -> ConnectorResult<()> {
            let mut applied = self.applied.lock().unwrap();
            if !applied.iter().any(|a| a.name == name) {
                applied.push(AppliedMigration { name: name.to_string(), applied_at: Utc::now() });
            }
            Ok(())
        }
        async fn remove_applied(&self, name: &str) -> ConnectorResult<()> {
            self.applied.lock().unwrap().retain(|a| a.name != name);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeExecutor {
        batches: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ScriptExecutor for FakeExecutor {
        async fn begin(&self) -> ConnectorResult<()> {
            Ok(())
        }
        async fn execute_batch(&self, sql: &str) -> ConnectorResult<u64> {
            self.batches.lock().unwrap().push(sql.to_string());
            Ok(0)
        }
        async fn commit(&self) -> ConnectorResult<()> {
            Ok(())
        }
        async fn rollback(&self) -> ConnectorResult<()> {
            Ok(())
        }
    }

    fn make_migration(root: &std::path::Path, name: &str, up: &str, down: Option<&str>) {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("up.sql"), up).unwrap();
        if let Some(down) = down {
            std::fs::write(dir.join("down.sql"), down).unwrap();
        }
        let snapshot = minfold_snapshot::Snapshot::from_schema(&minfold_schema::Schema::new());
        minfold_snapshot::save(dir.join("schema.bin").to_str().unwrap(), &snapshot).unwrap();
    }

    fn connector(root: &str) -> SqlMigrationConnector {
        SqlMigrationConnector::new(
            Box::new(FakeIntrospector::default()),
            Box::new(FakeTracker::default()),
            Box::new(FakeExecutor::default()),
            root.to_string(),
            "dbo".to_string(),
        )
    }

    #[tokio::test]
    async fn apply_all_applies_pending_migrations_in_order() {
        let root = std::env::temp_dir().join(format!("minfold-sql-connector-apply-{}", std::process::id()));
        std::fs::create_dir_all(&root).unwrap();
        make_migration(&root, "20260101000000_first", "SELECT 1;\nGO\n", Some("SELECT 0;\nGO\n"));
        make_migration(&root, "20260102000000_second", "SELECT 2;\nGO\n", Some("SELECT 0;\nGO\n"));

        let connector = connector(root.to_str().unwrap());
        let applied = connector.apply_all().await.unwrap();
        assert_eq!(applied, vec!["20260101000000_first", "20260102000000_second"]);

        let recorded = connector.list_applied().await.unwrap();
        assert_eq!(recorded.len(), 2);

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn rollback_without_down_script_fails() {
        let root = std::env::temp_dir().join(format!("minfold-sql-connector-rollback-{}", std::process::id()));
        std::fs::create_dir_all(&root).unwrap();
        make_migration(&root, "20260101000000_first", "SELECT 1;\nGO\n", None);

        let connector = connector(root.to_str().unwrap());
        connector.apply_all().await.unwrap();
        let err = connector.rollback("20260101000000_first").await.unwrap_err();
        assert!(matches!(
            err.kind(),
            minfold_connector::ConnectorErrorKind::DownScriptMissing { .. }
        ));

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn goto_rolls_back_and_applies_to_reach_target() {
        let root = std::env::temp_dir().join(format!("minfold-sql-connector-goto-{}", std::process::id()));
        std::fs::create_dir_all(&root).unwrap();
        make_migration(&root, "20260101000000_first", "SELECT 1;\nGO\n", Some("SELECT 0;\nGO\n"));
        make_migration(&root, "20260102000000_second", "SELECT 2;\nGO\n", Some("SELECT 0;\nGO\n"));
        make_migration(&root, "20260103000000_third", "SELECT 3;\nGO\n", Some("SELECT 0;\nGO\n"));

        let connector = connector(root.to_str().unwrap());
        connector.apply_all().await.unwrap();

        let plan = connector.goto("20260101000000_first").await.unwrap();
        assert_eq!(
            plan.to_rollback,
            vec!["20260103000000_third".to_string(), "20260102000000_second".to_string()]
        );
        assert!(plan.to_apply.is_empty());

        let applied = connector.list_applied().await.unwrap();
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].name, "20260101000000_first");

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn migration_not_found_is_reported() {
        let root = std::env::temp_dir().join(format!("minfold-sql-connector-missing-{}", std::process::id()));
        std::fs::create_dir_all(&root).unwrap();

        let connector = connector(root.to_str().unwrap());
        let err = connector.rollback("does_not_exist").await.unwrap_err();
        assert!(matches!(
            err.kind(),
            minfold_connector::ConnectorErrorKind::MigrationNotFound { .. }
        ));

        std::fs::remove_dir_all(&root).ok();
    }
}
