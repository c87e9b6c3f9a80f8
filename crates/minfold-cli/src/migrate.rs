//! File-writing side of the CLI: scaffolds migration folders for
//! `generate-initial`, `generate-incremental` and `new` (spec §6 "Migration
//! folder layout").

use std::fs;
use std::path::Path;

use minfold_connector::{ConnectorError, ConnectorResult, SchemaIntrospector};
use minfold_schema::Schema;
use minfold_snapshot::Snapshot;
use minfold_sql_connector::SqlMigrationConnector;

use crate::{empty_schema, now_14digit_utc, null_observer};

fn slugify(description: &str) -> String {
    let mut slug = String::with_capacity(description.len());
    let mut last_was_sep = false;
    for c in description.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_sep = false;
        } else if !last_was_sep && !slug.is_empty() {
            slug.push('_');
            last_was_sep = true;
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("migration");
    }
    slug
}

fn write_migration(root: &str, folder_name: &str, up: &str, down: &str, snapshot: &Schema) -> ConnectorResult<()> {
    let dir = Path::new(root).join(folder_name);
    fs::create_dir_all(&dir).map_err(|e| ConnectorError::generic(anyhow::Error::new(e)))?;
    fs::write(dir.join("up.sql"), up).map_err(|e| ConnectorError::generic(anyhow::Error::new(e)))?;
    fs::write(dir.join("down.sql"), down).map_err(|e| ConnectorError::generic(anyhow::Error::new(e)))?;
    let path = dir.join("schema.bin");
    minfold_snapshot::save(path.to_str().unwrap(), &Snapshot::from_schema(snapshot))
}

/// Migration folders already on disk, oldest first, without needing a
/// connector (used by `new`, which never touches the database).
fn folders_on_disk(root: &str) -> ConnectorResult<Vec<String>> {
    if !Path::new(root).exists() {
        return Ok(Vec::new());
    }
    let mut names: Vec<String> = fs::read_dir(root)
        .map_err(|e| ConnectorError::generic(anyhow::Error::new(e)))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    names.sort();
    Ok(names)
}

/// `new <description>`: a blank migration folder for hand-written DDL. The
/// snapshot carries forward the last migration's recorded schema
/// unchanged — `new` never computes a diff, it only reserves a slot in the
/// migration sequence.
pub fn new_migration(root: &str, description: &str, dry_run: bool) -> ConnectorResult<()> {
    let folder_name = format!("{}_{}", now_14digit_utc(), slugify(description));
    let baseline = match folders_on_disk(root)?.last() {
        Some(last) => minfold_snapshot::load(&format!("{root}/{last}/schema.bin"))?.into_schema(),
        None => empty_schema(),
    };

    let up = "-- Generated using Minfold, do not edit manually\nSET XACT_ABORT ON;\n";
    let down = "-- Generated using Minfold, do not edit manually\nSET XACT_ABORT ON;\n";

    if dry_run {
        println!("would create {folder_name}");
        return Ok(());
    }
    write_migration(root, &folder_name, up, down, &baseline)?;
    println!("created {folder_name}");
    Ok(())
}

/// `generate-initial <description>`: the first migration, diffing an empty
/// baseline against the introspected live database so the up script
/// recreates the current database from nothing.
pub async fn generate_initial(
    introspector: &dyn SchemaIntrospector,
    root: &str,
    schema_filter: &str,
    description: &str,
    dry_run: bool,
) -> ConnectorResult<()> {
    if !folders_on_disk(root)?.is_empty() {
        return Err(ConnectorError::generic(anyhow::anyhow!(
            "migrations already exist under {root}; use generate-incremental instead"
        )));
    }
    let current = empty_schema();
    let target = minfold_sql_connector::introspect_schema(introspector, schema_filter).await?;
    scaffold(&current, &target, root, description, dry_run)
}

/// `generate-incremental <description>`: diffs the schema as recorded by
/// the last authored migration against the live database, capturing
/// whatever drift was applied directly against it since.
pub async fn generate_incremental(
    connector: &SqlMigrationConnector,
    root: &str,
    description: &str,
    dry_run: bool,
) -> ConnectorResult<()> {
    let migrations = connector.migrations_on_disk()?;
    if migrations.is_empty() {
        return Err(ConnectorError::generic(anyhow::anyhow!(
            "no migrations exist under {root} yet; use generate-initial first"
        )));
    }
    let applied = connector.list_applied().await?;
    let migration_dirs: Vec<minfold_connector::MigrationDirectory> = migrations;
    let baseline = minfold_snapshot::target_for(&migration_dirs, &applied)?;
    let current = baseline.into_schema();
    let target = connector.introspect().await?;
    scaffold(&current, &target, root, description, dry_run)
}

fn scaffold(current: &Schema, target: &Schema, root: &str, description: &str, dry_run: bool) -> ConnectorResult<()> {
    let diff = minfold_differ::diff(current, target);
    if diff.is_empty() {
        return Err(ConnectorError::no_changes());
    }
    let observer = null_observer();
    let up = minfold_planner::plan_up(&diff, current, target, &observer);
    let down = minfold_planner::plan_down(&diff, current, target, &observer);
    let folder_name = format!("{}_{}", now_14digit_utc(), slugify(description));

    if dry_run {
        println!("would create {folder_name}");
        println!("--- up.sql ---\n{up}");
        println!("--- down.sql ---\n{down}");
        return Ok(());
    }
    write_migration(root, &folder_name, &up, &down, target)?;
    println!("created {folder_name}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use minfold_connector::ConnectorErrorKind;
    use minfold_schema::Table;
    use pretty_assertions::assert_eq;

    #[test]
    fn slugify_lowercases_and_collapses_separators() {
        assert_eq!(slugify("Add Customer Table"), "add_customer_table");
        assert_eq!(slugify("weird!!  spacing--here"), "weird_spacing_here");
    }

    #[test]
    fn slugify_falls_back_to_migration_when_nothing_alphanumeric() {
        assert_eq!(slugify("---"), "migration");
    }

    #[test]
    fn new_migration_writes_an_empty_script_pair() {
        let root = std::env::temp_dir().join(format!("minfold-cli-new-{}", std::process::id()));
        std::fs::create_dir_all(&root).unwrap();

        new_migration(root.to_str().unwrap(), "blank slot", false).unwrap();

        let folder = std::fs::read_dir(&root).unwrap().next().unwrap().unwrap().path();
        let up = std::fs::read_to_string(folder.join("up.sql")).unwrap();
        assert!(up.starts_with("-- Generated using Minfold, do not edit manually"));
        assert!(folder.join("schema.bin").exists());

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn generate_initial_rejects_an_already_populated_root() {
        let root = std::env::temp_dir().join(format!("minfold-cli-initial-{}", std::process::id()));
        std::fs::create_dir_all(&root).unwrap();
        new_migration(root.to_str().unwrap(), "first", false).unwrap();

        struct EmptyIntrospector;
        #[async_trait::async_trait]
        impl SchemaIntrospector for EmptyIntrospector {
            async fn get_schema(&self, _: &str, _: &[String]) -> ConnectorResult<Vec<Table>> {
                Ok(Vec::new())
            }
            async fn get_foreign_keys(&self, _: &[String]) -> ConnectorResult<Vec<minfold_schema::ForeignKey>> {
                Ok(Vec::new())
            }
            async fn get_sequences(&self) -> ConnectorResult<Vec<minfold_schema::Sequence>> {
                Ok(Vec::new())
            }
            async fn get_stored_procedures(&self) -> ConnectorResult<Vec<minfold_schema::StoredProcedure>> {
                Ok(Vec::new())
            }
            async fn script_table_create(&self, _: &str) -> ConnectorResult<Option<String>> {
                Ok(None)
            }
        }

        let err = generate_initial(&EmptyIntrospector, root.to_str().unwrap(), "dbo", "second", false)
            .await
            .unwrap_err();
        assert!(matches!(err.kind(), ConnectorErrorKind::Generic(_)));

        std::fs::remove_dir_all(&root).ok();
    }
}
