//! Snapshot Store (component C2, spec §4.2): persists the schema a migration
//! was authored against so a later authoring step has a "before" reference
//! without re-introspecting the live database.
//!
//! On disk a snapshot is GZip-compressed JSON, one file per migration
//! (`schema.bin`, spec §6), with PascalCase keys carried over from
//! [`minfold_schema`]'s own wire format.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use indexmap::IndexMap;
use minfold_connector::{AppliedMigration, ConnectorError, ConnectorResult, MigrationDirectory};
use minfold_schema::{Schema, Sequence, StoredProcedure, Table};
use serde::{Deserialize, Serialize};

/// The snapshot format version this build writes and the newest version it
/// can read. A snapshot whose `version` exceeds this is from a newer build
/// and is rejected rather than partially trusted.
pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Snapshot {
    pub version: u32,
    pub tables: IndexMap<String, Table>,
    pub sequences: IndexMap<String, Sequence>,
    pub procedures: IndexMap<String, StoredProcedure>,
}

impl Snapshot {
    pub fn from_schema(schema: &Schema) -> Self {
        Snapshot {
            version: CURRENT_SNAPSHOT_VERSION,
            tables: schema.tables.clone(),
            sequences: schema.sequences.clone(),
            procedures: schema.procedures.clone(),
        }
    }

    pub fn into_schema(self) -> Schema {
        Schema {
            tables: self.tables,
            sequences: self.sequences,
            procedures: self.procedures,
        }
    }
}

/// Write `snapshot` to `path` as GZip-compressed JSON.
pub fn save(path: &str, snapshot: &Snapshot) -> ConnectorResult<()> {
    tracing::debug!(path, version = snapshot.version, "writing snapshot");
    let json = serde_json::to_vec(snapshot)
        .map_err(|e| ConnectorError::generic(anyhow::Error::new(e)))?;
    if let Some(parent) = Path::new(path).parent() {
        fs::create_dir_all(parent).map_err(|e| ConnectorError::generic(anyhow::Error::new(e)))?;
    }
    let file = fs::File::create(path).map_err(|e| ConnectorError::generic(anyhow::Error::new(e)))?;
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder
        .write_all(&json)
        .map_err(|e| ConnectorError::generic(anyhow::Error::new(e)))?;
    encoder
        .finish()
        .map_err(|e| ConnectorError::generic(anyhow::Error::new(e)))?;
    Ok(())
}

/// Load and decompress the snapshot at `path`.
///
/// Fails with [`ConnectorErrorKind::SnapshotNotFound`](minfold_connector::ConnectorErrorKind::SnapshotNotFound)
/// if the file does not exist, `SnapshotUnsupportedVersion` if its `version`
/// is newer than [`CURRENT_SNAPSHOT_VERSION`], or `SnapshotCorrupt` if the
/// bytes do not decompress or parse.
pub fn load(path: &str) -> ConnectorResult<Snapshot> {
    if !Path::new(path).exists() {
        return Err(ConnectorError::snapshot_not_found(path));
    }
    let file = fs::File::open(path).map_err(|e| ConnectorError::generic(anyhow::Error::new(e)))?;
    let mut decoder = GzDecoder::new(file);
    let mut json = Vec::new();
    decoder
        .read_to_end(&mut json)
        .map_err(|e| ConnectorError::snapshot_corrupt(path, anyhow::Error::new(e)))?;
    let snapshot: Snapshot = serde_json::from_slice(&json)
        .map_err(|e| ConnectorError::snapshot_corrupt(path, anyhow::Error::new(e)))?;
    if snapshot.version > CURRENT_SNAPSHOT_VERSION {
        return Err(ConnectorError::snapshot_unsupported_version(
            path,
            snapshot.version,
            CURRENT_SNAPSHOT_VERSION,
        ));
    }
    Ok(snapshot)
}

/// Resolve the "before" snapshot for the next authoring step (spec §4.2):
/// the snapshot of the last applied migration, or the snapshot of the
/// chronologically first migration on disk when nothing is applied yet.
/// `migrations` must already be ordered chronologically (oldest first), the
/// same order the CLI lists migration folders in.
pub fn target_for(migrations: &[MigrationDirectory], applied: &[AppliedMigration]) -> ConnectorResult<Snapshot> {
    let directory = match applied.last() {
        Some(last) => migrations
            .iter()
            .find(|m| m.name == last.name)
            .ok_or_else(|| ConnectorError::migration_not_found(&last.name))?,
        None => migrations
            .first()
            .ok_or_else(|| ConnectorError::migration_not_found("<none>"))?,
    };
    load(&directory.schema_snapshot_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use minfold_schema::{Column, SqlType};
    use pretty_assertions::assert_eq;

    fn int_column(name: &str) -> Column {
        Column {
            name: name.into(),
            sql_type: SqlType::Int,
            length: None,
            precision: None,
            scale: None,
            is_nullable: false,
            is_identity: false,
            identity_seed: None,
            identity_increment: None,
            is_computed: false,
            computed_sql: None,
            is_primary_key: true,
            default_value: None,
            default_constraint_name: None,
            ordinal_position: 1,
            foreign_keys: vec![],
        }
    }

    fn sample_schema() -> Schema {
        let mut schema = Schema::new();
        let mut table = minfold_schema::Table::new("Orders", "dbo");
        table.add_column(int_column("id"));
        schema.add_table(table);
        schema
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = std::env::temp_dir().join(format!("minfold-snapshot-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("schema.bin");
        let path_str = path.to_str().unwrap();

        let snapshot = Snapshot::from_schema(&sample_schema());
        save(path_str, &snapshot).unwrap();
        let loaded = load(path_str).unwrap();

        assert_eq!(loaded.version, CURRENT_SNAPSHOT_VERSION);
        assert!(loaded.tables.contains_key("orders"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn load_missing_file_is_snapshot_not_found() {
        let err = load("/nonexistent/minfold/schema.bin").unwrap_err();
        assert!(matches!(
            err.kind(),
            minfold_connector::ConnectorErrorKind::SnapshotNotFound { .. }
        ));
    }

    #[test]
    fn load_rejects_newer_version() {
        let dir = std::env::temp_dir().join(format!("minfold-snapshot-version-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("schema.bin");
        let path_str = path.to_str().unwrap();

        let mut snapshot = Snapshot::from_schema(&sample_schema());
        snapshot.version = CURRENT_SNAPSHOT_VERSION + 1;
        save(path_str, &snapshot).unwrap();

        let err = load(path_str).unwrap_err();
        assert!(matches!(
            err.kind(),
            minfold_connector::ConnectorErrorKind::SnapshotUnsupportedVersion { .. }
        ));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn target_for_picks_last_applied() {
        let dir = std::env::temp_dir().join(format!("minfold-snapshot-target-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let m1 = MigrationDirectory::new(dir.to_str().unwrap(), "20260101000000_first");
        let m2 = MigrationDirectory::new(dir.to_str().unwrap(), "20260102000000_second");
        save(&m1.schema_snapshot_path, &Snapshot::from_schema(&Schema::new())).unwrap();
        let mut second_schema = Schema::new();
        second_schema.add_table(minfold_schema::Table::new("Orders", "dbo"));
        save(&m2.schema_snapshot_path, &Snapshot::from_schema(&second_schema)).unwrap();

        let applied = vec![
            AppliedMigration { name: m1.name.clone(), applied_at: chrono::Utc::now() },
            AppliedMigration { name: m2.name.clone(), applied_at: chrono::Utc::now() },
        ];
        let target = target_for(&[m1, m2], &applied).unwrap();
        assert!(target.tables.contains_key("orders"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn target_for_picks_first_migration_when_nothing_applied() {
        let dir = std::env::temp_dir().join(format!("minfold-snapshot-baseline-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let m1 = MigrationDirectory::new(dir.to_str().unwrap(), "20260101000000_first");
        save(&m1.schema_snapshot_path, &Snapshot::from_schema(&sample_schema())).unwrap();

        let target = target_for(&[m1], &[]).unwrap();
        assert!(target.tables.contains_key("orders"));

        fs::remove_dir_all(&dir).ok();
    }
}
