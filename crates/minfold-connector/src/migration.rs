use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the `__MinfoldMigrations` tracking table (spec §4.6/§6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedMigration {
    pub name: String,
    pub applied_at: DateTime<Utc>,
}

/// The on-disk view of one migration folder (spec §6:
/// `<code_path>/Dao/Migrations/<YYYYMMDDHHMMSS>_<description>/`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationDirectory {
    pub name: String,
    pub up_sql_path: String,
    pub down_sql_path: String,
    pub schema_snapshot_path: String,
}

impl MigrationDirectory {
    pub fn new(root: &str, name: &str) -> Self {
        let folder = format!("{root}/{name}");
        MigrationDirectory {
            name: name.to_string(),
            up_sql_path: format!("{folder}/up.sql"),
            down_sql_path: format!("{folder}/down.sql"),
            schema_snapshot_path: format!("{folder}/schema.bin"),
        }
    }
}
