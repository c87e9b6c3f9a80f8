use std::fmt;

use thiserror::Error;

/// The typed error kinds this engine can produce (spec §7). Each variant
/// carries just enough structured context to render a human-facing message;
/// opaque external failures (a bad driver round-trip, for instance) are
/// wrapped through [`ConnectorError::generic`] instead of growing this enum.
#[derive(Debug, Error)]
pub enum ConnectorErrorKind {
    #[error("failed to introspect the database schema")]
    IntrospectionFailed,

    #[error("no snapshot found for migration `{migration}`")]
    SnapshotNotFound { migration: String },

    #[error("snapshot for migration `{migration}` is version {found}, which this build (max {supported}) cannot read")]
    SnapshotUnsupportedVersion {
        migration: String,
        found: u32,
        supported: u32,
    },

    #[error("snapshot for migration `{migration}` is corrupt: {reason}")]
    SnapshotCorrupt { migration: String, reason: String },

    #[error("no changes to generate")]
    NoChanges,

    #[error("planning invariant violated: {reason}")]
    PlanningInvariantViolated { reason: String },

    #[error("script execution failed in migration `{migration}`: {reason}")]
    ScriptExecutionFailed { migration: String, reason: String },

    #[error("live schema does not match the snapshot for migration `{migration}`")]
    SchemaMismatch { migration: String, diff_summary: String },

    #[error("migration `{name}` was not found")]
    MigrationNotFound { name: String },

    #[error("migration `{name}` has no down script")]
    DownScriptMissing { name: String },

    #[error("{0}")]
    Generic(String),
}

/// Top-level connector error: a [`ConnectorErrorKind`] plus an optional
/// chained cause, mirroring the teacher's `ConnectorError` (inner kind enum
/// + boxed `anyhow::Error` source).
#[derive(Debug)]
pub struct ConnectorError {
    pub kind: ConnectorErrorKind,
    pub source: Option<anyhow::Error>,
}

impl ConnectorError {
    pub fn new(kind: ConnectorErrorKind) -> Self {
        ConnectorError { kind, source: None }
    }

    pub fn with_source(kind: ConnectorErrorKind, source: anyhow::Error) -> Self {
        ConnectorError {
            kind,
            source: Some(source),
        }
    }

    pub fn generic(error: anyhow::Error) -> Self {
        ConnectorError {
            kind: ConnectorErrorKind::Generic(error.to_string()),
            source: Some(error),
        }
    }

    pub fn introspection_failed(source: anyhow::Error) -> Self {
        ConnectorError::with_source(ConnectorErrorKind::IntrospectionFailed, source)
    }

    pub fn snapshot_not_found(migration: impl Into<String>) -> Self {
        ConnectorError::new(ConnectorErrorKind::SnapshotNotFound {
            migration: migration.into(),
        })
    }

    pub fn snapshot_unsupported_version(migration: impl Into<String>, found: u32, supported: u32) -> Self {
        ConnectorError::new(ConnectorErrorKind::SnapshotUnsupportedVersion {
            migration: migration.into(),
            found,
            supported,
        })
    }

    pub fn snapshot_corrupt(migration: impl Into<String>, source: anyhow::Error) -> Self {
        ConnectorError::with_source(
            ConnectorErrorKind::SnapshotCorrupt {
                migration: migration.into(),
                reason: source.to_string(),
            },
            source,
        )
    }

    pub fn migration_not_found(name: impl Into<String>) -> Self {
        ConnectorError::new(ConnectorErrorKind::MigrationNotFound { name: name.into() })
    }

    pub fn down_script_missing(name: impl Into<String>) -> Self {
        ConnectorError::new(ConnectorErrorKind::DownScriptMissing { name: name.into() })
    }

    pub fn schema_mismatch(migration: impl Into<String>, diff_summary: impl Into<String>) -> Self {
        ConnectorError::new(ConnectorErrorKind::SchemaMismatch {
            migration: migration.into(),
            diff_summary: diff_summary.into(),
        })
    }

    pub fn no_changes() -> Self {
        ConnectorError::new(ConnectorErrorKind::NoChanges)
    }

    pub fn planning_invariant_violated(reason: impl Into<String>) -> Self {
        ConnectorError::new(ConnectorErrorKind::PlanningInvariantViolated { reason: reason.into() })
    }

    pub fn script_execution_failed(migration: impl Into<String>, reason: impl Into<String>) -> Self {
        ConnectorError::new(ConnectorErrorKind::ScriptExecutionFailed {
            migration: migration.into(),
            reason: reason.into(),
        })
    }

    pub fn kind(&self) -> &ConnectorErrorKind {
        &self.kind
    }
}

impl fmt::Display for ConnectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for ConnectorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| {
            let as_std: &(dyn std::error::Error + Send + Sync + 'static) = e.as_ref();
            as_std as &(dyn std::error::Error + 'static)
        })
    }
}

pub type ConnectorResult<T> = Result<T, ConnectorError>;
