//! CLI driver (component C8): a thin `clap`-derived wrapper around
//! C2 (snapshot store), C3/C4 (differ/classifier), C5 (planner) and C6 (the
//! applier). Every subcommand here either writes migration files
//! (`generate-initial`, `generate-incremental`, `new`) or drives a
//! [`minfold_sql_connector::SqlMigrationConnector`] against whatever
//! [`minfold_connector::SchemaIntrospector`] / `MigrationTracker` /
//! `ScriptExecutor` trio `connect` wires up (spec §6).

use chrono::Utc;
use clap::{Parser, Subcommand};
use minfold_connector::{ConnectorError, ConnectorResult, MigrationTracker, ScriptExecutor};
use minfold_connector::{NullObserver, SchemaIntrospector};
use minfold_schema::Schema;
use minfold_sql_connector::SqlMigrationConnector;

pub mod migrate;

#[derive(Parser, Debug)]
#[command(name = "minfold", about = "Phased SQL Server schema migrations")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Root directory holding migration folders (spec §6:
    /// `<code_path>/Dao/Migrations`).
    #[arg(long, global = true, default_value = "Dao/Migrations")]
    pub migrations_root: String,

    /// SQL Server schema to introspect and migrate.
    #[arg(long, global = true, default_value = "dbo")]
    pub schema: String,

    /// Connection string for the live database. Required by every
    /// subcommand except `new`, which only ever touches the filesystem.
    #[arg(long, global = true, env = "MINFOLD_CONNECTION_STRING")]
    pub connection_string: Option<String>,

    /// Describe what would happen without touching the database or,
    /// for `generate-*`/`new`, without writing files.
    #[arg(long, global = true)]
    pub dry_run: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Bootstrap the first migration from an empty baseline schema.
    GenerateInitial { description: String },
    /// Diff the live database against the last recorded snapshot and
    /// scaffold a migration capturing the drift.
    GenerateIncremental { description: String },
    /// Apply every migration on disk that isn't recorded as applied yet.
    Apply,
    /// Run `down.sql` for one migration and unmark it.
    Rollback { name: String },
    /// Move the applied set to exactly the prefix ending at `name`.
    Goto { name: String },
    /// Adopt a pre-existing database at migration `name` (or `latest`).
    Claim {
        name: String,
        #[arg(long)]
        force: bool,
    },
    /// Scaffold a blank migration folder for hand-written DDL.
    New { description: String },
}

/// Install a `tracing-subscriber` `fmt` layer driven by `RUST_LOG`,
/// mirroring the teacher's own `EnvFilter`-based subscriber setup.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Render a [`ConnectorError`] to stderr and return the process exit code
/// the contract in spec §6 specifies: 0 on success, 1 on any error.
pub fn exit_code(result: &ConnectorResult<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}

/// Dispatch one parsed [`Cli`] invocation. Kept separate from `main` so it
/// can be exercised without a `std::process::exit` call.
pub async fn run(cli: Cli) -> ConnectorResult<()> {
    match &cli.command {
        Command::New { description } => migrate::new_migration(&cli.migrations_root, description, cli.dry_run),
        Command::GenerateInitial { description } => {
            let introspector = connect_introspector(&cli)?;
            migrate::generate_initial(
                introspector.as_ref(),
                &cli.migrations_root,
                &cli.schema,
                description,
                cli.dry_run,
            )
            .await
        }
        Command::GenerateIncremental { description } => {
            let connector = connect(&cli)?;
            migrate::generate_incremental(&connector, &cli.migrations_root, description, cli.dry_run).await
        }
        Command::Apply => {
            let connector = connect(&cli)?;
            if cli.dry_run {
                let applied = connector.list_applied().await?;
                let applied_names: Vec<&str> = applied.iter().map(|a| a.name.as_str()).collect();
                for directory in connector.migrations_on_disk()? {
                    if !applied_names.contains(&directory.name.as_str()) {
                        println!("would apply {}", directory.name);
                    }
                }
                return Ok(());
            }
            for name in connector.apply_all().await? {
                println!("applied {name}");
            }
            Ok(())
        }
        Command::Rollback { name } => {
            let connector = connect(&cli)?;
            if cli.dry_run {
                let directory = connector
                    .migrations_on_disk()?
                    .into_iter()
                    .find(|d| &d.name == name)
                    .ok_or_else(|| ConnectorError::migration_not_found(name))?;
                if !std::path::Path::new(&directory.down_sql_path).exists() {
                    return Err(ConnectorError::down_script_missing(name));
                }
                println!("would roll back {name}");
                return Ok(());
            }
            connector.rollback(name).await?;
            println!("rolled back {name}");
            Ok(())
        }
        Command::Goto { name } => {
            let connector = connect(&cli)?;
            if cli.dry_run {
                let plan = connector.plan_goto(name).await?;
                for n in &plan.to_rollback {
                    println!("would roll back {n}");
                }
                for n in &plan.to_apply {
                    println!("would apply {n}");
                }
                return Ok(());
            }
            let plan = connector.goto(name).await?;
            for n in &plan.to_rollback {
                println!("rolled back {n}");
            }
            for n in &plan.to_apply {
                println!("applied {n}");
            }
            Ok(())
        }
        Command::Claim { name, force } => {
            let connector = connect(&cli)?;
            let name = resolve_claim_target(&connector, name)?;
            if cli.dry_run {
                let diff = connector.diff_against_snapshot(&name).await?;
                if diff.is_empty() || *force {
                    println!("would claim {name}");
                } else {
                    println!("schema mismatch against {name}, {} new table(s), {} dropped table(s), {} modified table(s)",
                        diff.new_tables.len(), diff.dropped_tables.len(), diff.modified_tables.len());
                }
                return Ok(());
            }
            connector.claim(&name, *force).await?;
            println!("claimed {name}");
            Ok(())
        }
    }
}

fn resolve_claim_target(connector: &SqlMigrationConnector, name: &str) -> ConnectorResult<String> {
    if name != "latest" {
        return Ok(name.to_string());
    }
    connector
        .migrations_on_disk()?
        .last()
        .map(|d| d.name.clone())
        .ok_or_else(|| ConnectorError::migration_not_found("latest"))
}

/// The live-database wiring seam. No concrete SQL Server driver ships in
/// this workspace (introspection and execution are a contract, not an
/// implementation, per spec §6) — a deployment plugs in a real
/// `SchemaIntrospector`/`MigrationTracker`/`ScriptExecutor` here.
fn connect(cli: &Cli) -> ConnectorResult<SqlMigrationConnector> {
    let (introspector, tracker, executor) = connect_live(cli)?;
    Ok(SqlMigrationConnector::new(
        introspector,
        tracker,
        executor,
        cli.migrations_root.clone(),
        cli.schema.clone(),
    ))
}

fn connect_introspector(cli: &Cli) -> ConnectorResult<Box<dyn SchemaIntrospector>> {
    let (introspector, _tracker, _executor) = connect_live(cli)?;
    Ok(introspector)
}

fn connect_live(
    cli: &Cli,
) -> ConnectorResult<(Box<dyn SchemaIntrospector>, Box<dyn MigrationTracker>, Box<dyn ScriptExecutor>)> {
    let _connection_string = cli
        .connection_string
        .as_ref()
        .ok_or_else(|| ConnectorError::generic(anyhow::anyhow!("no --connection-string or MINFOLD_CONNECTION_STRING given")))?;
    Err(ConnectorError::generic(anyhow::anyhow!(
        "this build has no SQL Server driver wired into `connect_live`; implement \
         SchemaIntrospector/MigrationTracker/ScriptExecutor against a real connection to run live commands"
    )))
}

/// Empty-baseline `Schema`, used as `current` for `generate-initial` and
/// as the fallback when a migrations root has no folders on disk yet.
pub(crate) fn empty_schema() -> Schema {
    Schema::new()
}

pub(crate) fn null_observer() -> NullObserver {
    NullObserver
}

pub(crate) fn now_14digit_utc() -> String {
    Utc::now().format("%Y%m%d%H%M%S").to_string()
}
