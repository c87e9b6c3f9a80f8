/// `CREATE TABLE` text for the tracking table (spec §4.6). A real
/// [`minfold_connector::ScriptExecutor`]/[`minfold_connector::MigrationTracker`]
/// implementation is expected to run this, guarded by existence, the first
/// time it talks to a database.
pub fn tracking_table_ddl() -> &'static str {
    "IF OBJECT_ID(N'[dbo].[__MinfoldMigrations]', N'U') IS NULL\n\
     CREATE TABLE [dbo].[__MinfoldMigrations] (\n\
     \x20   [Id] INT IDENTITY(1,1) PRIMARY KEY,\n\
     \x20   [MigrationName] NVARCHAR(260) NOT NULL UNIQUE,\n\
     \x20   [AppliedAt] DATETIME2 NOT NULL DEFAULT SYSUTCDATETIME()\n\
     );\n"
}
