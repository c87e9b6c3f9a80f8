//! Assembles a [`Schema`] from the four independent calls the introspection
//! contract exposes (spec §6), wiring each foreign key onto the column it
//! originates from so the rest of the engine only ever deals with
//! `Column::foreign_keys`.

use minfold_connector::{ConnectorResult, SchemaIntrospector};
use minfold_schema::{Schema, MIGRATIONS_TABLE_NAME};

pub async fn introspect_schema(
    introspector: &dyn SchemaIntrospector,
    schema_filter: &str,
) -> ConnectorResult<Schema> {
    let exclude = vec![MIGRATIONS_TABLE_NAME.to_string()];
    let mut tables = introspector.get_schema(schema_filter, &exclude).await?;

    let table_names: Vec<String> = tables.iter().map(|t| t.name.clone()).collect();
    let foreign_keys = introspector.get_foreign_keys(&table_names).await?;
    for fk in foreign_keys {
        if let Some(table) = tables.iter_mut().find(|t| t.name.eq_ignore_ascii_case(&fk.table)) {
            if let Some(column) = table.columns.get_mut(&fk.column.to_lowercase()) {
                column.foreign_keys.push(fk);
            }
        }
    }

    let sequences = introspector.get_sequences().await?;
    let procedures = introspector.get_stored_procedures().await?;

    let mut schema = Schema::new();
    for table in tables {
        schema.add_table(table);
    }
    for sequence in sequences {
        schema.add_sequence(sequence);
    }
    for procedure in procedures {
        schema.add_procedure(procedure);
    }
    Ok(schema)
}
