use minfold_schema::{column::LENGTH_MAX, Column, SqlType};

/// §4.5.5: render a length modifier, with `-1` meaning `MAX`.
pub fn render_length(length: Option<i32>) -> String {
    match length {
        Some(LENGTH_MAX) | None => "MAX".to_string(),
        Some(n) => n.to_string(),
    }
}

/// §4.5.5: the type token plus whatever parenthesized modifier its kind
/// carries. Computed columns are handled separately by
/// [`render_column_definition`].
pub fn render_type(column: &Column) -> String {
    let keyword = column.sql_type.keyword();
    if column.sql_type.renders_length() {
        format!("{keyword}({})", render_length(column.length))
    } else if column.sql_type.renders_numeric_precision() {
        format!("{keyword}({})", column.precision.unwrap_or(18))
    } else if column.sql_type.renders_fractional_seconds_precision() {
        format!("{keyword}({})", column.length.unwrap_or(7))
    } else {
        keyword.to_string()
    }
}

/// `IDENTITY(seed,increment)`, defaulting to `(1,1)` when unknown.
pub fn render_identity(column: &Column) -> String {
    format!(
        "IDENTITY({},{})",
        column.identity_seed.unwrap_or(1),
        column.identity_increment.unwrap_or(1)
    )
}

/// The column's full inline definition as it appears in `CREATE TABLE`,
/// `ADD`, and `ALTER COLUMN` statements (spec §4.5.5).
pub fn render_column_definition(column: &Column) -> String {
    if column.is_computed {
        let expr = column.computed_sql.as_deref().unwrap_or("");
        return format!("[{}] AS {}", column.name, expr);
    }

    let mut parts = vec![format!("[{}]", column.name), render_type(column)];
    if column.is_identity {
        parts.push(render_identity(column));
    }
    parts.push(if column.is_nullable { "NULL".to_string() } else { "NOT NULL".to_string() });
    parts.join(" ")
}

/// Type-specific zero-value sentinel used when a `NOT NULL` column is added
/// to a table that may already hold rows and carries no explicit default
/// (spec §4.5.1 U8/6).
pub fn zero_value_sentinel(column: &Column) -> &'static str {
    use SqlType::*;
    match column.sql_type {
        Bit | TinyInt | SmallInt | Int | BigInt | Decimal | Numeric | Real | Float | Money | SmallMoney => "0",
        Char | VarChar | Text => "''",
        NChar | NVarChar | NText | Xml => "N''",
        Binary | VarBinary | Image => "0x00",
        Date | DateTime | DateTime2 | SmallDateTime | Timestamp => "CAST('1900-01-01' AS DATE)",
        DateTimeOffset => "CAST('1900-01-01' AS DATETIMEOFFSET)",
        Time => "CAST('00:00:00' AS TIME)",
        UniqueIdentifier => "NEWID()",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn base(sql_type: SqlType) -> Column {
        Column {
            name: "c".into(),
            sql_type,
            length: None,
            precision: None,
            scale: None,
            is_nullable: true,
            is_identity: false,
            identity_seed: None,
            identity_increment: None,
            is_computed: false,
            computed_sql: None,
            is_primary_key: false,
            default_value: None,
            default_constraint_name: None,
            ordinal_position: 1,
            foreign_keys: vec![],
        }
    }

    #[test]
    fn varchar_max_renders_as_max() {
        let mut c = base(SqlType::VarChar);
        c.length = Some(LENGTH_MAX);
        assert_eq!(render_type(&c), "VARCHAR(MAX)");
    }

    #[test]
    fn decimal_renders_precision_only_no_scale() {
        let mut c = base(SqlType::Decimal);
        c.precision = Some(18);
        c.scale = Some(4);
        assert_eq!(render_type(&c), "DECIMAL(18)");
    }

    #[test]
    fn computed_column_ignores_type_and_nullability() {
        let mut c = base(SqlType::Int);
        c.is_computed = true;
        c.computed_sql = Some("[a] + [b]".into());
        assert_eq!(render_column_definition(&c), "[c] AS [a] + [b]");
    }

    #[test]
    fn identity_defaults_to_one_one() {
        let mut c = base(SqlType::Int);
        c.is_identity = true;
        assert_eq!(render_identity(&c), "IDENTITY(1,1)");
    }
}
