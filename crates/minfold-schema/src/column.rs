use serde::{Deserialize, Serialize};

use crate::normalize::{normalize_default_value, normalize_whitespace};
use crate::sql_type::SqlType;
use crate::ForeignKey;

/// `-1` denotes `MAX` for length-bearing types (spec §3).
pub const LENGTH_MAX: i32 = -1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Column {
    pub name: String,
    pub sql_type: SqlType,
    pub length: Option<i32>,
    pub precision: Option<u8>,
    pub scale: Option<u8>,
    pub is_nullable: bool,
    pub is_identity: bool,
    pub identity_seed: Option<i64>,
    pub identity_increment: Option<i64>,
    pub is_computed: bool,
    pub computed_sql: Option<String>,
    pub is_primary_key: bool,
    pub default_value: Option<String>,
    pub default_constraint_name: Option<String>,
    /// 1-based, unique and contiguous within a table after any in-memory
    /// transformation applied by the differ/planner (spec §3 invariant).
    pub ordinal_position: i32,
    pub foreign_keys: Vec<ForeignKey>,
}

impl Column {
    /// §4.1 columns-equal predicate. `ordinal_position` is deliberately
    /// excluded — column order changes are detected separately by the
    /// differ's column-order-only pass (§4.3).
    pub fn semantically_equal(&self, other: &Column) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
            && self.is_nullable == other.is_nullable
            && self.is_identity == other.is_identity
            && self.is_computed == other.is_computed
            && self.is_primary_key == other.is_primary_key
            && self.sql_type == other.sql_type
            && self.length == other.length
            && self.precision == other.precision
            && self.scale == other.scale
            && self.identity_seed_and_increment_equal(other)
            && self.computed_sql_equal(other)
            && self.default_value_equal(other)
    }

    fn identity_seed_and_increment_equal(&self, other: &Column) -> bool {
        if !self.is_identity || !other.is_identity {
            // The flag comparison above already requires both sides to
            // agree on is_identity; when neither is an identity column,
            // seed/increment is meaningless and not compared.
            return true;
        }
        self.identity_seed == other.identity_seed && self.identity_increment == other.identity_increment
    }

    fn computed_sql_equal(&self, other: &Column) -> bool {
        match (&self.computed_sql, &other.computed_sql) {
            (Some(a), Some(b)) => normalize_whitespace(a) == normalize_whitespace(b),
            (None, None) => true,
            _ => false,
        }
    }

    fn default_value_equal(&self, other: &Column) -> bool {
        match (&self.default_value, &other.default_value) {
            (Some(a), Some(b)) => normalize_default_value(a) == normalize_default_value(b),
            (None, None) => true,
            _ => false,
        }
    }

    /// Whether the column's `sql_type`, `length`, `precision`, or `scale`
    /// differ from `other` — used by cross-table type propagation (§4.3) to
    /// decide whether a referencing column's type needs to be realigned.
    pub fn type_differs(&self, other: &Column) -> bool {
        self.sql_type != other.sql_type
            || self.length != other.length
            || self.precision != other.precision
            || self.scale != other.scale
    }

    /// Heuristic substring search used by the classifier's rule 5: does this
    /// column's name appear (bracketed or bare, case-insensitive) inside the
    /// given computed expression? Documented in spec §9 as a heuristic, not
    /// a real SQL expression parse.
    pub fn referenced_by_expression(column_name: &str, expression: &str) -> bool {
        let haystack = expression.to_lowercase();
        let bracketed = format!("[{}]", column_name.to_lowercase());
        let bare = column_name.to_lowercase();
        haystack.contains(&bracketed) || word_boundary_contains(&haystack, &bare)
    }
}

/// Bare-name match that requires word boundaries on both sides, so that
/// e.g. column `id` does not match inside `valid_id`.
fn word_boundary_contains(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(needle) {
        let abs = start + pos;
        let before_ok = abs == 0 || !is_ident_char(haystack.as_bytes()[abs - 1]);
        let after = abs + needle.len();
        let after_ok = after == haystack.len() || !is_ident_char(haystack.as_bytes()[after]);
        if before_ok && after_ok {
            return true;
        }
        start = abs + 1;
    }
    false
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_column() -> Column {
        Column {
            name: "id".into(),
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

    #[test]
    fn ordinal_position_excluded_from_equality() {
        let mut reordered = base_column();
        reordered.ordinal_position = 5;
        assert!(base_column().semantically_equal(&reordered));
    }

    #[test]
    fn default_value_parens_normalized() {
        let mut a = base_column();
        a.default_value = Some("((0))".into());
        let mut b = base_column();
        b.default_value = Some("0".into());
        assert!(a.semantically_equal(&b));
    }

    #[test]
    fn decimal_precision_and_scale_round_trip() {
        // Open question #1 (spec §9): precision/scale must each be carried
        // and compared independently, not collapsed into a single value.
        let mut a = base_column();
        a.sql_type = SqlType::Decimal;
        a.precision = Some(18);
        a.scale = Some(4);
        let mut b = a.clone();
        b.scale = Some(2);
        assert!(!a.semantically_equal(&b));
        assert!(a.semantically_equal(&a.clone()));
    }

    #[test]
    fn referenced_by_expression_matches_bracketed_and_bare() {
        assert!(Column::referenced_by_expression("price", "[price] * [qty]"));
        assert!(Column::referenced_by_expression("price", "price * qty"));
        assert!(!Column::referenced_by_expression("price", "unit_price * qty"));
    }
}
