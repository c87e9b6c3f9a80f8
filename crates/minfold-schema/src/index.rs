use serde::{Deserialize, Serialize};

/// A non-PK index. Primary-key indexes are represented implicitly via
/// `Column::is_primary_key` rather than as `Index` entries (spec §3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Index {
    pub name: String,
    pub schema: String,
    pub table: String,
    pub columns: Vec<String>,
    pub is_unique: bool,
}

impl Index {
    /// §4.1: equal when name, uniqueness, and column sequence (in order,
    /// case-insensitive) match.
    pub fn semantically_equal(&self, other: &Index) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
            && self.is_unique == other.is_unique
            && self.columns.len() == other.columns.len()
            && self
                .columns
                .iter()
                .zip(other.columns.iter())
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }

    /// Whether this index covers the given column name, used by the
    /// classifier's rule 5 (ordinal-position-change + index participation).
    pub fn covers_column(&self, column_name: &str) -> bool {
        self.columns.iter().any(|c| c.eq_ignore_ascii_case(column_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx() -> Index {
        Index {
            name: "IX_T_a_b".into(),
            schema: "dbo".into(),
            table: "T".into(),
            columns: vec!["a".into(), "b".into()],
            is_unique: false,
        }
    }

    #[test]
    fn column_order_matters() {
        let mut reordered = idx();
        reordered.columns = vec!["b".into(), "a".into()];
        assert!(!idx().semantically_equal(&reordered));
    }

    #[test]
    fn case_insensitive_columns_match() {
        let mut other = idx();
        other.columns = vec!["A".into(), "B".into()];
        assert!(idx().semantically_equal(&other));
    }

    #[test]
    fn covers_column_is_case_insensitive() {
        assert!(idx().covers_column("A"));
        assert!(!idx().covers_column("c"));
    }
}
