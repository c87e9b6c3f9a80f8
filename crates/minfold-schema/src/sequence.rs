use serde::{Deserialize, Serialize};

/// §4.5.1 U6 / §9 design note 4: SQL Server `ALTER SEQUENCE` only supports a
/// subset of attributes, so a `Sequence` change is always rendered as
/// `DROP`+`CREATE`, which resets the current value. This is expected;
/// callers must not rely on sequence state surviving a modification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Sequence {
    pub name: String,
    pub schema: String,
    pub data_type: String,
    pub start_value: Option<i64>,
    pub increment: Option<i64>,
    pub min_value: Option<i64>,
    pub max_value: Option<i64>,
    pub cycle: bool,
    pub cache_size: Option<i64>,
}

impl Sequence {
    /// §4.1: equal when every persisted attribute matches. Plain structural
    /// equality is sufficient since `Sequence` carries no opaque-text fields.
    pub fn semantically_equal(&self, other: &Sequence) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
            && self.schema.eq_ignore_ascii_case(&other.schema)
            && self.data_type.eq_ignore_ascii_case(&other.data_type)
            && self.start_value == other.start_value
            && self.increment == other.increment
            && self.min_value == other.min_value
            && self.max_value == other.max_value
            && self.cycle == other.cycle
            && self.cache_size == other.cache_size
    }
}
