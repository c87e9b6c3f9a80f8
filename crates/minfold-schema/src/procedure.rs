use serde::{Deserialize, Serialize};

use crate::normalize::normalize_whitespace;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StoredProcedure {
    pub name: String,
    pub schema: String,
    pub definition: String,
}

impl StoredProcedure {
    /// §4.1: equal when whitespace-normalized definitions match
    /// (case-insensitive, via `normalize_whitespace`'s lowercasing).
    pub fn semantically_equal(&self, other: &StoredProcedure) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
            && self.schema.eq_ignore_ascii_case(&other.schema)
            && normalize_whitespace(&self.definition) == normalize_whitespace(&other.definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reformatted_body_is_still_equal() {
        let a = StoredProcedure {
            name: "usp_Foo".into(),
            schema: "dbo".into(),
            definition: "CREATE PROCEDURE usp_Foo AS\nBEGIN\n  SELECT 1\nEND".into(),
        };
        let b = StoredProcedure {
            name: "usp_foo".into(),
            schema: "dbo".into(),
            definition: "create procedure usp_Foo as begin select 1 end".into(),
        };
        assert!(a.semantically_equal(&b));
    }
}
