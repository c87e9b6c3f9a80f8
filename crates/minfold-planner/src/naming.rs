use sha2::{Digest, Sha256};

/// First 8 hex characters of a SHA-256 over a pipe-joined, lowercased tuple
/// of `parts` (spec §4.5.4). Identical inputs always produce the identical
/// suffix, so regenerating the same migration twice mints the same names.
pub fn deterministic_suffix(parts: &[&str]) -> String {
    let joined = parts
        .iter()
        .map(|p| p.to_lowercase())
        .collect::<Vec<_>>()
        .join("|");
    let digest = Sha256::digest(joined.as_bytes());
    hex::encode(&digest[..4])
}

pub fn deterministic_name(prefix: &str, parts: &[&str]) -> String {
    format!("{prefix}_{}", deterministic_suffix(parts))
}

/// Default-constraint name for a column default minted by the planner
/// itself, rather than carried over from `Column::default_constraint_name`.
/// `purpose` distinguishes why the default is being written — `"add"` for a
/// new column (explicit or sentinel), `"modify"` when an existing default is
/// being replaced — so the same table/column/value never collides across
/// contexts that legitimately differ.
pub fn default_constraint_name(table: &str, column: &str, value: &str, purpose: &str) -> String {
    format!("DF_{table}_{column}_{}", deterministic_suffix(&[table, column, value, purpose]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn identical_inputs_produce_identical_suffix() {
        let a = deterministic_suffix(&["dbo", "Orders", "Total", "default"]);
        let b = deterministic_suffix(&["DBO", "orders", "total", "DEFAULT"]);
        assert_eq!(a, b);
    }

    #[test]
    fn differing_inputs_produce_differing_suffix() {
        let a = deterministic_suffix(&["dbo", "Orders", "Total", "default"]);
        let b = deterministic_suffix(&["dbo", "Orders", "Total", "other"]);
        assert_ne!(a, b);
    }

    #[test]
    fn suffix_is_eight_hex_chars() {
        let s = deterministic_suffix(&["x"]);
        assert_eq!(s.len(), 8);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn default_constraint_name_embeds_table_and_column() {
        let name = default_constraint_name("T", "status", "0", "add");
        let suffix = deterministic_suffix(&["T", "status", "0", "add"]);
        assert_eq!(name, format!("DF_T_status_{suffix}"));
    }

    #[test]
    fn default_constraint_name_varies_by_purpose() {
        let add = default_constraint_name("T", "status", "0", "add");
        let modify = default_constraint_name("T", "status", "0", "modify");
        assert_ne!(add, modify);
    }
}
