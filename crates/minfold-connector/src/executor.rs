use async_trait::async_trait;

use crate::ConnectorResult;

/// The SQL-execution collaborator (spec §6: "The Applier additionally
/// consumes a SQL execution contract returning either the number of
/// affected rows or an error"). One implementation wraps a real SQL Server
/// connection; tests use an in-memory fake that records the batches it was
/// asked to run.
#[async_trait]
pub trait ScriptExecutor: Send + Sync {
    /// Begin a transaction. The applier opens exactly one transaction per
    /// script (spec §5 "Shared resources").
    async fn begin(&self) -> ConnectorResult<()>;

    /// Execute one non-empty `GO`-delimited batch within the current
    /// transaction, returning the number of affected rows.
    async fn execute_batch(&self, sql: &str) -> ConnectorResult<u64>;

    async fn commit(&self) -> ConnectorResult<()>;

    async fn rollback(&self) -> ConnectorResult<()>;
}

/// Split a script on stand-alone `GO` batch separators (spec §4.6 / §8
/// invariant 6: "no batch is empty after trimming").
///
/// `GO` must appear alone on its line, optionally surrounded by
/// whitespace, case-insensitively — exactly SQL Server's own batch
/// separator convention, which is a client-side convention rather than
/// T-SQL syntax.
pub fn split_into_batches(script: &str) -> Vec<String> {
    let mut batches = Vec::new();
    let mut current = String::new();

    for line in script.lines() {
        if is_go_separator(line) {
            push_if_nonempty(&mut batches, &current);
            current.clear();
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }
    push_if_nonempty(&mut batches, &current);

    batches
}

fn is_go_separator(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case("go")
}

fn push_if_nonempty(batches: &mut Vec<String>, candidate: &str) {
    let trimmed = candidate.trim();
    if !trimmed.is_empty() {
        batches.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_standalone_go() {
        let script = "SELECT 1;\nGO\nSELECT 2;\nGO\n";
        let batches = split_into_batches(script);
        assert_eq!(batches, vec!["SELECT 1;".to_string(), "SELECT 2;".to_string()]);
    }

    #[test]
    fn go_is_case_insensitive_and_whitespace_tolerant() {
        let script = "SELECT 1;\n  Go  \nSELECT 2;";
        let batches = split_into_batches(script);
        assert_eq!(batches.len(), 2);
    }

    #[test]
    fn empty_batches_are_dropped() {
        let script = "GO\nGO\nSELECT 1;\nGO\n\nGO";
        let batches = split_into_batches(script);
        assert_eq!(batches, vec!["SELECT 1;".to_string()]);
    }

    #[test]
    fn script_without_trailing_go_keeps_final_batch() {
        let script = "SELECT 1;\nGO\nSELECT 2;";
        let batches = split_into_batches(script);
        assert_eq!(batches, vec!["SELECT 1;".to_string(), "SELECT 2;".to_string()]);
    }
}
