use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapse runs of whitespace to a single space and trim, then lowercase.
/// Used to compare computed-column expressions and procedure bodies, which
/// SQL Server re-formats on round-trip through the catalog.
pub fn normalize_whitespace(input: &str) -> String {
    WHITESPACE_RUN.replace_all(input.trim(), " ").to_lowercase()
}

/// Strip balanced outer parentheses repeatedly: SQL Server stores column
/// defaults as `((0))`, `(N'x')`, etc. Two default strings are "the same
/// default" once this normalization agrees, regardless of how many
/// redundant wrapping parens the catalog happened to add.
pub fn normalize_default_value(input: &str) -> String {
    let mut current = input.trim();

    loop {
        let bytes = current.as_bytes();
        if bytes.len() < 2 || bytes[0] != b'(' || bytes[bytes.len() - 1] != b')' {
            break;
        }

        if !is_balanced_wrap(current) {
            break;
        }

        current = current[1..current.len() - 1].trim();
    }

    current.to_lowercase()
}

/// True when the first `(` and the last `)` of `s` are a matching pair,
/// i.e. stripping them would not leave unbalanced parentheses behind.
fn is_balanced_wrap(s: &str) -> bool {
    let mut depth: i32 = 0;
    let chars: Vec<char> = s.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    // The first '(' closed before the very last character:
                    // the outer parens do not wrap the whole expression.
                    return i == chars.len() - 1;
                }
            }
            _ => {}
        }
    }
    false
}
