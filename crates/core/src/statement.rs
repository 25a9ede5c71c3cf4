#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Read,
    Mutation,
}

/// Classifies a statement by its leading keyword. Blank input has no kind.
#[must_use]
pub fn classify(sql: &str) -> Option<StatementKind> {
    let trimmed = sql.trim();
    if trimmed.is_empty() {
        return None;
    }

    if is_read_query(trimmed) {
        Some(StatementKind::Read)
    } else {
        Some(StatementKind::Mutation)
    }
}

#[must_use]
pub fn is_read_query(sql: &str) -> bool {
    sql.trim_start()
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("select"))
}

#[must_use]
pub fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::{classify, is_read_query, quote_identifier, StatementKind};

    #[test]
    fn select_prefix_is_case_insensitive() {
        assert!(is_read_query("SELECT 1"));
        assert!(is_read_query("  select * from users"));
        assert!(is_read_query("SeLeCt name FROM t"));
        assert!(!is_read_query("DELETE FROM users"));
        assert!(!is_read_query("sel"));
    }

    #[test]
    fn blank_statements_have_no_kind() {
        assert_eq!(classify(""), None);
        assert_eq!(classify("   \n\t"), None);
        assert_eq!(classify("select 1"), Some(StatementKind::Read));
        assert_eq!(
            classify("UPDATE users SET name = 'x'"),
            Some(StatementKind::Mutation)
        );
    }

    #[test]
    fn identifiers_escape_embedded_quotes() {
        assert_eq!(quote_identifier("users"), "\"users\"");
        assert_eq!(quote_identifier("odd\"name"), "\"odd\"\"name\"");
    }
}
